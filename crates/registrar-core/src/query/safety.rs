//! Syntactic SQL safety gate.
//!
//! Only statements that start with `SELECT` and contain none of the listed
//! keywords or injection markers (as plain substrings of the uppercased
//! text) may reach execution. This does not parse SQL: it rejects some
//! harmless text and a crafted statement can slip past it. The tests below
//! pin the current accept/reject behavior.

use std::fmt;

const FORBIDDEN_KEYWORDS: &[&str] = &[
    "DROP",
    "DELETE",
    "INSERT",
    "UPDATE",
    "ALTER",
    "CREATE",
    "TRUNCATE",
    "EXEC",
    "CALL",
    "REPLACE",
    "LOAD_FILE",
    "INTO OUTFILE",
    "INTO DUMPFILE",
];

const INJECTION_MARKERS: &[&str] = &[
    "--",
    "/*",
    "*/",
    "XP_",
    "SP_",
    "UNION SELECT",
    "OR 1=1",
    "AND 1=1",
    "' OR '",
];

/// Why a statement was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NotSelect,
    ForbiddenKeyword(&'static str),
    InjectionMarker(&'static str),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NotSelect => write!(f, "statement is not a SELECT"),
            Rejection::ForbiddenKeyword(k) => write!(f, "forbidden keyword '{k}'"),
            Rejection::InjectionMarker(m) => write!(f, "injection marker '{m}'"),
        }
    }
}

/// Inspect a statement. `None` means it may run.
pub fn check(query: &str) -> Option<Rejection> {
    let upper = query.trim().to_uppercase();
    if !upper.starts_with("SELECT") {
        return Some(Rejection::NotSelect);
    }
    if let Some(keyword) = FORBIDDEN_KEYWORDS.iter().find(|k| upper.contains(**k)) {
        return Some(Rejection::ForbiddenKeyword(keyword));
    }
    if let Some(marker) = INJECTION_MARKERS.iter().find(|m| upper.contains(**m)) {
        return Some(Rejection::InjectionMarker(marker));
    }
    None
}

pub fn is_safe(query: &str) -> bool {
    check(query).is_none()
}
