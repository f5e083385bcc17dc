//! Caller roles.
//!
//! A role decides which intents a user may resolve to and which record
//! families the permission gate lets through.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// The role of the user sending a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Alumno,
    Profesor,
    Administrador,
}

impl Role {
    /// Every role, in privilege order.
    pub const ALL: [Role; 3] = [Role::Alumno, Role::Profesor, Role::Administrador];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Alumno => write!(f, "alumno"),
            Role::Profesor => write!(f, "profesor"),
            Role::Administrador => write!(f, "administrador"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "alumno" | "estudiante" => Ok(Role::Alumno),
            "profesor" | "docente" => Ok(Role::Profesor),
            "administrador" | "admin" => Ok(Role::Administrador),
            other => Err(format!("invalid role: '{other}'")),
        }
    }
}
