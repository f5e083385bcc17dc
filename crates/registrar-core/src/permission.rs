//! Role-based access to record families.

use std::collections::{HashMap, HashSet};

use registrar_types::role::Role;

use crate::lexicon::{CONVERSATION_FAMILY, Lexicon};

/// Decides whether a role may query a record family.
pub trait RoleGate: Send + Sync {
    fn is_allowed(&self, role: Role, family: &str) -> bool;
}

/// Gate backed by the lexicon's per-role family table.
///
/// The conversation family is open to every role. A role missing from the
/// table may access nothing else.
#[derive(Debug, Clone, Default)]
pub struct LexiconRoleGate {
    families: HashMap<Role, HashSet<String>>,
}

impl LexiconRoleGate {
    pub fn new(lexicon: &Lexicon) -> Self {
        let families = lexicon
            .role_families
            .iter()
            .map(|(role, families)| (*role, families.iter().cloned().collect()))
            .collect();
        Self { families }
    }
}

impl RoleGate for LexiconRoleGate {
    fn is_allowed(&self, role: Role, family: &str) -> bool {
        family == CONVERSATION_FAMILY
            || self
                .families
                .get(&role)
                .is_some_and(|allowed| allowed.contains(family))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_cannot_see_failing_lists() {
        let gate = LexiconRoleGate::new(&Lexicon::academic());
        assert!(gate.is_allowed(Role::Alumno, "promedio"));
        assert!(!gate.is_allowed(Role::Alumno, "reprobados"));
        assert!(gate.is_allowed(Role::Profesor, "reprobados"));
        assert!(gate.is_allowed(Role::Administrador, "ranking"));
    }

    #[test]
    fn test_conversation_family_is_always_open() {
        let gate = LexiconRoleGate::default();
        assert!(gate.is_allowed(Role::Alumno, CONVERSATION_FAMILY));
        assert!(!gate.is_allowed(Role::Alumno, "promedio"));
    }

    #[test]
    fn test_unknown_family_is_denied() {
        let gate = LexiconRoleGate::new(&Lexicon::academic());
        assert!(!gate.is_allowed(Role::Administrador, "nominas"));
    }
}
