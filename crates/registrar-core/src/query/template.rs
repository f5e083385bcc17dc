//! Query template registry and slot binding.
//!
//! `generate` fails closed: an unknown id or a parameter count different from
//! the template's arity yields no template and no parameters. Nothing is ever
//! partially bound.

use std::collections::HashMap;

use registrar_types::error::LexiconError;
use registrar_types::intent::{SlotBinding, SlotKind, SlotRequirement};
use registrar_types::query::{QueryParam, QueryTemplate};
use registrar_types::session::SlotValues;
use tracing::warn;

/// Registry of vetted templates keyed by id.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, QueryTemplate>,
}

impl TemplateRegistry {
    pub fn new(templates: impl IntoIterator<Item = QueryTemplate>) -> Result<Self, LexiconError> {
        let mut map = HashMap::new();
        for template in templates {
            if map.contains_key(&template.id) {
                return Err(LexiconError::DuplicateTemplate(template.id));
            }
            map.insert(template.id.clone(), template);
        }
        Ok(Self { templates: map })
    }

    pub fn get(&self, id: &str) -> Option<&QueryTemplate> {
        self.templates.get(id)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Resolve `template_id` and check that `params` matches its arity exactly.
    pub fn generate(
        &self,
        template_id: &str,
        params: Vec<QueryParam>,
    ) -> (Option<&QueryTemplate>, Vec<QueryParam>) {
        let Some(template) = self.templates.get(template_id) else {
            warn!(template_id, "Unknown query template");
            return (None, Vec::new());
        };
        if params.len() != template.arity {
            warn!(
                template_id,
                expected = template.arity,
                supplied = params.len(),
                "Template arity mismatch"
            );
            return (None, Vec::new());
        }
        (Some(template), params)
    }
}

/// Build parameters for `template` from collected slot values, in placeholder order.
///
/// Fields without a value are skipped, so an incomplete collection produces
/// fewer parameters than the arity and is refused by `generate`.
pub fn bind_slots(
    template: &QueryTemplate,
    collected: &SlotValues,
    requirements: &[SlotRequirement],
) -> Vec<QueryParam> {
    template
        .slots
        .iter()
        .filter_map(|field| {
            let value = collected.get(field)?;
            let requirement = requirements.iter().find(|r| &r.field == field);
            Some(bind_value(value, requirement))
        })
        .collect()
}

/// Turn a raw slot value into a bound parameter.
pub fn bind_value(value: &str, requirement: Option<&SlotRequirement>) -> QueryParam {
    let Some(requirement) = requirement else {
        return QueryParam::Text(value.to_string());
    };
    match (requirement.kind, requirement.binding) {
        (SlotKind::Integer, _) => match value.trim().parse::<i64>() {
            Ok(n) => QueryParam::Integer(n),
            Err(_) => QueryParam::Text(value.to_string()),
        },
        (SlotKind::Text, SlotBinding::Contains) => QueryParam::Text(format!("%{value}%")),
        (SlotKind::Text, SlotBinding::Exact) => QueryParam::Text(value.to_string()),
        (SlotKind::Text, SlotBinding::Folded) => QueryParam::Text(fold_accents(value)),
    }
}

/// Lowercase `value` and strip the acute accents and diaeresis used in Spanish.
/// `ñ` is a distinct letter and is kept.
pub fn fold_accents(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' | 'ü' => 'u',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::Lexicon;

    fn registry() -> TemplateRegistry {
        TemplateRegistry::new(vec![QueryTemplate::new(
            "tid",
            "SELECT * FROM alumnos WHERE nombre LIKE ?",
            &["nombre_alumno"],
        )])
        .unwrap()
    }

    #[test]
    fn test_generate_with_matching_arity() {
        let registry = registry();
        let (template, params) =
            registry.generate("tid", vec![QueryParam::Text("%Ana%".to_string())]);
        assert_eq!(template.unwrap().id, "tid");
        assert_eq!(params, vec![QueryParam::Text("%Ana%".to_string())]);
    }

    #[test]
    fn test_generate_with_missing_params_fails_closed() {
        let registry = registry();
        let (template, params) = registry.generate("tid", Vec::new());
        assert!(template.is_none());
        assert!(params.is_empty());
    }

    #[test]
    fn test_generate_with_extra_params_fails_closed() {
        let registry = registry();
        let (template, params) = registry.generate(
            "tid",
            vec![QueryParam::Integer(1), QueryParam::Integer(2)],
        );
        assert!(template.is_none());
        assert!(params.is_empty());
    }

    #[test]
    fn test_generate_unknown_template() {
        let registry = registry();
        let (template, params) = registry.generate("nope", vec![QueryParam::Integer(1)]);
        assert!(template.is_none());
        assert!(params.is_empty());
    }

    #[test]
    fn test_duplicate_template_is_rejected() {
        let t = QueryTemplate::new("tid", "SELECT 1", &[]);
        let err = TemplateRegistry::new(vec![t.clone(), t]).unwrap_err();
        assert!(matches!(err, LexiconError::DuplicateTemplate(id) if id == "tid"));
    }

    #[test]
    fn test_bind_slots_follows_placeholder_order_and_binding() {
        let lexicon = Lexicon::academic();
        let intent = lexicon.intent("promedio_alumno").unwrap();
        let template = lexicon
            .templates
            .iter()
            .find(|t| t.id == "promedio_alumno")
            .unwrap();

        let mut collected = SlotValues::new();
        collected.insert("nombre_alumno".to_string(), "Juan Perez".to_string());

        let params = bind_slots(template, &collected, &intent.slots);
        assert_eq!(params, vec![QueryParam::Text("%Juan Perez%".to_string())]);
    }

    #[test]
    fn test_bind_slots_skips_missing_values() {
        let template = QueryTemplate::new("t", "SELECT ? , ?", &["a", "b"]);
        let mut collected = SlotValues::new();
        collected.insert("b".to_string(), "x".to_string());
        let params = bind_slots(&template, &collected, &[]);
        assert_eq!(params, vec![QueryParam::Text("x".to_string())]);
    }

    #[test]
    fn test_weekday_is_folded_to_plain_key() {
        let lexicon = Lexicon::academic();
        let intent = lexicon.intent("horario_dia").unwrap();
        let requirement = intent.slots.first();
        assert_eq!(
            bind_value("Miércoles", requirement),
            QueryParam::Text("miercoles".to_string())
        );
        assert_eq!(bind_value("SÁBADO", requirement), QueryParam::Text("sabado".to_string()));
        assert_eq!(fold_accents(" Muñoz "), "muñoz");
    }

    #[test]
    fn test_integer_slot_falls_back_to_text() {
        let lexicon = Lexicon::academic();
        let intent = lexicon.intent("alumnos_reprobados").unwrap();
        let requirement = intent.slots.first();
        assert_eq!(bind_value(" 2023 ", requirement), QueryParam::Integer(2023));
        assert_eq!(
            bind_value("el pasado", requirement),
            QueryParam::Text("el pasado".to_string())
        );
    }
}
