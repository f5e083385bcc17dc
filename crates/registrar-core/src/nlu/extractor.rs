//! Slot extraction from free text.
//!
//! The dialogue engine only sees the `SlotExtractor` trait, so the pattern
//! language can change without touching the state machine. The default
//! `RegexSlotExtractor` compiles every slot pattern of a lexicon once.

use std::collections::HashMap;

use regex::Regex;
use registrar_types::error::LexiconError;
use registrar_types::intent::SlotRequirement;
use registrar_types::session::SlotValues;
use tracing::debug;

use crate::lexicon::Lexicon;

/// Slots found in a message and the ones still owed, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub extracted: SlotValues,
    pub missing: Vec<String>,
}

/// Strategy for pulling slot values out of a message.
pub trait SlotExtractor: Send + Sync {
    /// Extract each of `slots` from `message` (original casing), at most once per slot.
    fn extract(&self, message: &str, slots: &[SlotRequirement]) -> Extraction;
}

/// Regex-backed extractor. The first capture group of a slot's pattern is its value.
#[derive(Debug, Clone, Default)]
pub struct RegexSlotExtractor {
    patterns: HashMap<String, Regex>,
}

impl RegexSlotExtractor {
    /// Compile the patterns of the given slots.
    ///
    /// Slots sharing a field id share one pattern (the first one wins).
    pub fn new<'a>(slots: impl IntoIterator<Item = &'a SlotRequirement>) -> Result<Self, LexiconError> {
        let mut patterns = HashMap::new();
        for slot in slots {
            if patterns.contains_key(&slot.field) {
                continue;
            }
            let regex = Regex::new(&slot.pattern).map_err(|e| LexiconError::InvalidPattern {
                field: slot.field.clone(),
                reason: e.to_string(),
            })?;
            patterns.insert(slot.field.clone(), regex);
        }
        Ok(Self { patterns })
    }

    /// Compile every slot pattern declared by the lexicon's intents.
    pub fn from_lexicon(lexicon: &Lexicon) -> Result<Self, LexiconError> {
        Self::new(lexicon.intents.iter().flat_map(|i| i.slots.iter()))
    }

    fn capture(&self, field: &str, message: &str) -> Option<String> {
        let Some(regex) = self.patterns.get(field) else {
            debug!(field, "No compiled pattern for slot");
            return None;
        };
        let captures = regex.captures(message)?;
        let value = captures.get(1)?.as_str().trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }
}

impl SlotExtractor for RegexSlotExtractor {
    fn extract(&self, message: &str, slots: &[SlotRequirement]) -> Extraction {
        let mut extraction = Extraction::default();
        for slot in slots {
            if extraction.extracted.contains_key(&slot.field) {
                continue;
            }
            match self.capture(&slot.field, message) {
                Some(value) => {
                    extraction.extracted.insert(slot.field.clone(), value);
                }
                None => extraction.missing.push(slot.field.clone()),
            }
        }
        extraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> (RegexSlotExtractor, Lexicon) {
        let lexicon = Lexicon::academic();
        (RegexSlotExtractor::from_lexicon(&lexicon).unwrap(), lexicon)
    }

    fn slots_of<'a>(lexicon: &'a Lexicon, intent: &str) -> &'a [SlotRequirement] {
        &lexicon.intent(intent).unwrap().slots
    }

    #[test]
    fn test_extracts_student_name_after_role_keyword() {
        let (extractor, lexicon) = extractor();
        let result = extractor.extract(
            "cual es el promedio del alumno Juan Perez",
            slots_of(&lexicon, "promedio_alumno"),
        );
        assert_eq!(result.extracted.get("nombre_alumno").unwrap(), "Juan Perez");
        assert!(result.missing.is_empty());
    }

    #[test]
    fn test_lowercase_word_after_keyword_is_not_a_name() {
        let (extractor, lexicon) = extractor();
        let result = extractor.extract(
            "cual es el promedio del alumno",
            slots_of(&lexicon, "promedio_alumno"),
        );
        assert!(result.extracted.is_empty());
        assert_eq!(result.missing, vec!["nombre_alumno".to_string()]);

        let result = extractor.extract(
            "promedio de la alumna que saco diez",
            slots_of(&lexicon, "promedio_alumno"),
        );
        assert_eq!(result.missing, vec!["nombre_alumno".to_string()]);
    }

    #[test]
    fn test_extracts_accented_professor_name() {
        let (extractor, lexicon) = extractor();
        let result = extractor.extract(
            "que materias imparte la profesora María Núñez?",
            slots_of(&lexicon, "materias_profesor"),
        );
        assert_eq!(result.extracted.get("nombre_profesor").unwrap(), "María Núñez");
    }

    #[test]
    fn test_extracts_quoted_course_title() {
        let (extractor, lexicon) = extractor();
        let result = extractor.extract(
            "cuantos alumnos hay en la materia \"Calculo Diferencial\"",
            slots_of(&lexicon, "alumnos_inscritos"),
        );
        assert_eq!(
            result.extracted.get("nombre_materia").unwrap(),
            "Calculo Diferencial"
        );
    }

    #[test]
    fn test_extracts_weekday_year_and_count() {
        let (extractor, lexicon) = extractor();

        let result = extractor.extract("que clases tengo el Miércoles", slots_of(&lexicon, "horario_dia"));
        assert_eq!(result.extracted.get("dia_semana").unwrap(), "Miércoles");

        let result = extractor.extract(
            "alumnos reprobados en 2023",
            slots_of(&lexicon, "alumnos_reprobados"),
        );
        assert_eq!(result.extracted.get("anio").unwrap(), "2023");

        let result = extractor.extract(
            "dame el top 5 de promedios",
            slots_of(&lexicon, "ranking_promedios"),
        );
        assert_eq!(result.extracted.get("cantidad").unwrap(), "5");
    }

    #[test]
    fn test_missing_preserves_declaration_order() {
        let (extractor, _) = extractor();
        let slots = vec![
            SlotRequirement {
                field: "dia_semana".to_string(),
                pattern: String::new(),
                prompt: String::new(),
                kind: registrar_types::intent::SlotKind::Text,
                binding: registrar_types::intent::SlotBinding::Exact,
            },
            SlotRequirement {
                field: "anio".to_string(),
                pattern: String::new(),
                prompt: String::new(),
                kind: registrar_types::intent::SlotKind::Integer,
                binding: registrar_types::intent::SlotBinding::Exact,
            },
        ];
        let result = extractor.extract("nada que ver", &slots);
        assert_eq!(result.missing, vec!["dia_semana".to_string(), "anio".to_string()]);
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let slot = SlotRequirement {
            field: "roto".to_string(),
            pattern: "(unclosed".to_string(),
            prompt: String::new(),
            kind: registrar_types::intent::SlotKind::Text,
            binding: registrar_types::intent::SlotBinding::Exact,
        };
        let err = RegexSlotExtractor::new([&slot]).unwrap_err();
        assert!(matches!(err, LexiconError::InvalidPattern { ref field, .. } if field == "roto"));
    }
}
