//! Academic-records rule set: Spanish keywords, slot patterns and SQLite templates.
//!
//! Template bodies must pass the substring safety gate, so column and table
//! names avoid tokens such as `CREATE`, `UPDATE` or `CALL`.

use registrar_types::intent::{IntentDefinition, SlotBinding, SlotKind, SlotRequirement};
use registrar_types::query::QueryTemplate;
use registrar_types::role::Role;

use super::{CONVERSATION_FAMILY, Lexicon, SentimentLexicon};

const NAME_SPAN: &str = r"(\p{Lu}\p{L}*(?:\s+\p{Lu}\p{L}*)*)";

fn words(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn slot(field: &str, pattern: String, prompt: &str, kind: SlotKind, binding: SlotBinding) -> SlotRequirement {
    SlotRequirement {
        field: field.to_string(),
        pattern,
        prompt: prompt.to_string(),
        kind,
        binding,
    }
}

fn student_name() -> SlotRequirement {
    slot(
        "nombre_alumno",
        format!(r"\b(?i:alumn[oa]|estudiante)\s+{NAME_SPAN}"),
        "¿De qué alumno necesitas la información? Escribe su nombre.",
        SlotKind::Text,
        SlotBinding::Contains,
    )
}

fn professor_name() -> SlotRequirement {
    slot(
        "nombre_profesor",
        format!(r"\b(?i:profesora?|maestr[oa]|docente)\s+{NAME_SPAN}"),
        "¿De qué profesor quieres consultar las materias?",
        SlotKind::Text,
        SlotBinding::Contains,
    )
}

fn course_title() -> SlotRequirement {
    slot(
        "nombre_materia",
        r#"\b(?i:materia|curso|asignatura)\s+["“']([^"”']+)["”']"#.to_string(),
        "¿De qué materia? Escribe su nombre.",
        SlotKind::Text,
        SlotBinding::Contains,
    )
}

fn weekday() -> SlotRequirement {
    slot(
        "dia_semana",
        r"(?i)\b(lunes|martes|mi[eé]rcoles|jueves|viernes|s[aá]bado|domingo)\b".to_string(),
        "¿Para qué día de la semana quieres el horario?",
        SlotKind::Text,
        SlotBinding::Folded,
    )
}

fn year() -> SlotRequirement {
    slot(
        "anio",
        r"\b(?i:año|anio|ciclo|periodo|en|del)\s+(\d{4})\b".to_string(),
        "¿De qué año? Escribe los cuatro dígitos, por ejemplo 2024.",
        SlotKind::Integer,
        SlotBinding::Exact,
    )
}

fn ranking_size() -> SlotRequirement {
    slot(
        "cantidad",
        r"\b(?i:top|mejores|primeros)\s+(\d{1,3})\b".to_string(),
        "¿Cuántos alumnos quieres ver en el ranking?",
        SlotKind::Integer,
        SlotBinding::Exact,
    )
}

fn conversational(id: &str, keywords: &[&str]) -> IntentDefinition {
    IntentDefinition {
        id: id.to_string(),
        keywords: words(keywords),
        roles: Role::ALL.to_vec(),
        weight: 1.0,
        slots: Vec::new(),
        template_id: None,
        family: CONVERSATION_FAMILY.to_string(),
        topic: "social".to_string(),
    }
}

struct QueryIntent<'a> {
    id: &'a str,
    keywords: &'a [&'a str],
    roles: &'a [Role],
    weight: f64,
    slots: Vec<SlotRequirement>,
    family: &'a str,
    topic: &'a str,
}

impl QueryIntent<'_> {
    fn build(self) -> IntentDefinition {
        IntentDefinition {
            id: self.id.to_string(),
            keywords: words(self.keywords),
            roles: self.roles.to_vec(),
            weight: self.weight,
            slots: self.slots,
            template_id: Some(self.id.to_string()),
            family: self.family.to_string(),
            topic: self.topic.to_string(),
        }
    }
}

const STAFF: &[Role] = &[Role::Profesor, Role::Administrador];

fn intents() -> Vec<IntentDefinition> {
    vec![
        conversational(
            "saludo",
            &["hola", "buenos dias", "buenos días", "buenas tardes", "buenas noches", "saludos"],
        ),
        conversational("despedida", &["adios", "adiós", "hasta luego", "nos vemos", "chao"]),
        conversational("agradecimiento", &["gracias", "te agradezco", "muy amable"]),
        QueryIntent {
            id: "promedio_alumno",
            keywords: &["promedio", "media general", "calificacion promedio", "calificación promedio"],
            roles: &Role::ALL,
            weight: 1.2,
            slots: vec![student_name()],
            family: "promedio",
            topic: "calificaciones",
        }
        .build(),
        QueryIntent {
            id: "calificaciones_alumno",
            keywords: &["calificaciones", "notas", "boleta", "kardex"],
            roles: &Role::ALL,
            weight: 1.0,
            slots: vec![student_name()],
            family: "calificaciones",
            topic: "calificaciones",
        }
        .build(),
        QueryIntent {
            id: "horario_dia",
            keywords: &["horario", "clases del", "que clases", "qué clases"],
            roles: &Role::ALL,
            weight: 1.0,
            slots: vec![weekday()],
            family: "horario",
            topic: "horarios",
        }
        .build(),
        QueryIntent {
            id: "materias_profesor",
            keywords: &["materias del profesor", "imparte", "materias que da"],
            roles: &Role::ALL,
            weight: 1.0,
            slots: vec![professor_name()],
            family: "materias",
            topic: "docentes",
        }
        .build(),
        QueryIntent {
            id: "alumnos_inscritos",
            keywords: &["inscritos", "cuantos alumnos", "cuántos alumnos", "lista de alumnos"],
            roles: STAFF,
            weight: 1.0,
            slots: vec![course_title()],
            family: "inscritos",
            topic: "materias",
        }
        .build(),
        QueryIntent {
            id: "alumnos_reprobados",
            keywords: &["reprobados", "reprobaron", "reprobo", "reprobó"],
            roles: STAFF,
            weight: 1.0,
            slots: vec![year()],
            family: "reprobados",
            topic: "rendimiento",
        }
        .build(),
        QueryIntent {
            id: "ranking_promedios",
            keywords: &["mejores promedios", "mejores alumnos", "ranking", "top"],
            roles: STAFF,
            weight: 1.1,
            slots: vec![ranking_size()],
            family: "ranking",
            topic: "rendimiento",
        }
        .build(),
    ]
}

fn templates() -> Vec<QueryTemplate> {
    vec![
        QueryTemplate::new(
            "promedio_alumno",
            "SELECT a.matricula, a.nombre, ROUND(AVG(c.valor), 2) AS promedio \
             FROM alumnos a JOIN calificaciones c ON c.alumno_id = a.id \
             WHERE a.nombre LIKE ? GROUP BY a.id, a.matricula, a.nombre",
            &["nombre_alumno"],
        ),
        QueryTemplate::new(
            "calificaciones_alumno",
            "SELECT a.nombre, m.nombre AS materia, c.anio, c.periodo, c.valor \
             FROM calificaciones c JOIN alumnos a ON a.id = c.alumno_id \
             JOIN materias m ON m.id = c.materia_id \
             WHERE a.nombre LIKE ? ORDER BY c.anio, c.periodo, m.nombre",
            &["nombre_alumno"],
        ),
        QueryTemplate::new(
            "horario_dia",
            "SELECT h.dia, h.hora_inicio, h.hora_fin, m.nombre AS materia, h.aula \
             FROM horarios h JOIN materias m ON m.id = h.materia_id \
             WHERE lower(h.dia) = ? ORDER BY h.hora_inicio",
            &["dia_semana"],
        ),
        QueryTemplate::new(
            "materias_profesor",
            "SELECT p.nombre AS profesor, m.clave, m.nombre AS materia \
             FROM materias m JOIN profesores p ON p.id = m.profesor_id \
             WHERE p.nombre LIKE ? ORDER BY m.nombre",
            &["nombre_profesor"],
        ),
        QueryTemplate::new(
            "alumnos_inscritos",
            "SELECT m.nombre AS materia, COUNT(i.alumno_id) AS inscritos \
             FROM materias m LEFT JOIN inscripciones i ON i.materia_id = m.id \
             WHERE m.nombre LIKE ? GROUP BY m.id, m.nombre",
            &["nombre_materia"],
        ),
        QueryTemplate::new(
            "alumnos_reprobados",
            "SELECT a.nombre, m.nombre AS materia, c.valor \
             FROM calificaciones c JOIN alumnos a ON a.id = c.alumno_id \
             JOIN materias m ON m.id = c.materia_id \
             WHERE c.valor < 6 AND c.anio = ? ORDER BY a.nombre",
            &["anio"],
        ),
        QueryTemplate::new(
            "ranking_promedios",
            "SELECT a.matricula, a.nombre, ROUND(AVG(c.valor), 2) AS promedio \
             FROM alumnos a JOIN calificaciones c ON c.alumno_id = a.id \
             GROUP BY a.id, a.matricula, a.nombre ORDER BY promedio DESC LIMIT ?",
            &["cantidad"],
        ),
    ]
}

pub(super) fn lexicon() -> Lexicon {
    Lexicon {
        intents: intents(),
        templates: templates(),
        continuation: words(&[
            "dime mas",
            "dime más",
            "cuentame mas",
            "cuéntame más",
            "mas detalles",
            "más detalles",
            "tell me more",
            "y que mas",
            "y qué más",
            "profundiza",
        ]),
        confirmation: words(&["si", "sí", "claro", "correcto", "de acuerdo", "exacto", "afirmativo", "ok", "vale"]),
        negation: words(&["no", "para nada", "incorrecto", "negativo", "tampoco"]),
        sentiment: SentimentLexicon {
            positive: words(&[
                "feliz",
                "excelente",
                "bien",
                "genial",
                "gracias",
                "perfecto",
                "bueno",
                "contento",
                "contenta",
                "increible",
                "increíble",
                "me gusta",
                "maravilloso",
            ]),
            negative: words(&[
                "mal",
                "triste",
                "terrible",
                "horrible",
                "pesimo",
                "pésimo",
                "odio",
                "enojado",
                "molesto",
                "preocupado",
                "preocupada",
                "frustrado",
                "no sirve",
            ]),
            neutral: words(&[
                "normal",
                "regular",
                "tal vez",
                "quiza",
                "quizá",
                "informacion",
                "información",
                "consulta",
                "pregunta",
            ]),
        },
        role_families: vec![
            (Role::Alumno, words(&["promedio", "calificaciones", "horario", "materias"])),
            (
                Role::Profesor,
                words(&[
                    "promedio",
                    "calificaciones",
                    "horario",
                    "materias",
                    "inscritos",
                    "reprobados",
                    "ranking",
                ]),
            ),
            (
                Role::Administrador,
                words(&[
                    "promedio",
                    "calificaciones",
                    "horario",
                    "materias",
                    "inscritos",
                    "reprobados",
                    "ranking",
                ]),
            ),
        ],
    }
}
