//! Turn rendering for the terminal.
//!
//! The dialogue engine returns structured results; this module is the
//! renderer that turns them into styled text or JSON.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use serde_json::Value;

use registrar_types::query::Record;
use registrar_types::response::{ConversationalKind, TurnOutcome, TurnResult};

/// Canned reply for a turn that needed no query.
pub fn conversational_reply(kind: ConversationalKind) -> &'static str {
    match kind {
        ConversationalKind::Greeting => "¡Hola! ¿Qué información académica necesitas?",
        ConversationalKind::Farewell => "¡Hasta luego!",
        ConversationalKind::Thanks => "Con gusto. ¿Algo más?",
        ConversationalKind::Confirmation => "Perfecto.",
        ConversationalKind::Negation => "De acuerdo. ¿Qué otra cosa necesitas?",
        ConversationalKind::General => {
            "Puedo consultar promedios, calificaciones, horarios, materias por profesor e inscripciones."
        }
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

/// Build a table whose columns follow the first record's keys.
pub fn rows_table(rows: &[Record]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let columns: Vec<&String> = rows.first().map(|r| r.keys().collect()).unwrap_or_default();
    table.set_header(
        columns
            .iter()
            .map(|c| Cell::new(c).fg(Color::White))
            .collect::<Vec<_>>(),
    );

    for row in rows {
        table.add_row(
            columns
                .iter()
                .map(|c| Cell::new(row.get(*c).map(cell_text).unwrap_or_default()))
                .collect::<Vec<_>>(),
        );
    }
    table
}

/// Print one turn result.
pub fn print_turn(result: &TurnResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    println!();
    match &result.outcome {
        TurnOutcome::NeedsInput { prompt, .. } => {
            println!("  {} {}", style("?").yellow().bold(), prompt);
        }
        TurnOutcome::Rows { rows, meta } => {
            if rows.is_empty() {
                println!(
                    "  {} No encontré registros para esa consulta.",
                    style("i").blue().bold()
                );
            } else {
                println!("{}", rows_table(rows));
            }
            let source = if meta.cached {
                style("cache").cyan().to_string()
            } else {
                format!("{} ms", meta.latency_ms)
            };
            println!(
                "  {} {} fila{} · {}",
                style(&meta.template_id).dim(),
                style(meta.row_count).bold(),
                if meta.row_count == 1 { "" } else { "s" },
                source
            );
        }
        TurnOutcome::Conversational { kind } => {
            println!("  {}", conversational_reply(*kind));
        }
        TurnOutcome::Failed { error } => {
            println!("  {} {}", style("!").red().bold(), error.user_message());
        }
    }
    println!();
    Ok(())
}
