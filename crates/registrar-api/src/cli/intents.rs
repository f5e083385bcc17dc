//! Lexicon listing command.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use registrar_core::lexicon::Lexicon;

/// Print every intent with its roles, slots and template.
pub fn list_intents(json: bool) -> Result<()> {
    let lexicon = Lexicon::academic();

    if json {
        println!("{}", serde_json::to_string_pretty(&lexicon.intents)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Intent").fg(Color::White),
        Cell::new("Roles").fg(Color::White),
        Cell::new("Slots").fg(Color::White),
        Cell::new("Keywords").fg(Color::White),
    ]);

    for intent in &lexicon.intents {
        let roles: Vec<String> = intent.roles.iter().map(|r| r.to_string()).collect();
        let slots: Vec<&str> = intent.slots.iter().map(|s| s.field.as_str()).collect();
        table.add_row(vec![
            Cell::new(&intent.id).fg(Color::Cyan),
            Cell::new(roles.join(", ")),
            Cell::new(if slots.is_empty() { "-".to_string() } else { slots.join(", ") }),
            Cell::new(intent.keywords.join(", ")).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    let queries = lexicon.intents.iter().filter(|i| i.is_query()).count();
    println!(
        "  {} intent{}, {} backed by a query template",
        style(lexicon.intents.len()).bold(),
        if lexicon.intents.len() == 1 { "" } else { "s" },
        style(queries).bold()
    );
    println!();

    Ok(())
}
