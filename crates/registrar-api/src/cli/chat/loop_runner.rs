//! Main chat loop orchestration.

use console::style;
use tracing::info;

use registrar_types::role::Role;

use crate::cli::render::print_turn;
use crate::state::AppState;

use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};

fn prompt_for(role: Role) -> String {
    format!("  {} ", style(format!("{role} >")).green().bold())
}

async fn print_session(state: &AppState, user: &str, json: bool) -> anyhow::Result<()> {
    let Some(snapshot) = state.manager.sessions().snapshot(user).await else {
        println!("\n  {} No session yet.\n", style("i").blue().bold());
        return Ok(());
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!();
    println!("  {}", style("── Session ──").dim());
    println!("  Id:         {}", style(snapshot.id).dim());
    let state_label = match &snapshot.pending_field {
        Some(field) => format!("collecting {}", style(field).yellow()),
        None => "ready".to_string(),
    };
    println!("  State:      {state_label}");
    println!(
        "  Last:       {}",
        snapshot.last_intent.as_deref().unwrap_or("-")
    );
    println!(
        "  Sentiment:  {}",
        snapshot
            .last_sentiment
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    println!("  Engagement: {}", style(snapshot.engagement).cyan());
    println!("  Messages:   {}", snapshot.history_len);
    println!();
    Ok(())
}

fn print_stats(state: &AppState, json: bool) -> anyhow::Result<()> {
    let stats = state.manager.stats();
    let cached = state.manager.engine().cache().len();
    if json {
        let value = serde_json::json!({
            "stats": stats,
            "hit_rate": stats.hit_rate(),
            "cache_entries": cached,
            "cache_ttl_secs": state.config.cache_ttl_secs,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!();
    println!("  {}", style("── Queries ──").dim());
    println!("  Executed:     {}", style(stats.total_queries).bold());
    println!("  Avg latency:  {:.2} ms", stats.avg_latency_ms);
    println!("  Cache hits:   {} ({:.0}%)", stats.cache_hits, stats.hit_rate() * 100.0);
    println!("  Errors:       {}", stats.errors);
    println!(
        "  Cache:        {} entr{} (TTL {} s)",
        cached,
        if cached == 1 { "y" } else { "ies" },
        state.config.cache_ttl_secs
    );
    println!();
    Ok(())
}

/// Run the interactive chat loop for `user`, starting as `role`.
pub async fn run_chat_loop(state: &AppState, user: &str, role: Role, json: bool) -> anyhow::Result<()> {
    let mut role = role;
    info!(user, %role, "Chat started");

    println!();
    println!(
        "  {} Registrar v{}  {}",
        style("⚡").bold(),
        env!("CARGO_PKG_VERSION"),
        style(state.data_dir.display()).dim()
    );
    println!(
        "  {}",
        style("Pregunta por promedios, calificaciones u horarios. /help para comandos.").dim()
    );
    println!();

    let (mut chat_input, _writer) = ChatInput::new(prompt_for(role))
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        match chat_input.read_line().await {
            InputEvent::Eof => {
                println!("\n  {}", style("Session ended.").dim());
                break;
            }
            InputEvent::Interrupted => {
                println!("\n  {}", style("Press Ctrl+D to exit, or keep chatting.").dim());
                continue;
            }
            InputEvent::Message(text) => {
                if text.is_empty() {
                    continue;
                }

                if let Some(cmd) = commands::parse(&text) {
                    match cmd {
                        ChatCommand::Help => commands::print_help(),
                        ChatCommand::Clear => chat_input.clear(),
                        ChatCommand::Exit => {
                            println!("\n  {}", style("Session ended.").dim());
                            break;
                        }
                        ChatCommand::Session => print_session(state, user, json).await?,
                        ChatCommand::Stats => print_stats(state, json)?,
                        ChatCommand::Role(new_role) => {
                            role = new_role;
                            chat_input.update_prompt(&prompt_for(role));
                            println!("\n  {} Role set to {}\n", style("*").cyan().bold(), style(role).bold());
                        }
                        ChatCommand::Unknown(name) => {
                            println!(
                                "\n  {} Unknown command: {}. Type /help for available commands.\n",
                                style("?").yellow().bold(),
                                style(name).dim()
                            );
                        }
                    }
                    continue;
                }

                let result = state.manager.process(&text, user, role).await;
                print_turn(&result, json)?;
            }
        }
    }

    Ok(())
}
