//! Slash command parsing for the chat loop.
//!
//! Commands start with `/`. Anything else is sent to the dialogue engine.

use console::style;

use registrar_types::role::Role;

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Clear the terminal screen.
    Clear,
    /// Exit the chat.
    Exit,
    /// Show the session's dialogue state, sentiment and engagement.
    Session,
    /// Show cache and execution statistics.
    Stats,
    /// Switch the caller's role.
    Role(Role),
    /// Unknown or malformed command.
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let parts: Vec<&str> = trimmed.splitn(2, ' ').collect();
    let cmd = parts[0].to_lowercase();
    let arg = parts.get(1).map(|s| s.trim()).filter(|s| !s.is_empty());

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/clear" | "/cls" => Some(ChatCommand::Clear),
        "/exit" | "/quit" | "/q" => Some(ChatCommand::Exit),
        "/session" => Some(ChatCommand::Session),
        "/stats" => Some(ChatCommand::Stats),
        "/role" => match arg.map(str::parse::<Role>) {
            Some(Ok(role)) => Some(ChatCommand::Role(role)),
            Some(Err(e)) => Some(ChatCommand::Unknown(e)),
            None => Some(ChatCommand::Unknown("/role requires a role".to_string())),
        },
        other => Some(ChatCommand::Unknown(other.to_string())),
    }
}

/// Print the help text listing all available commands.
pub fn print_help() {
    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    println!("  {}       Show this help message", style("/help").cyan());
    println!("  {}      Clear the screen", style("/clear").cyan());
    println!("  {}    Show dialogue state and engagement", style("/session").cyan());
    println!("  {}      Show cache and query statistics", style("/stats").cyan());
    println!("  {}  Switch role (alumno, profesor, administrador)", style("/role <r>").cyan());
    println!("  {}       End the chat", style("/exit").cyan());
    println!();
}
