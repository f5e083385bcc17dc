//! CLI command definitions and dispatch for the `registrar` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod ask;
pub mod chat;
pub mod intents;
pub mod render;

use clap::{Parser, Subcommand};
use registrar_types::role::Role;

/// Ask questions about academic records in plain Spanish.
#[derive(Parser)]
#[command(name = "registrar", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask a single question and print the answer.
    Ask {
        /// The question, e.g. "cual es el promedio del alumno Juan Perez".
        message: String,

        /// User id the session belongs to.
        #[arg(long, default_value = "local")]
        user: String,

        /// Caller role (alumno, profesor, administrador).
        #[arg(long, default_value = "alumno")]
        role: Role,
    },

    /// Start an interactive conversation.
    Chat {
        /// User id the session belongs to.
        #[arg(long, default_value = "local")]
        user: String,

        /// Caller role (alumno, profesor, administrador).
        #[arg(long, default_value = "alumno")]
        role: Role,
    },

    /// List the intents the engine recognizes.
    Intents,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask_with_role() {
        let cli = Cli::try_parse_from([
            "registrar",
            "--json",
            "ask",
            "lista de reprobados del 2023",
            "--role",
            "profesor",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Ask { message, user, role } => {
                assert_eq!(message, "lista de reprobados del 2023");
                assert_eq!(user, "local");
                assert_eq!(role, Role::Profesor);
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        assert!(Cli::try_parse_from(["registrar", "chat", "--role", "rector"]).is_err());
    }

    #[test]
    fn test_verbosity_counts() {
        let cli = Cli::try_parse_from(["registrar", "-vv", "intents"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Intents));
    }
}
