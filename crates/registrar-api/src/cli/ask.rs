//! One-shot question command.

use anyhow::Result;

use registrar_types::role::Role;

use crate::cli::render::print_turn;
use crate::state::AppState;

/// Process a single message and print the result.
///
/// Sessions live for the process lifetime, so a question that needs more
/// input prints the prompt and ends; use `registrar chat` to answer it.
pub async fn ask(state: &AppState, message: &str, user: &str, role: Role, json: bool) -> Result<()> {
    let result = state.manager.process(message, user, role).await;
    print_turn(&result, json)
}
