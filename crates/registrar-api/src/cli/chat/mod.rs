//! Interactive conversation for Registrar.
//!
//! Reads messages with an async readline, sends each one through the
//! dialogue manager and renders the result. Slash commands inspect the
//! session and switch the caller's role. Entry point:
//! `loop_runner::run_chat_loop`.

pub mod commands;
pub mod input;
pub mod loop_runner;
