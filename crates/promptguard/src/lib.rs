//! PromptGuard terminal client library.
//!
//! This crate provides the command-line interface, the one-shot commands
//! and the interactive terminal view for PromptGuard.

pub mod cli;
pub mod commands;
pub mod tui;
