//! Output formatting utilities for the sq CLI.
//!
//! This module provides functions for formatting compiler results as tables or JSON.
//! It is organized into submodules by result type:
//!
//! - [`clauses`] - Clause list output (parse)
//! - [`tokens`] - Token stream output (tokens)
//! - [`diagnostics`] - Skipped input output (parse, check)
//! - [`helpers`] - Common formatting utilities (truncation, headers)

mod clauses;
mod diagnostics;
pub mod helpers;
mod tokens;

pub use clauses::{format_clauses_json, format_clauses_table};
pub use diagnostics::{format_check_json, format_diagnostics_table};
pub use tokens::{format_tokens_json, format_tokens_table};
