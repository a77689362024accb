//! SQL text generation
//!
//! Identifier normalization and quoting, clause translation, and the
//! per-command statement assembly.

pub(crate) mod command;
pub mod ident;
pub(crate) mod search;

pub use ident::{normalize_field, normalize_table, quote_field, quote_table};
