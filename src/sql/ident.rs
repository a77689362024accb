//! Identifier normalization and quoting
//!
//! Column and table names are stored in a canonical unquoted UpperCamel
//! form so that filter keys can be compared and merged reliably.
//! Bracket quoting is a presentation step applied once, when the final
//! SQL text is assembled.

use regex::Regex;

use crate::error::{QueryError, Result};

/// Strip one surrounding `[...]` layer, if present
fn strip_brackets(name: &str) -> &str {
    name.strip_prefix('[')
        .and_then(|n| n.strip_suffix(']'))
        .unwrap_or(name)
}

/// Normalize a column name to its canonical UpperCamel form
///
/// A surrounding bracket layer is stripped, runs of `_`, `-` and `.`
/// are removed with the following character upper-cased, and the first
/// character is upper-cased. Idempotent: normalizing an already
/// normalized name is a no-op.
///
/// # Example
/// ```
/// use mssql_query_builder::sql::normalize_field;
///
/// assert_eq!(normalize_field("last_modified"), "LastModified");
/// assert_eq!(normalize_field("[Id]"), "Id");
/// ```
pub fn normalize_field(name: &str) -> String {
    let name = strip_brackets(name);
    let mut normalized = String::with_capacity(name.len());
    let mut upper_next = true;

    for c in name.chars() {
        if matches!(c, '_' | '-' | '.') {
            upper_next = true;
        } else if upper_next {
            normalized.extend(c.to_uppercase());
            upper_next = false;
        } else {
            normalized.push(c);
        }
    }

    normalized
}

/// Normalize a table name, stripping one bracket layer per segment
///
/// Dotted names (`schema.table`, `[dbo].[User]`) normalize segment by
/// segment; each segment is quoted separately again at emission time.
/// Empty names and names with stray brackets are rejected.
pub fn normalize_table(name: &str) -> Result<String> {
    let re = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();

    let segments: Vec<&str> = name.split('.').map(strip_brackets).collect();
    if segments.iter().any(|s| !re.is_match(s)) {
        return Err(QueryError::InvalidTable(name.to_string()));
    }

    Ok(segments.join("."))
}

/// Bracket-quote a column name, unless already quoted
pub fn quote_field(name: &str) -> String {
    if name.starts_with('[') {
        name.to_string()
    } else {
        format!("[{}]", name)
    }
}

/// Bracket-quote a table name, quoting each dot-separated segment
///
/// # Example
/// ```
/// use mssql_query_builder::sql::quote_table;
///
/// assert_eq!(quote_table("dbo.User"), "[dbo].[User]");
/// ```
pub fn quote_table(name: &str) -> String {
    name.split('.')
        .map(quote_field)
        .collect::<Vec<_>>()
        .join(".")
}
