//! Error types for query construction and SQL generation

use thiserror::Error;

/// Errors that can occur while building a query or generating its SQL
///
/// Every error is surfaced synchronously at the offending call: mutator
/// misuse fails at the mutator, missing structural clauses fail at
/// generation, and bad value leaves fail during clause translation. No
/// partial SQL is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("HAVING is only allowed in SELECT queries")]
    HavingNotAllowed,

    #[error("SET is only allowed in UPDATE and INSERT queries")]
    SetNotAllowed,

    #[error("Invalid order: {0}. Must be either \"asc\" or \"desc\"")]
    InvalidOrder(String),

    #[error("Invalid table name: {0}")]
    InvalidTable(String),

    #[error("Invalid parameter name: {0}. Must be a parameter with a valid bind name")]
    InvalidParameter(String),

    #[error("Update operators are not allowed in INSERT values: {0}")]
    InvalidInsertValue(String),

    #[error("You must specify a source table with FROM")]
    MissingFrom,

    #[error("You must specify a target table with INTO")]
    MissingInto,

    #[error("You must specify a SET clause")]
    EmptySet,

    #[error("You must specify the insertion data")]
    EmptyInsert,

    #[error("Command not implemented: {0}")]
    CommandNotImplemented(String),
}

pub type Result<T> = std::result::Result<T, QueryError>;
