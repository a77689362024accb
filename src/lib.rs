//! # mssql-query-builder
//!
//! A Mongo-style declarative query model that generates parameterized
//! SQL Server statements.
//!
//! Application code describes a statement with filter objects and
//! chainable mutators instead of hand-written SQL. Generation produces
//! the final text with bracket-quoted identifiers and `@name` bind
//! markers; runtime values are never inlined, they travel to the driver
//! as a separate parameter set.
//!
//! ## Features
//!
//! - **Full CRUD**: SELECT, INSERT, UPDATE and DELETE assembly with
//!   per-command structural validation
//! - **Mongo-like filters**: comparison operators, membership lists,
//!   null checks and `or` groups compiled to boolean SQL
//! - **Update operators**: arithmetic and bitwise compound assignment
//!   in SET clauses
//! - **Identifier hygiene**: normalized UpperCamel storage form, bracket
//!   quoting applied once at emission
//! - **Parameterized only**: every value is a named bind parameter; the
//!   sole inlined tokens are `NULL`, `DEFAULT` and `GETDATE()`
//!
//! ## Quick Start
//!
//! ```rust
//! use mssql_query_builder::{Comparison, Filter, Parameter, Query, QueryError};
//!
//! fn main() -> Result<(), QueryError> {
//!     let query = Query::select()
//!         .columns(["id", "name"])
//!         .from("User")?
//!         .filter(
//!             Filter::new()
//!                 .field("active", Parameter::new("isActive", true))
//!                 .compare("age", vec![Comparison::Gte(Parameter::new("minAge", 18))]),
//!         )
//!         .limit(10);
//!
//!     assert_eq!(
//!         query.to_sql()?,
//!         "select top 10 [Id], [Name] from [User] where [Active]=@isActive and [Age]>=@minAge;"
//!     );
//!
//!     // Bind these with the driver when executing the text
//!     let names: Vec<_> = query.parameters().iter().map(|p| &p.name).collect();
//!     assert_eq!(names, ["isActive", "minAge"]);
//!     Ok(())
//! }
//! ```
//!
//! ## Descriptors
//!
//! A query can also be described declaratively; the descriptor is
//! replayed through the same mutators, so both styles generate
//! identical SQL:
//!
//! ```rust
//! use mssql_query_builder::{Command, Query, QueryDescriptor, QueryError};
//!
//! fn main() -> Result<(), QueryError> {
//!     let query = Query::with(
//!         Command::Select,
//!         QueryDescriptor {
//!             from: Some("User".to_string()),
//!             limit: Some(5),
//!             ..Default::default()
//!         },
//!     )?;
//!
//!     assert_eq!(query.to_sql()?, "select top 5 * from [User];");
//!     Ok(())
//! }
//! ```

pub mod clause;
pub mod error;
pub mod param;
pub mod query;
pub mod sql;

// Re-export the main types for convenience
pub use clause::{Assignments, Comparison, Filter, FilterValue, SetValue, UpdateOp};
pub use error::{QueryError, Result};
pub use param::{Parameter, SqlType, SqlValue};
pub use query::{Command, Projection, Query, QueryDescriptor, SortCriteria, SortOrder};
pub use sql::{normalize_field, normalize_table, quote_field, quote_table};
