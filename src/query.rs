//! The query model: one statement's clauses and its chainable mutators
//!
//! A [`Query`] accumulates clauses through consuming builder methods and
//! is turned into SQL text by [`Query::to_sql`]. The command is fixed at
//! construction and decides which clauses are legal and which structural
//! checks apply at generation. Generation is a pure read: the same model
//! always produces the same text, and a model can be cloned and reused
//! as a template for several statements.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::clause::{Assignments, Comparison, Filter, FilterEntry, FilterValue, SetValue};
use crate::error::{QueryError, Result};
use crate::param::Parameter;
use crate::sql::command::generate;
use crate::sql::ident::{normalize_field, normalize_table};

/// The SQL command a query builds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    Select,
    Insert,
    Update,
    Delete,
}

impl FromStr for Command {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "select" => Ok(Command::Select),
            "insert" => Ok(Command::Insert),
            "update" => Ok(Command::Update),
            "delete" => Ok(Command::Delete),
            _ => Err(QueryError::CommandNotImplemented(s.to_string())),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Command::Select => "select",
            Command::Insert => "insert",
            Command::Update => "update",
            Command::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// The projected columns of a SELECT
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// Select everything (`*`)
    Wildcard,
    /// An ordered, deduplicated column list; empty renders as `*`
    Columns(Vec<String>),
}

impl Default for Projection {
    fn default() -> Self {
        Projection::Columns(Vec::new())
    }
}

/// Sort direction for one ORDER BY item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub(crate) fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(QueryError::InvalidOrder(s.to_string())),
        }
    }
}

/// One ORDER BY item: a column, a direction and an optional collation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortCriteria {
    pub column: String,
    pub order: SortOrder,
    pub collation: Option<String>,
}

impl SortCriteria {
    /// Ascending sort on `column`
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            order: SortOrder::Asc,
            collation: None,
        }
    }

    /// Descending sort on `column`
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            order: SortOrder::Desc,
            collation: None,
        }
    }

    /// Set an explicit collation for this item
    pub fn collate(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }
}

impl From<&str> for SortCriteria {
    /// A bare column name sorts ascending
    fn from(column: &str) -> Self {
        SortCriteria::asc(column)
    }
}

/// A declarative description of a query, replayed through the mutators
///
/// Building a query from a descriptor and building it by chaining the
/// mutators directly are behaviorally identical: [`Query::with`] replays
/// exactly the fields that are legal for the command, in a fixed
/// canonical order.
#[derive(Debug, Clone, Default)]
pub struct QueryDescriptor {
    pub select: Option<Projection>,
    pub into: Option<String>,
    pub from: Option<String>,
    pub limit: Option<u64>,
    pub skip: Option<u64>,
    pub filter: Option<Filter>,
    pub group_by: Option<Vec<String>>,
    pub having: Option<Filter>,
    pub sort: Option<Vec<SortCriteria>>,
    pub set: Option<Assignments>,
}

/// A single SQL statement under construction
#[derive(Debug, Clone)]
pub struct Query {
    pub(crate) command: Command,
    pub(crate) fields: Projection,
    pub(crate) into: Option<String>,
    pub(crate) from: Option<String>,
    pub(crate) filter: Filter,
    pub(crate) group_by: Vec<String>,
    pub(crate) having: Filter,
    pub(crate) order_by: Vec<SortCriteria>,
    pub(crate) set: Assignments,
    pub(crate) limit: Option<u64>,
    pub(crate) skip: Option<u64>,
}

impl Query {
    /// Create an empty query for the given command
    pub fn new(command: Command) -> Self {
        Self {
            command,
            fields: Projection::default(),
            into: None,
            from: None,
            filter: Filter::new(),
            group_by: Vec::new(),
            having: Filter::new(),
            order_by: Vec::new(),
            set: Assignments::new(),
            limit: None,
            skip: None,
        }
    }

    /// Start a SELECT query
    pub fn select() -> Self {
        Self::new(Command::Select)
    }

    /// Start an INSERT query
    pub fn insert() -> Self {
        Self::new(Command::Insert)
    }

    /// Start an UPDATE query
    pub fn update() -> Self {
        Self::new(Command::Update)
    }

    /// Start a DELETE query
    pub fn delete() -> Self {
        Self::new(Command::Delete)
    }

    /// Build a query for `command` from a descriptor
    ///
    /// Replay order is select, into, from, limit, skip, filter,
    /// group_by, having, sort for SELECT; from, limit, set, filter for
    /// UPDATE; from, limit, filter for DELETE; into, limit, set for
    /// INSERT. Descriptor fields that are not legal for the command are
    /// ignored.
    pub fn with(command: Command, descriptor: QueryDescriptor) -> Result<Self> {
        let mut query = Self::new(command);

        match command {
            Command::Select => {
                if let Some(projection) = descriptor.select {
                    query = match projection {
                        Projection::Wildcard => query.all_columns(),
                        Projection::Columns(columns) => query.columns(columns),
                    };
                }
                if let Some(table) = descriptor.into {
                    query = query.into(&table)?;
                }
                if let Some(table) = descriptor.from {
                    query = query.from(&table)?;
                }
                if let Some(n) = descriptor.limit {
                    query = query.limit(n);
                }
                if let Some(n) = descriptor.skip {
                    query = query.skip(n);
                }
                if let Some(filter) = descriptor.filter {
                    query = query.filter(filter);
                }
                if let Some(columns) = descriptor.group_by {
                    query = query.group_by(columns);
                }
                if let Some(having) = descriptor.having {
                    query = query.having(having)?;
                }
                if let Some(sort) = descriptor.sort {
                    query = query.sort(sort);
                }
            }
            Command::Update => {
                if let Some(table) = descriptor.from {
                    query = query.from(&table)?;
                }
                if let Some(n) = descriptor.limit {
                    query = query.limit(n);
                }
                if let Some(set) = descriptor.set {
                    query = query.set(set)?;
                }
                if let Some(filter) = descriptor.filter {
                    query = query.filter(filter);
                }
            }
            Command::Delete => {
                if let Some(table) = descriptor.from {
                    query = query.from(&table)?;
                }
                if let Some(n) = descriptor.limit {
                    query = query.limit(n);
                }
                if let Some(filter) = descriptor.filter {
                    query = query.filter(filter);
                }
            }
            Command::Insert => {
                if let Some(table) = descriptor.into {
                    query = query.into(&table)?;
                }
                if let Some(n) = descriptor.limit {
                    query = query.limit(n);
                }
                if let Some(set) = descriptor.set {
                    query = query.set(set)?;
                }
            }
        }

        Ok(query)
    }

    /// The command this query was constructed for
    pub fn command(&self) -> Command {
        self.command
    }

    /// Add columns to the projection
    ///
    /// Columns are normalized, deduplicated and kept in first-seen
    /// order across repeated calls. Once the projection is the
    /// wildcard, this is a no-op: a wildcard cannot be narrowed.
    pub fn columns<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Projection::Columns(existing) = &mut self.fields {
            for field in fields {
                let normalized = normalize_field(&field.into());
                if !existing.contains(&normalized) {
                    existing.push(normalized);
                }
            }
        }
        self
    }

    /// Project everything (`select *`)
    pub fn all_columns(mut self) -> Self {
        self.fields = Projection::Wildcard;
        self
    }

    /// Set the target table (`select ... into`, `insert into`)
    ///
    /// Last write wins.
    pub fn into(mut self, table: &str) -> Result<Self> {
        self.into = Some(normalize_table(table)?);
        Ok(self)
    }

    /// Set the source table
    ///
    /// The table a SELECT/DELETE reads from and the table UPDATE
    /// modifies. Last write wins.
    pub fn from(mut self, table: &str) -> Result<Self> {
        self.from = Some(normalize_table(table)?);
        Ok(self)
    }

    /// Merge conditions into the WHERE clause
    ///
    /// Overlapping columns replace the stored condition, new columns
    /// accumulate.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter.merge(filter);
        self
    }

    /// Merge conditions into the HAVING clause (SELECT only)
    pub fn having(mut self, filter: Filter) -> Result<Self> {
        if self.command != Command::Select {
            return Err(QueryError::HavingNotAllowed);
        }
        self.having.merge(filter);
        Ok(self)
    }

    /// Limit the number of affected or returned rows
    ///
    /// Stored verbatim; no upper bound is enforced, bounding is a
    /// caller concern.
    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Skip rows from the result set (SELECT only)
    pub fn skip(mut self, n: u64) -> Self {
        self.skip = Some(n);
        self
    }

    /// Append columns to the GROUP BY list
    pub fn group_by<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for column in columns {
            self.group_by.push(normalize_field(&column.into()));
        }
        self
    }

    /// Append ORDER BY criteria
    ///
    /// Accepts anything convertible to [`SortCriteria`]; a bare column
    /// name sorts ascending.
    pub fn sort<I, C>(mut self, criteria: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<SortCriteria>,
    {
        for item in criteria {
            let mut item = item.into();
            item.column = normalize_field(&item.column);
            self.order_by.push(item);
        }
        self
    }

    /// Merge assignments into the SET clause (UPDATE and INSERT only)
    pub fn set(mut self, assignments: Assignments) -> Result<Self> {
        if !matches!(self.command, Command::Update | Command::Insert) {
            return Err(QueryError::SetNotAllowed);
        }
        self.set.merge(assignments);
        Ok(self)
    }

    /// Generate the final SQL text
    ///
    /// Pure with respect to the model: regeneration yields the same
    /// string. The parameters referenced by the text are available from
    /// [`Query::parameters`].
    pub fn to_sql(&self) -> Result<String> {
        generate(self)
    }

    /// The parameters the generated SQL binds, in emission order
    ///
    /// Hand these to the executing driver together with the text from
    /// [`Query::to_sql`].
    pub fn parameters(&self) -> Vec<&Parameter> {
        let mut params = Vec::new();
        match self.command {
            Command::Select => {
                collect_filter(&self.filter, &mut params);
                collect_filter(&self.having, &mut params);
            }
            Command::Update => {
                collect_set(&self.set, &mut params);
                collect_filter(&self.filter, &mut params);
            }
            Command::Delete => collect_filter(&self.filter, &mut params),
            Command::Insert => collect_set(&self.set, &mut params),
        }
        params
    }
}

fn collect_filter<'a>(filter: &'a Filter, params: &mut Vec<&'a Parameter>) {
    for entry in filter.entries() {
        match entry {
            FilterEntry::AnyOf(branches) => {
                for branch in branches {
                    collect_filter(branch, params);
                }
            }
            FilterEntry::Field { value, .. } => match value {
                FilterValue::Param(p) => params.push(p),
                FilterValue::List(list) => params.extend(list),
                FilterValue::Compound(comparisons) => {
                    for comparison in comparisons {
                        match comparison {
                            Comparison::Gt(p)
                            | Comparison::Gte(p)
                            | Comparison::Lt(p)
                            | Comparison::Lte(p)
                            | Comparison::Ne(p) => params.push(p),
                            Comparison::In(list) | Comparison::NotIn(list) => params.extend(list),
                            Comparison::Null(_) => {}
                        }
                    }
                }
            },
        }
    }
}

fn collect_set<'a>(assignments: &'a Assignments, params: &mut Vec<&'a Parameter>) {
    for (_, value) in assignments.iter() {
        match value {
            SetValue::Param(p) => params.push(p),
            SetValue::Compound(ops) => params.extend(ops.iter().map(|(_, p)| p)),
            SetValue::Null | SetValue::Default | SetValue::CurrentDate => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Command Tests
    // =========================================================================

    #[test]
    fn test_command_from_str() {
        assert_eq!("select".parse::<Command>().unwrap(), Command::Select);
        assert_eq!("delete".parse::<Command>().unwrap(), Command::Delete);
        assert_eq!(
            "upsert".parse::<Command>(),
            Err(QueryError::CommandNotImplemented("upsert".to_string()))
        );
    }

    #[test]
    fn test_sort_order_from_str() {
        assert_eq!("ASC".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert_eq!("Desc".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert_eq!(
            "sideways".parse::<SortOrder>(),
            Err(QueryError::InvalidOrder("sideways".to_string()))
        );
    }

    // =========================================================================
    // Mutator Tests
    // =========================================================================

    #[test]
    fn test_columns_union_first_seen_order() {
        let query = Query::select()
            .columns(["id", "name"])
            .columns(["name", "last_modified"]);

        assert_eq!(
            query.fields,
            Projection::Columns(vec![
                "Id".to_string(),
                "Name".to_string(),
                "LastModified".to_string()
            ])
        );
    }

    #[test]
    fn test_wildcard_cannot_be_narrowed() {
        let query = Query::select().all_columns().columns(["id"]);
        assert_eq!(query.fields, Projection::Wildcard);
    }

    #[test]
    fn test_from_last_write_wins() {
        let query = Query::select().from("User").unwrap().from("Account").unwrap();
        assert_eq!(query.from.as_deref(), Some("Account"));
    }

    #[test]
    fn test_having_only_on_select() {
        let filter = Filter::new().field("active", Parameter::new("a", true));
        assert_eq!(
            Query::update().having(filter).unwrap_err(),
            QueryError::HavingNotAllowed
        );
    }

    #[test]
    fn test_set_only_on_update_and_insert() {
        let assignments = Assignments::new().value("name", Parameter::new("n", "x"));
        assert_eq!(
            Query::select().set(assignments.clone()).unwrap_err(),
            QueryError::SetNotAllowed
        );
        assert_eq!(
            Query::delete().set(assignments.clone()).unwrap_err(),
            QueryError::SetNotAllowed
        );
        assert!(Query::update().set(assignments.clone()).is_ok());
        assert!(Query::insert().set(assignments).is_ok());
    }

    #[test]
    fn test_group_by_appends() {
        let query = Query::select()
            .group_by(["name"])
            .group_by(["type", "verified"]);
        assert_eq!(query.group_by, vec!["Name", "Type", "Verified"]);
    }

    #[test]
    fn test_sort_normalizes_and_appends() {
        let query = Query::select()
            .sort(["name"])
            .sort([SortCriteria::desc("birth_date").collate("utf8")]);

        assert_eq!(query.order_by.len(), 2);
        assert_eq!(query.order_by[0].column, "Name");
        assert_eq!(query.order_by[0].order, SortOrder::Asc);
        assert_eq!(query.order_by[1].column, "BirthDate");
        assert_eq!(query.order_by[1].collation.as_deref(), Some("utf8"));
    }

    #[test]
    fn test_filter_merge_overwrites_overlapping_keys() {
        let query = Query::select()
            .filter(Filter::new().field("type", Parameter::new("old", 1)))
            .filter(
                Filter::new()
                    .field("type", Parameter::new("new", 2))
                    .field("verified", Parameter::new("v", true)),
            );

        assert_eq!(query.filter.entries().len(), 2);
    }

    // =========================================================================
    // Parameter Collection Tests
    // =========================================================================

    #[test]
    fn test_parameters_in_emission_order_select() {
        let query = Query::select()
            .from("User")
            .unwrap()
            .filter(
                Filter::new()
                    .field("active", Parameter::new("isActive", true))
                    .compare(
                        "age",
                        vec![
                            Comparison::Gte(Parameter::new("minAge", 18)),
                            Comparison::Lt(Parameter::new("maxAge", 50)),
                        ],
                    ),
            )
            .having(Filter::new().field("total", Parameter::new("minTotal", 5)))
            .unwrap();

        let names: Vec<_> = query.parameters().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["isActive", "minAge", "maxAge", "minTotal"]);
    }

    #[test]
    fn test_parameters_update_set_before_where() {
        let query = Query::update()
            .from("User")
            .unwrap()
            .set(Assignments::new().value("name", Parameter::new("newName", "x")))
            .unwrap()
            .filter(Filter::new().field("id", Parameter::new("id", 7)));

        let names: Vec<_> = query.parameters().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["newName", "id"]);
    }
}
