//! Filter and assignment trees
//!
//! The recursive value shapes stored in a query's WHERE/HAVING and
//! SET/VALUES clauses. Every leaf that contributes a value to SQL is a
//! [`Parameter`](crate::Parameter) or one of the reserved literal
//! markers; raw scalars cannot reach the generator. The boolean
//! disjunction of a filter and the bitwise-or update operator are
//! unrelated variants and cannot be confused for each other.

use indexmap::IndexMap;

use crate::param::Parameter;
use crate::sql::ident::normalize_field;

/// One comparison applied to a single column inside a compound condition
#[derive(Debug, Clone, PartialEq)]
pub enum Comparison {
    /// `column > @p`
    Gt(Parameter),
    /// `column >= @p`
    Gte(Parameter),
    /// `column < @p`
    Lt(Parameter),
    /// `column <= @p`
    Lte(Parameter),
    /// `column != @p`
    Ne(Parameter),
    /// `column in (@p1, @p2, ...)`
    In(Vec<Parameter>),
    /// `column not in (@p1, @p2, ...)`
    NotIn(Vec<Parameter>),
    /// `column is null` when true, `column is not null` when false
    Null(bool),
}

/// The condition attached to one column of a filter
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Simple equality against one parameter
    Param(Parameter),
    /// Membership in a parameter list; an empty list contributes no
    /// predicate
    List(Vec<Parameter>),
    /// One or more comparisons, all of which must hold
    Compound(Vec<Comparison>),
}

/// One entry of a filter, in emission order
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FilterEntry {
    /// Predicate on a single normalized column
    Field { column: String, value: FilterValue },
    /// Disjunction of sibling filters, rendered as one parenthesized
    /// `or` group at this position
    AnyOf(Vec<Filter>),
}

/// An ordered conjunction of column predicates for WHERE or HAVING
///
/// Column names are normalized on insertion, so merging two filters
/// compares keys reliably: an overlapping column replaces the stored
/// condition in place, new columns append. A filter holds at most one
/// disjunction group; inserting another replaces it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    entries: Vec<FilterEntry>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `column` to equal the parameter
    pub fn field(mut self, column: &str, param: Parameter) -> Self {
        self.put_field(normalize_field(column), FilterValue::Param(param));
        self
    }

    /// Require `column` to be one of the listed parameters
    pub fn field_in(mut self, column: &str, params: Vec<Parameter>) -> Self {
        self.put_field(normalize_field(column), FilterValue::List(params));
        self
    }

    /// Require all of the given comparisons to hold for `column`
    pub fn compare(mut self, column: &str, comparisons: Vec<Comparison>) -> Self {
        self.put_field(normalize_field(column), FilterValue::Compound(comparisons));
        self
    }

    /// Require at least one of the given sibling filters to hold
    pub fn any_of(mut self, branches: Vec<Filter>) -> Self {
        self.put_any_of(branches);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn entries(&self) -> &[FilterEntry] {
        &self.entries
    }

    /// Key-wise merge: overlapping columns are replaced in place,
    /// everything else appends
    pub(crate) fn merge(&mut self, other: Filter) {
        for entry in other.entries {
            match entry {
                FilterEntry::Field { column, value } => self.put_field(column, value),
                FilterEntry::AnyOf(branches) => self.put_any_of(branches),
            }
        }
    }

    fn put_field(&mut self, column: String, value: FilterValue) {
        for entry in &mut self.entries {
            if let FilterEntry::Field {
                column: existing,
                value: slot,
            } = entry
                && *existing == column
            {
                *slot = value;
                return;
            }
        }
        self.entries.push(FilterEntry::Field { column, value });
    }

    fn put_any_of(&mut self, branches: Vec<Filter>) {
        for entry in &mut self.entries {
            if let FilterEntry::AnyOf(slot) = entry {
                *slot = branches;
                return;
            }
        }
        self.entries.push(FilterEntry::AnyOf(branches));
    }
}

/// Arithmetic and bitwise update operators for SET clauses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    /// `+=`
    Inc,
    /// `-=`
    Dec,
    /// `*=`
    Mul,
    /// `/=`
    Div,
    /// `%=`
    Mod,
    /// `&=`
    BitAnd,
    /// `^=`
    BitXor,
    /// `|=`
    BitOr,
}

impl UpdateOp {
    pub(crate) fn symbol(self) -> &'static str {
        match self {
            UpdateOp::Inc => "+=",
            UpdateOp::Dec => "-=",
            UpdateOp::Mul => "*=",
            UpdateOp::Div => "/=",
            UpdateOp::Mod => "%=",
            UpdateOp::BitAnd => "&=",
            UpdateOp::BitXor => "^=",
            UpdateOp::BitOr => "|=",
        }
    }
}

/// The value assigned to one column in a SET clause or INSERT row
#[derive(Debug, Clone, PartialEq)]
pub enum SetValue {
    /// Bind the parameter: `column=@p`
    Param(Parameter),
    /// Apply update operators to the current value: `column+=@p`.
    /// Not allowed in INSERT, a new row has no current value.
    Compound(Vec<(UpdateOp, Parameter)>),
    /// `column=NULL`
    Null,
    /// `column=DEFAULT`, the column default
    Default,
    /// `column=GETDATE()`, the server-side current timestamp
    CurrentDate,
}

/// An ordered column-to-value map for UPDATE SET and INSERT VALUES
///
/// Insertion order is the emission order. Re-assigning a column keeps
/// its original position, matching the merge behavior of [`Filter`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assignments {
    entries: IndexMap<String, SetValue>,
}

impl Assignments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a parameter value to `column`
    pub fn value(mut self, column: &str, param: Parameter) -> Self {
        self.entries
            .insert(normalize_field(column), SetValue::Param(param));
        self
    }

    /// Apply one or more update operators to `column`
    pub fn apply(mut self, column: &str, ops: Vec<(UpdateOp, Parameter)>) -> Self {
        self.entries
            .insert(normalize_field(column), SetValue::Compound(ops));
        self
    }

    /// Assign NULL to `column`
    pub fn null(mut self, column: &str) -> Self {
        self.entries.insert(normalize_field(column), SetValue::Null);
        self
    }

    /// Assign the column default to `column`
    pub fn default_value(mut self, column: &str) -> Self {
        self.entries
            .insert(normalize_field(column), SetValue::Default);
        self
    }

    /// Assign the server current timestamp to `column`
    pub fn current_date(mut self, column: &str) -> Self {
        self.entries
            .insert(normalize_field(column), SetValue::CurrentDate);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &SetValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn merge(&mut self, other: Assignments) {
        for (column, value) in other.entries {
            self.entries.insert(column, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_normalizes_columns() {
        let f = Filter::new().field("last_modified", Parameter::new("ts", 1));
        match &f.entries()[0] {
            FilterEntry::Field { column, .. } => assert_eq!(column, "LastModified"),
            other => panic!("unexpected entry: {:?}", other),
        }
    }

    #[test]
    fn test_filter_merge_replaces_in_place() {
        let mut f = Filter::new()
            .field("type", Parameter::new("a", 1))
            .field("verified", Parameter::new("b", 2));
        f.merge(Filter::new().field("type", Parameter::new("c", 3)));

        assert_eq!(f.entries().len(), 2);
        match &f.entries()[0] {
            FilterEntry::Field { column, value } => {
                assert_eq!(column, "Type");
                assert_eq!(value, &FilterValue::Param(Parameter::new("c", 3)));
            }
            other => panic!("unexpected entry: {:?}", other),
        }
    }

    #[test]
    fn test_filter_single_disjunction_slot() {
        let f = Filter::new()
            .any_of(vec![Filter::new().field("a", Parameter::new("p1", 1))])
            .any_of(vec![Filter::new().field("b", Parameter::new("p2", 2))]);

        let any_of: Vec<_> = f
            .entries()
            .iter()
            .filter(|e| matches!(e, FilterEntry::AnyOf(_)))
            .collect();
        assert_eq!(any_of.len(), 1);
        match any_of[0] {
            FilterEntry::AnyOf(branches) => assert_eq!(branches.len(), 1),
            other => panic!("unexpected entry: {:?}", other),
        }
    }

    #[test]
    fn test_assignments_keep_first_seen_order() {
        let mut a = Assignments::new()
            .value("name", Parameter::new("n", "x"))
            .null("notes");
        a.merge(Assignments::new().value("name", Parameter::new("m", "y")));

        let columns: Vec<_> = a.iter().map(|(c, _)| c).collect();
        assert_eq!(columns, vec!["Name", "Notes"]);
    }

    #[test]
    fn test_update_op_symbols() {
        assert_eq!(UpdateOp::Inc.symbol(), "+=");
        assert_eq!(UpdateOp::Mod.symbol(), "%=");
        assert_eq!(UpdateOp::BitOr.symbol(), "|=");
    }
}
