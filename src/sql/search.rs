//! Clause translation for WHERE, HAVING, SET and INSERT values
//!
//! Compiles the filter and assignment trees into SQL text fragments.
//! Values are emitted exclusively as `@name` bind markers; the only
//! inlined tokens are the reserved `NULL`, `DEFAULT` and `GETDATE()`
//! markers.

use regex::Regex;

use crate::clause::{Assignments, Comparison, Filter, FilterEntry, FilterValue, SetValue};
use crate::error::{QueryError, Result};
use crate::param::Parameter;
use crate::sql::ident::quote_field;

/// Render a parameter as its bind marker, rejecting names that are not
/// valid bind identifiers
fn bind(param: &Parameter) -> Result<String> {
    let re = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
    if !re.is_match(&param.name) {
        return Err(QueryError::InvalidParameter(param.name.clone()));
    }
    Ok(format!("@{}", param.name))
}

fn bind_list(params: &[Parameter]) -> Result<String> {
    let markers: Vec<String> = params.iter().map(bind).collect::<Result<_>>()?;
    Ok(markers.join(", "))
}

/// Compile a filter into the body of a WHERE or HAVING clause
///
/// Top-level predicates join with ` and ` in insertion order. A
/// disjunction group renders as `(a or b or ...)` at its position.
/// An empty filter, or one whose entries all contribute nothing (empty
/// membership lists), compiles to an empty string and the caller omits
/// the clause entirely.
pub(crate) fn search_sql(filter: &Filter) -> Result<String> {
    let mut predicates = Vec::new();

    for entry in filter.entries() {
        match entry {
            FilterEntry::AnyOf(branches) => {
                let mut parts = Vec::new();
                for branch in branches {
                    let sql = search_sql(branch)?;
                    if !sql.is_empty() {
                        parts.push(sql);
                    }
                }
                if !parts.is_empty() {
                    predicates.push(format!("({})", parts.join(" or ")));
                }
            }
            FilterEntry::Field { column, value } => {
                if let Some(predicate) = field_predicate(column, value)? {
                    predicates.push(predicate);
                }
            }
        }
    }

    Ok(predicates.join(" and "))
}

/// Compile the predicate for a single column, or None if the condition
/// contributes nothing
fn field_predicate(column: &str, value: &FilterValue) -> Result<Option<String>> {
    let field = quote_field(column);

    match value {
        FilterValue::Param(param) => Ok(Some(format!("{}={}", field, bind(param)?))),
        FilterValue::List(params) => {
            if params.is_empty() {
                return Ok(None);
            }
            Ok(Some(format!("{} in ({})", field, bind_list(params)?)))
        }
        FilterValue::Compound(comparisons) => {
            let mut atoms = Vec::new();
            for comparison in comparisons {
                if let Some(atom) = comparison_sql(&field, comparison)? {
                    atoms.push(atom);
                }
            }
            match atoms.len() {
                0 => Ok(None),
                // A lone comparison needs no grouping
                1 => Ok(Some(atoms.remove(0))),
                _ => Ok(Some(format!("({})", atoms.join(" and ")))),
            }
        }
    }
}

fn comparison_sql(field: &str, comparison: &Comparison) -> Result<Option<String>> {
    let atom = match comparison {
        Comparison::Gt(p) => format!("{}>{}", field, bind(p)?),
        Comparison::Gte(p) => format!("{}>={}", field, bind(p)?),
        Comparison::Lt(p) => format!("{}<{}", field, bind(p)?),
        Comparison::Lte(p) => format!("{}<={}", field, bind(p)?),
        Comparison::Ne(p) => format!("{}!={}", field, bind(p)?),
        Comparison::In(params) => {
            if params.is_empty() {
                return Ok(None);
            }
            format!("{} in ({})", field, bind_list(params)?)
        }
        Comparison::NotIn(params) => {
            if params.is_empty() {
                return Ok(None);
            }
            format!("{} not in ({})", field, bind_list(params)?)
        }
        Comparison::Null(true) => format!("{} is null", field),
        Comparison::Null(false) => format!("{} is not null", field),
    };
    Ok(Some(atom))
}

/// Compile assignments into the body of an UPDATE SET clause
///
/// Fragments join with `, `; each is a standalone assignment, so
/// compound operators are not parenthesized the way WHERE groups are.
pub(crate) fn set_sql(assignments: &Assignments) -> Result<String> {
    let mut fragments = Vec::new();

    for (column, value) in assignments.iter() {
        let field = quote_field(column);
        match value {
            SetValue::Param(param) => fragments.push(format!("{}={}", field, bind(param)?)),
            SetValue::Compound(ops) => {
                for (op, param) in ops {
                    fragments.push(format!("{}{}{}", field, op.symbol(), bind(param)?));
                }
            }
            SetValue::Null => fragments.push(format!("{}=NULL", field)),
            SetValue::Default => fragments.push(format!("{}=DEFAULT", field)),
            SetValue::CurrentDate => fragments.push(format!("{}=GETDATE()", field)),
        }
    }

    Ok(fragments.join(", "))
}

/// Compile assignments into the INSERT column and value lists
///
/// Both lists follow the assignment map's insertion order and always
/// have the same length. Update operators have no meaning for a fresh
/// row and fail loudly.
pub(crate) fn insert_lists(assignments: &Assignments) -> Result<(String, String)> {
    let mut columns = Vec::new();
    let mut values = Vec::new();

    for (column, value) in assignments.iter() {
        let expression = match value {
            SetValue::Param(param) => bind(param)?,
            SetValue::Null => "NULL".to_string(),
            SetValue::Default => "DEFAULT".to_string(),
            SetValue::CurrentDate => "GETDATE()".to_string(),
            SetValue::Compound(_) => {
                return Err(QueryError::InvalidInsertValue(column.to_string()));
            }
        };
        columns.push(quote_field(column));
        values.push(expression);
    }

    Ok((columns.join(", "), values.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause::UpdateOp;

    // =========================================================================
    // WHERE / HAVING Translation Tests
    // =========================================================================

    #[test]
    fn test_search_simple_equality() {
        let filter = Filter::new().field("active", Parameter::new("isActive", true));
        assert_eq!(search_sql(&filter).unwrap(), "[Active]=@isActive");
    }

    #[test]
    fn test_search_top_level_and_count() {
        let filter = Filter::new()
            .field("a", Parameter::new("p1", 1))
            .field("b", Parameter::new("p2", 2))
            .field("c", Parameter::new("p3", 3));

        let sql = search_sql(&filter).unwrap();
        assert_eq!(sql.matches(" and ").count(), 2);
        assert_eq!(sql, "[A]=@p1 and [B]=@p2 and [C]=@p3");
    }

    #[test]
    fn test_search_membership_list() {
        let filter = Filter::new().field_in(
            "alert_level",
            vec![Parameter::new("lowLevel", 1), Parameter::new("mediumLevel", 2)],
        );
        assert_eq!(
            search_sql(&filter).unwrap(),
            "[AlertLevel] in (@lowLevel, @mediumLevel)"
        );
    }

    #[test]
    fn test_search_empty_list_contributes_nothing() {
        let filter = Filter::new()
            .field_in("status", vec![])
            .field("active", Parameter::new("isActive", true));
        assert_eq!(search_sql(&filter).unwrap(), "[Active]=@isActive");
    }

    #[test]
    fn test_search_compound_single_atom_unparenthesized() {
        let filter = Filter::new().compare("name", vec![Comparison::Null(false)]);
        assert_eq!(search_sql(&filter).unwrap(), "[Name] is not null");
    }

    #[test]
    fn test_search_compound_group_parenthesized() {
        let filter = Filter::new().compare(
            "age",
            vec![
                Comparison::Gte(Parameter::new("minAge", 18)),
                Comparison::Lt(Parameter::new("maxAge", 50)),
            ],
        );
        assert_eq!(
            search_sql(&filter).unwrap(),
            "([Age]>=@minAge and [Age]<@maxAge)"
        );
    }

    #[test]
    fn test_search_null_truthiness() {
        let is_null = Filter::new().compare("name", vec![Comparison::Null(true)]);
        assert_eq!(search_sql(&is_null).unwrap(), "[Name] is null");
    }

    #[test]
    fn test_search_disjunction_group() {
        let filter = Filter::new()
            .field("active", Parameter::new("active", true))
            .any_of(vec![
                Filter::new().field("type", Parameter::new("typeBusiness", "business")),
                Filter::new()
                    .field("type", Parameter::new("typeClient", "client"))
                    .field("verified", Parameter::new("verified", true)),
            ]);

        assert_eq!(
            search_sql(&filter).unwrap(),
            "[Active]=@active and ([Type]=@typeBusiness or [Type]=@typeClient and [Verified]=@verified)"
        );
    }

    #[test]
    fn test_search_rejects_bad_parameter_name() {
        let filter = Filter::new().field("id", Parameter::new("", 1));
        assert_eq!(
            search_sql(&filter),
            Err(QueryError::InvalidParameter("".to_string()))
        );

        let filter = Filter::new().field("id", Parameter::new("1; drop", 1));
        assert!(search_sql(&filter).is_err());
    }

    // =========================================================================
    // SET Translation Tests
    // =========================================================================

    #[test]
    fn test_set_simple_and_literals() {
        let assignments = Assignments::new()
            .value("name", Parameter::new("name", "John Snow"))
            .null("notes")
            .default_value("active")
            .current_date("last_modified");

        assert_eq!(
            set_sql(&assignments).unwrap(),
            "[Name]=@name, [Notes]=NULL, [Active]=DEFAULT, [LastModified]=GETDATE()"
        );
    }

    #[test]
    fn test_set_compound_operators() {
        let assignments = Assignments::new().apply(
            "counter",
            vec![
                (UpdateOp::Inc, Parameter::new("step", 1)),
                (UpdateOp::Mod, Parameter::new("wrap", 100)),
            ],
        );

        assert_eq!(
            set_sql(&assignments).unwrap(),
            "[Counter]+=@step, [Counter]%=@wrap"
        );
    }

    #[test]
    fn test_set_bitwise_operators() {
        let assignments = Assignments::new().apply(
            "flags",
            vec![(UpdateOp::BitOr, Parameter::new("mask", 4))],
        );
        assert_eq!(set_sql(&assignments).unwrap(), "[Flags]|=@mask");
    }

    // =========================================================================
    // INSERT List Tests
    // =========================================================================

    #[test]
    fn test_insert_lists_preserve_order() {
        let assignments = Assignments::new()
            .value("name", Parameter::new("name", "John Snow"))
            .default_value("active")
            .null("notes")
            .current_date("created");

        let (columns, values) = insert_lists(&assignments).unwrap();
        assert_eq!(columns, "[Name], [Active], [Notes], [Created]");
        assert_eq!(values, "@name, DEFAULT, NULL, GETDATE()");
    }

    #[test]
    fn test_insert_rejects_update_operators() {
        let assignments =
            Assignments::new().apply("counter", vec![(UpdateOp::Inc, Parameter::new("step", 1))]);
        assert_eq!(
            insert_lists(&assignments),
            Err(QueryError::InvalidInsertValue("Counter".to_string()))
        );
    }
}
