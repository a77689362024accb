//! Per-command SQL assembly
//!
//! Each command is a pure function from a populated [`Query`] to the
//! final statement text. Clause order is fixed; optional clauses are
//! appended only when they compile to something non-empty, and every
//! statement ends with `;`.

use crate::error::{QueryError, Result};
use crate::query::{Command, Projection, Query, SortCriteria};
use crate::sql::ident::{quote_field, quote_table};
use crate::sql::search::{insert_lists, search_sql, set_sql};

pub(crate) fn generate(query: &Query) -> Result<String> {
    match query.command {
        Command::Select => select_sql(query),
        Command::Update => update_sql(query),
        Command::Delete => delete_sql(query),
        Command::Insert => insert_sql(query),
    }
}

fn quoted_fields(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| quote_field(c))
        .collect::<Vec<_>>()
        .join(", ")
}

fn order_item(criteria: &SortCriteria) -> String {
    let mut item = quote_field(&criteria.column);
    if let Some(collation) = &criteria.collation {
        item.push_str(&format!(" collate {}", collation));
    }
    item.push(' ');
    item.push_str(criteria.order.keyword());
    item
}

fn select_sql(query: &Query) -> Result<String> {
    let from = query.from.as_deref().ok_or(QueryError::MissingFrom)?;

    let mut sql = String::from("select");

    if let Some(n) = query.limit {
        sql.push_str(&format!(" top {}", n));
    }

    match &query.fields {
        Projection::Columns(columns) if !columns.is_empty() => {
            sql.push_str(&format!(" {}", quoted_fields(columns)));
        }
        _ => sql.push_str(" *"),
    }

    if let Some(into) = &query.into {
        sql.push_str(&format!(" into {}", quote_table(into)));
    }

    sql.push_str(&format!(" from {}", quote_table(from)));

    let where_sql = search_sql(&query.filter)?;
    if !where_sql.is_empty() {
        sql.push_str(&format!(" where {}", where_sql));
    }

    if !query.group_by.is_empty() {
        sql.push_str(&format!(" group by {}", quoted_fields(&query.group_by)));
    }

    let having_sql = search_sql(&query.having)?;
    if !having_sql.is_empty() {
        sql.push_str(&format!(" having {}", having_sql));
    }

    if !query.order_by.is_empty() {
        let items: Vec<String> = query.order_by.iter().map(order_item).collect();
        sql.push_str(&format!(" order by {}", items.join(", ")));
    }

    if let Some(n) = query.skip {
        sql.push_str(&format!(" offset {} rows", n));
    }

    sql.push(';');
    Ok(sql)
}

fn update_sql(query: &Query) -> Result<String> {
    let table = query.from.as_deref().ok_or(QueryError::MissingFrom)?;
    if query.set.is_empty() {
        return Err(QueryError::EmptySet);
    }

    let mut sql = String::from("update");

    if let Some(n) = query.limit {
        sql.push_str(&format!(" top({})", n));
    }

    sql.push_str(&format!(" {}", quote_table(table)));
    sql.push_str(&format!(" set {}", set_sql(&query.set)?));

    let where_sql = search_sql(&query.filter)?;
    if !where_sql.is_empty() {
        sql.push_str(&format!(" where {}", where_sql));
    }

    sql.push(';');
    Ok(sql)
}

fn delete_sql(query: &Query) -> Result<String> {
    let table = query.from.as_deref().ok_or(QueryError::MissingFrom)?;

    let mut sql = String::from("delete");

    if let Some(n) = query.limit {
        sql.push_str(&format!(" top({})", n));
    }

    sql.push_str(&format!(" from {}", quote_table(table)));

    let where_sql = search_sql(&query.filter)?;
    if !where_sql.is_empty() {
        sql.push_str(&format!(" where {}", where_sql));
    }

    sql.push(';');
    Ok(sql)
}

fn insert_sql(query: &Query) -> Result<String> {
    let table = query.into.as_deref().ok_or(QueryError::MissingInto)?;
    if query.set.is_empty() {
        return Err(QueryError::EmptyInsert);
    }

    let mut sql = String::from("insert");

    if let Some(n) = query.limit {
        sql.push_str(&format!(" top({})", n));
    }

    let (columns, values) = insert_lists(&query.set)?;
    sql.push_str(&format!(
        " into {} ({}) values ({});",
        quote_table(table),
        columns,
        values
    ));

    Ok(sql)
}
