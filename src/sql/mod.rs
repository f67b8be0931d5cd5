//! SQL text construction.
//!
//! Identifiers are spliced with [`quote_ident`] and table names are checked
//! against the configured allow-list by callers, instead of free-form
//! string interpolation.

#[cfg(test)]
mod tests;

/// Quote an identifier for the warehouse, doubling embedded quotes.
/// Quoted identifiers are case-sensitive.
#[inline]
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Fully qualified `database.schema.table` name, each part quoted.
#[inline]
pub fn qualified_table(database: &str, schema: &str, table: &str) -> String {
    format!(
        "{}.{}.{}",
        quote_ident(database),
        quote_ident(schema),
        quote_ident(table)
    )
}

/// Name of the warehouse-side view listing a table's duplicate rows.
///
/// The warehouse is expected to expose this view for every dashboard table;
/// the application never creates it. The plural `_duplicate_records` is the
/// single supported convention.
///
/// View names are issued unquoted so the warehouse resolves them
/// case-insensitively, matching views created with ordinary unquoted DDL.
/// The table name comes from the configured allow-list.
#[inline]
pub fn duplicate_view(table: &str) -> String {
    format!("{}_duplicate_records", table)
}

/// Name of the warehouse-side deduplicated view of a table. Issued unquoted
/// like [`duplicate_view`].
#[inline]
pub fn clean_view(table: &str) -> String {
    format!("{}_clean_view", table)
}

#[inline]
pub fn count_query(relation: &str) -> String {
    format!("SELECT COUNT(*) FROM {}", relation)
}

#[inline]
pub fn preview_query(relation: &str, limit: usize) -> String {
    format!("SELECT * FROM {} LIMIT {}", relation, limit)
}

#[inline]
pub fn show_tables_query(database: &str, schema: &str) -> String {
    format!(
        "SHOW TABLES IN SCHEMA {}.{}",
        quote_ident(database),
        quote_ident(schema)
    )
}

#[inline]
pub fn describe_table_query(relation: &str) -> String {
    format!("DESCRIBE TABLE {}", relation)
}

/// Wrap a DMF expression into the query shape the dashboard executes.
#[inline]
pub fn dmf_query(expression: &str, relation: &str) -> String {
    format!("SELECT {} AS \"RESULT\" FROM {}", expression, relation)
}
