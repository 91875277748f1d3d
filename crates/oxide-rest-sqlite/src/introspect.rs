//! SQLite schema introspection.
//!
//! Reads `sqlite_master` and the `pragma_*` table-valued functions to build
//! a [`SchemaCatalog`]: every user table with its columns in declaration
//! order, its primary key, its unique indexes and an example value per
//! column taken from the table's first row.

use oxide_rest_core::{ColumnInfo, SchemaCatalog, SqlValue, TableSchema};
use serde_json::Value as JsonValue;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::bind::decode_row;
use crate::error::Result;

/// Example text shown for binary columns.
pub const BINARY_EXAMPLE: &str = "<binary data>";

/// Introspects every user table of the database.
///
/// # Errors
///
/// Returns an error if any catalog query fails.
pub async fn introspect(pool: &SqlitePool) -> Result<SchemaCatalog> {
    let tables: Vec<(String,)> = sqlx::query_as(
        "SELECT name FROM sqlite_master \
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    let mut catalog = SchemaCatalog::new();
    for (name,) in tables {
        catalog = catalog.table(introspect_table(pool, &name).await?);
    }

    info!(tables = catalog.len(), "Schema introspected");
    Ok(catalog)
}

/// Introspects one table.
///
/// # Errors
///
/// Returns an error if any catalog query fails.
pub async fn introspect_table(pool: &SqlitePool, table: &str) -> Result<TableSchema> {
    let columns: Vec<(String, String, i64)> =
        sqlx::query_as("SELECT name, type, pk FROM pragma_table_info(?) ORDER BY cid")
            .bind(table)
            .fetch_all(pool)
            .await?;

    let primary_key = columns
        .iter()
        .filter(|(_, _, pk)| *pk > 0)
        .min_by_key(|(_, _, pk)| *pk)
        .map(|(name, _, _)| name.clone());

    let examples = first_row_examples(pool, table).await?;

    let mut schema = TableSchema::new(table);
    for (name, declared_type, _) in &columns {
        let mut column = ColumnInfo::new(name.as_str(), declared_type.as_str());
        if primary_key.as_deref() == Some(name.as_str()) {
            column = column.primary_key();
        }
        if let Some(example) = examples.iter().find(|(n, _)| n == name) {
            column = column.example(example.1.clone());
        }
        schema = schema.column(column);
    }

    for index in unique_indexes(pool, table).await? {
        let refs: Vec<&str> = index.iter().map(String::as_str).collect();
        schema = schema.unique_index(&refs);
    }

    debug!(
        table = %table,
        columns = schema.columns().len(),
        primary_key = ?schema.primary_key(),
        unique = ?schema.unique_columns(),
        "Introspected table"
    );

    Ok(schema)
}

/// Returns the column lists of the table's non-partial unique indexes.
///
/// Indexes over expressions are skipped; they cannot be named as an
/// `ON CONFLICT` target.
async fn unique_indexes(pool: &SqlitePool, table: &str) -> Result<Vec<Vec<String>>> {
    let indexes: Vec<(String, i64)> =
        sqlx::query_as("SELECT name, partial FROM pragma_index_list(?) WHERE \"unique\" = 1 ORDER BY seq")
            .bind(table)
            .fetch_all(pool)
            .await?;

    let mut targets = Vec::new();
    for (index, partial) in indexes {
        if partial != 0 {
            continue;
        }
        let columns: Vec<(Option<String>,)> =
            sqlx::query_as("SELECT name FROM pragma_index_info(?) ORDER BY seqno")
                .bind(&index)
                .fetch_all(pool)
                .await?;
        let columns: Option<Vec<String>> = columns.into_iter().map(|(name,)| name).collect();
        match columns {
            Some(columns) if !columns.is_empty() => targets.push(columns),
            _ => debug!(table = %table, index = %index, "Skipping expression index"),
        }
    }
    Ok(targets)
}

/// Returns `(column, example)` pairs from the first row, or nothing for an
/// empty table.
async fn first_row_examples(pool: &SqlitePool, table: &str) -> Result<Vec<(String, JsonValue)>> {
    let sql = format!(
        "SELECT * FROM {} LIMIT 1",
        oxide_rest_core::dialect::SqliteDialect::new().quote_identifier(table)
    );
    let Some(row) = sqlx::query(&sql).fetch_optional(pool).await? else {
        return Ok(Vec::new());
    };

    let row = decode_row(&row)?;
    Ok(row
        .iter()
        .map(|(name, value)| {
            let example = match value {
                SqlValue::Blob(_) => JsonValue::String(String::from(BINARY_EXAMPLE)),
                other => other.to_json(),
            };
            (name.to_string(), example)
        })
        .collect())
}
