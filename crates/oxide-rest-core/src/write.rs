//! INSERT, upsert and keyed UPDATE builders.

use std::marker::PhantomData;

use crate::dialect::SqliteDialect;
use crate::schema::TableSchema;
use crate::value::{SqlValue, ToSqlValue};

// Typestate markers

/// Marker: No table specified yet.
pub struct NoTable;
/// Marker: Table has been specified.
pub struct HasTable;
/// Marker: No values specified yet.
pub struct NoValues;
/// Marker: Values have been specified.
pub struct HasValues;

/// One `ON CONFLICT (...) DO UPDATE SET ...` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ConflictClause {
    target: Vec<String>,
    update_columns: Vec<String>,
}

/// A type-safe INSERT builder with optional SQLite upsert clauses.
///
/// A row without columns renders as `DEFAULT VALUES`, which SQLite does not
/// allow to carry an upsert clause, so conflict clauses are dropped then.
pub struct InsertBuilder<Table, Values> {
    table: Option<String>,
    columns: Vec<String>,
    values: Vec<SqlValue>,
    conflicts: Vec<ConflictClause>,
    returning_rowid: bool,
    _state: PhantomData<(Table, Values)>,
}

impl InsertBuilder<NoTable, NoValues> {
    /// Creates a new INSERT builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: None,
            columns: vec![],
            values: vec![],
            conflicts: vec![],
            returning_rowid: false,
            _state: PhantomData,
        }
    }
}

impl Default for InsertBuilder<NoTable, NoValues> {
    fn default() -> Self {
        Self::new()
    }
}

// Transition: NoTable -> HasTable
impl<Values> InsertBuilder<NoTable, Values> {
    /// Specifies the table to insert into.
    #[must_use]
    pub fn into_table(self, table: &str) -> InsertBuilder<HasTable, Values> {
        InsertBuilder {
            table: Some(String::from(table)),
            columns: self.columns,
            values: self.values,
            conflicts: self.conflicts,
            returning_rowid: self.returning_rowid,
            _state: PhantomData,
        }
    }
}

// Transition: NoValues -> HasValues
impl InsertBuilder<HasTable, NoValues> {
    /// Sets the row to insert as column/value pairs.
    #[must_use]
    pub fn row<T: ToSqlValue>(self, row: Vec<(String, T)>) -> InsertBuilder<HasTable, HasValues> {
        let (columns, values) = row
            .into_iter()
            .map(|(column, value)| (column, value.to_sql_value()))
            .unzip();
        InsertBuilder {
            table: self.table,
            columns,
            values,
            conflicts: self.conflicts,
            returning_rowid: self.returning_rowid,
            _state: PhantomData,
        }
    }
}

impl InsertBuilder<HasTable, HasValues> {
    /// Adds one conflict clause per upsert target of the table.
    ///
    /// On conflict only the non-primary-key columns present in the row are
    /// overwritten; columns the row leaves out keep their stored values. A
    /// row carrying nothing but its primary key updates the target columns
    /// instead, so the clause stays valid.
    #[must_use]
    pub fn upsert(mut self, table: &TableSchema) -> Self {
        let merged: Vec<String> = self
            .columns
            .iter()
            .filter(|name| !table.column_info(name).is_some_and(|c| c.is_primary_key))
            .cloned()
            .collect();

        for target in table.upsert_policy().targets() {
            let update_columns = if merged.is_empty() {
                target.clone()
            } else {
                merged.clone()
            };
            self.conflicts.push(ConflictClause {
                target: target.clone(),
                update_columns,
            });
        }
        self
    }

    /// Appends `RETURNING rowid`.
    #[must_use]
    pub fn returning_rowid(mut self) -> Self {
        self.returning_rowid = true;
        self
    }

    /// Builds the INSERT statement and returns SQL with parameters.
    #[must_use]
    pub fn build(self) -> (String, Vec<SqlValue>) {
        let dialect = SqliteDialect::new();
        let mut sql = String::from("INSERT INTO ");

        if let Some(ref table) = self.table {
            sql.push_str(&dialect.quote_identifier(table));
        }

        if self.columns.is_empty() {
            sql.push_str(" DEFAULT VALUES");
        } else {
            sql.push_str(" (");
            sql.push_str(&dialect.quote_list(&self.columns));
            sql.push_str(") VALUES (");
            let placeholders: Vec<&str> = self
                .values
                .iter()
                .map(|_| SqlValue::placeholder())
                .collect();
            sql.push_str(&placeholders.join(", "));
            sql.push(')');

            for clause in &self.conflicts {
                sql.push_str(" ON CONFLICT (");
                sql.push_str(&dialect.quote_list(&clause.target));
                sql.push_str(") DO UPDATE SET ");
                let updates: Vec<String> = clause
                    .update_columns
                    .iter()
                    .map(|col| {
                        let col = dialect.quote_identifier(col);
                        format!("{col} = excluded.{col}")
                    })
                    .collect();
                sql.push_str(&updates.join(", "));
            }
        }

        if self.returning_rowid {
            sql.push_str(" RETURNING rowid");
        }

        (sql, self.values)
    }

    /// Builds the INSERT statement and returns only the SQL string.
    #[must_use]
    pub fn build_sql(self) -> String {
        let (sql, _) = self.build();
        sql
    }
}

/// `UPDATE <table> SET ... WHERE <key> = ?`.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateByKey {
    table: String,
    assignments: Vec<(String, SqlValue)>,
    key_column: String,
    key_value: SqlValue,
}

impl UpdateByKey {
    /// Creates an update of the row whose `key_column` equals `key_value`.
    pub fn new(
        table: impl Into<String>,
        key_column: impl Into<String>,
        key_value: impl ToSqlValue,
    ) -> Self {
        Self {
            table: table.into(),
            assignments: Vec::new(),
            key_column: key_column.into(),
            key_value: key_value.to_sql_value(),
        }
    }

    /// Adds a `column = value` assignment.
    #[must_use]
    pub fn set(mut self, column: impl Into<String>, value: impl ToSqlValue) -> Self {
        self.assignments.push((column.into(), value.to_sql_value()));
        self
    }

    /// Builds the UPDATE statement and returns SQL with parameters.
    #[must_use]
    pub fn build(self) -> (String, Vec<SqlValue>) {
        let dialect = SqliteDialect::new();
        let sets: Vec<String> = self
            .assignments
            .iter()
            .map(|(col, _)| format!("{} = ?", dialect.quote_identifier(col)))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?",
            dialect.quote_identifier(&self.table),
            sets.join(", "),
            dialect.quote_identifier(&self.key_column)
        );
        let mut params: Vec<SqlValue> = self.assignments.into_iter().map(|(_, v)| v).collect();
        params.push(self.key_value);
        (sql, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnInfo;

    fn countries() -> TableSchema {
        TableSchema::new("countries")
            .column(ColumnInfo::new("id", "INTEGER").primary_key())
            .column(ColumnInfo::new("iso", "TEXT"))
            .column(ColumnInfo::new("name", "TEXT"))
            .unique_index(&["iso"])
    }

    fn row(pairs: &[(&str, &str)]) -> Vec<(String, SqlValue)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.to_sql_value()))
            .collect()
    }

    #[test]
    fn test_plain_insert() {
        let (sql, params) = InsertBuilder::new()
            .into_table("countries")
            .row(row(&[("iso", "CAN"), ("name", "Canada")]))
            .returning_rowid()
            .build();
        assert_eq!(
            sql,
            "INSERT INTO `countries` (`iso`, `name`) VALUES (?, ?) RETURNING rowid"
        );
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_upsert_single_target() {
        let sql = InsertBuilder::new()
            .into_table("countries")
            .row(row(&[("iso", "CAN"), ("name", "Canada")]))
            .upsert(&countries())
            .build_sql();
        assert_eq!(
            sql,
            "INSERT INTO `countries` (`iso`, `name`) VALUES (?, ?) \
             ON CONFLICT (`iso`) DO UPDATE SET `iso` = excluded.`iso`, `name` = excluded.`name`"
        );
    }

    #[test]
    fn test_upsert_composite_and_multiple_targets() {
        let table = countries().unique_index(&["name", "iso"]);
        let sql = InsertBuilder::new()
            .into_table("countries")
            .row(row(&[("iso", "CAN")]))
            .upsert(&table)
            .build_sql();
        assert_eq!(sql.matches("ON CONFLICT").count(), 2);
        assert!(sql.contains("ON CONFLICT (`name`, `iso`) DO UPDATE SET"));
    }

    #[test]
    fn test_upsert_without_targets_is_plain_insert() {
        let table = TableSchema::new("notes").column(ColumnInfo::new("body", "TEXT"));
        let sql = InsertBuilder::new()
            .into_table("notes")
            .row(row(&[("body", "hi")]))
            .upsert(&table)
            .build_sql();
        assert_eq!(sql, "INSERT INTO `notes` (`body`) VALUES (?)");
    }

    #[test]
    fn test_upsert_merges_only_sent_columns() {
        let table = countries().column(ColumnInfo::new("tld", "TEXT"));
        let sql = InsertBuilder::new()
            .into_table("countries")
            .row(row(&[("id", "1"), ("iso", "CAN")]))
            .upsert(&table)
            .build_sql();
        assert_eq!(
            sql,
            "INSERT INTO `countries` (`id`, `iso`) VALUES (?, ?) \
             ON CONFLICT (`iso`) DO UPDATE SET `iso` = excluded.`iso`"
        );
    }

    #[test]
    fn test_key_only_table_updates_target() {
        let table = TableSchema::new("tags")
            .column(ColumnInfo::new("tag", "TEXT").primary_key())
            .unique_index(&["tag"]);
        let sql = InsertBuilder::new()
            .into_table("tags")
            .row(row(&[("tag", "rust")]))
            .upsert(&table)
            .build_sql();
        assert!(sql.ends_with("ON CONFLICT (`tag`) DO UPDATE SET `tag` = excluded.`tag`"));
    }

    #[test]
    fn test_empty_row_uses_default_values() {
        let (sql, params) = InsertBuilder::new()
            .into_table("countries")
            .row(Vec::<(String, SqlValue)>::new())
            .upsert(&countries())
            .returning_rowid()
            .build();
        assert_eq!(sql, "INSERT INTO `countries` DEFAULT VALUES RETURNING rowid");
        assert!(params.is_empty());
    }

    #[test]
    fn test_update_by_key() {
        let update = UpdateByKey::new("countries", "id", "7")
            .set("name", "Canada")
            .set("iso", "CAN");
        let (sql, params) = update.build();
        assert_eq!(
            sql,
            "UPDATE `countries` SET `name` = ?, `iso` = ? WHERE `id` = ?"
        );
        assert_eq!(params[2], SqlValue::Text(String::from("7")));
    }
}
