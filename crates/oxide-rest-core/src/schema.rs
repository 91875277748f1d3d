//! Schema catalog types.
//!
//! A [`SchemaCatalog`] is built once by an introspector and is read-only
//! afterwards. It is the single source of truth for which tables and
//! columns exist, what kind of data they hold and which columns form the
//! table's uniqueness constraints.

use serde::Serialize;
use serde_json::Value as JsonValue;

/// Coarse storage kind of a column, derived from its declared SQL type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnKind {
    /// Text-like column (`TEXT`, `VARCHAR(n)`, `CLOB`, ...).
    Text,
    /// Integer-like column (`INTEGER`, `BIGINT`, ...).
    Integer,
    /// Binary column (`BLOB`).
    Blob,
    /// Anything else, including columns without a declared type.
    Other,
}

impl ColumnKind {
    /// Maps a declared SQL type to a column kind.
    ///
    /// Matching is case-insensitive and follows SQLite's affinity rules,
    /// except that an empty declared type is `Other` rather than `Blob`.
    #[must_use]
    pub fn from_declared_type(declared: &str) -> Self {
        let upper = declared.to_ascii_uppercase();
        if upper.contains("INT") {
            Self::Integer
        } else if upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT") {
            Self::Text
        } else if upper.contains("BLOB") {
            Self::Blob
        } else {
            Self::Other
        }
    }
}

/// Introspected metadata for one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// Declared SQL type, as written in the table definition.
    pub declared_type: String,
    /// Storage kind.
    pub kind: ColumnKind,
    /// Whether the column takes part in a unique index.
    pub is_unique: bool,
    /// Whether this is the table's primary key column.
    pub is_primary_key: bool,
    /// Example value taken from the first row of the table.
    pub example: JsonValue,
}

impl ColumnInfo {
    /// Creates a new column with its kind derived from the declared type.
    #[must_use]
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        let declared_type = declared_type.into();
        Self {
            name: name.into(),
            kind: ColumnKind::from_declared_type(&declared_type),
            declared_type,
            is_unique: false,
            is_primary_key: false,
            example: JsonValue::Null,
        }
    }

    /// Marks the column as the primary key.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    /// Marks the column as unique.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    /// Sets the example value.
    #[must_use]
    pub fn example(mut self, example: JsonValue) -> Self {
        self.example = example;
        self
    }
}

/// Conflict targets used when an insert turns into an upsert.
///
/// Each target is the ordered column list of one unique index, which is
/// exactly what SQLite accepts in `ON CONFLICT (...)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpsertPolicy {
    targets: Vec<Vec<String>>,
}

impl UpsertPolicy {
    /// Returns the conflict targets.
    #[must_use]
    pub fn targets(&self) -> &[Vec<String>] {
        &self.targets
    }

    /// Returns true if the table has no usable conflict target.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Metadata for one table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSchema {
    /// Table name.
    pub name: String,
    columns: Vec<ColumnInfo>,
    primary_key: Option<String>,
    unique_columns: Vec<String>,
    upsert_policy: UpsertPolicy,
}

impl TableSchema {
    /// Creates a new table schema without columns.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_key: None,
            unique_columns: Vec::new(),
            upsert_policy: UpsertPolicy::default(),
        }
    }

    /// Adds a column to the table.
    ///
    /// The first column flagged as primary key becomes the table's key.
    #[must_use]
    pub fn column(mut self, column: ColumnInfo) -> Self {
        if column.is_primary_key && self.primary_key.is_none() {
            self.primary_key = Some(column.name.clone());
        }
        if column.is_unique {
            self.add_unique_column(&column.name);
        }
        self.columns.push(column);
        self
    }

    /// Registers a unique index over the given columns.
    ///
    /// Every column of the index is flagged unique and the index becomes an
    /// upsert conflict target.
    #[must_use]
    pub fn unique_index(mut self, columns: &[&str]) -> Self {
        if columns.is_empty() {
            return self;
        }
        for name in columns {
            self.add_unique_column(name);
            if let Some(column) = self.columns.iter_mut().find(|c| c.name == *name) {
                column.is_unique = true;
            }
        }
        let target: Vec<String> = columns.iter().map(|s| (*s).to_string()).collect();
        if !self.upsert_policy.targets.contains(&target) {
            self.upsert_policy.targets.push(target);
        }
        self
    }

    fn add_unique_column(&mut self, name: &str) {
        if !self.unique_columns.iter().any(|c| c == name) {
            self.unique_columns.push(name.to_string());
        }
    }

    /// Returns the columns in declaration order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    /// Looks up a column by name.
    #[must_use]
    pub fn column_info(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns the primary key column name, if the table declares one.
    #[must_use]
    pub fn primary_key(&self) -> Option<&str> {
        self.primary_key.as_deref()
    }

    /// Returns the names of all columns covered by a unique index.
    #[must_use]
    pub fn unique_columns(&self) -> &[String] {
        &self.unique_columns
    }

    /// Returns the conflict policy for upserts.
    #[must_use]
    pub fn upsert_policy(&self) -> &UpsertPolicy {
        &self.upsert_policy
    }

    /// Returns true if the named column is known and holds binary data.
    #[must_use]
    pub fn is_blob_column(&self, name: &str) -> bool {
        self.column_info(name)
            .is_some_and(|c| c.kind == ColumnKind::Blob)
    }
}

/// Read-only catalog of every exposed table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchemaCatalog {
    tables: Vec<TableSchema>,
}

impl SchemaCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table, replacing any table with the same name.
    #[must_use]
    pub fn table(mut self, table: TableSchema) -> Self {
        self.tables.retain(|t| t.name != table.name);
        self.tables.push(table);
        self
    }

    /// Looks up a table by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Returns all tables in registration order.
    #[must_use]
    pub fn tables(&self) -> &[TableSchema] {
        &self.tables
    }

    /// Returns the table names in registration order.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.name.as_str())
    }

    /// Returns the number of tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns true if the catalog has no tables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
