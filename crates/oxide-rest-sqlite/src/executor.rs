//! CRUD execution against SQLite.
//!
//! The [`Executor`] owns a connection pool and the read-only catalog. Each
//! verb compiles its request into parameterized SQL, runs it and returns a
//! [`ResponseDescriptor`]. Every failure becomes a 400 descriptor carrying
//! the error message, so callers never see an `Err` from a verb.

use std::sync::Arc;

use oxide_rest_core::decode::percent_decode;
use oxide_rest_core::filter::{split_list, COLUMNS_KEY};
use oxide_rest_core::sniff;
use oxide_rest_core::{
    InsertBuilder, Payload, PlanBuilder, QueryParams, ResponseDescriptor, RestError, RestRequest,
    Row, RowValues, SchemaCatalog, SqlValue, TableSchema, UpdateByKey, Verb,
};
use serde_json::{json, Value as JsonValue};
use sqlx::{Row as _, SqliteConnection, SqlitePool};
use tracing::{debug, warn};

use crate::bind::{decode_row, prepare};
use crate::error::Result;
use crate::introspect::introspect;

/// Guard message for a DELETE without filters.
pub const NO_DELETE_PARAMS: &str =
    "No deletion parameters provided; total table deletion will not occur";
/// Guard message for a PUT with a list body.
pub const PUT_SINGULAR_ONLY: &str = "PUT is only available for singular upserts!";
/// Guard message for a PUT without the primary key in the query.
pub const PUT_REQUIRES_KEY: &str = "PUT requires the primary key value to use for upsert operation";
/// Guard message for a PUT with an empty object body.
pub const PUT_REQUIRES_COLUMNS: &str = "PUT requires at least one column value";

/// Executes verb strategies for every table in a catalog.
#[derive(Debug, Clone)]
pub struct Executor {
    pool: SqlitePool,
    catalog: Arc<SchemaCatalog>,
}

impl Executor {
    /// Creates an executor over an already introspected catalog.
    #[must_use]
    pub const fn new(pool: SqlitePool, catalog: Arc<SchemaCatalog>) -> Self {
        Self { pool, catalog }
    }

    /// Introspects the database and creates an executor over it.
    ///
    /// # Errors
    ///
    /// Returns an error if introspection fails.
    pub async fn connect(pool: SqlitePool) -> Result<Self> {
        let catalog = introspect(&pool).await?;
        Ok(Self::new(pool, Arc::new(catalog)))
    }

    /// Returns the catalog.
    #[must_use]
    pub fn catalog(&self) -> &SchemaCatalog {
        &self.catalog
    }

    /// Returns the connection pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Runs the strategy selected by the request's verb.
    pub async fn execute(&self, request: &RestRequest) -> ResponseDescriptor {
        let null = JsonValue::Null;
        let body = request.body.as_ref().unwrap_or(&null);
        match request.verb {
            Verb::Read => self.read(&request.table, &request.query).await,
            Verb::Create => {
                self.create(&request.table, &request.query, body, request.upsert)
                    .await
            }
            Verb::Replace => self.replace(&request.table, &request.query, body).await,
            Verb::Delete => self.delete(&request.table, &request.query).await,
        }
    }

    /// Filtered, paged read.
    ///
    /// A single row with a single binary column is returned as raw bytes
    /// with a sniffed content type; anything else is a JSON array of rows.
    pub async fn read(&self, table: &str, query: &QueryParams) -> ResponseDescriptor {
        respond(Verb::Read, table, self.try_read(table, query).await)
    }

    /// Filtered delete. Refuses to run without any filter.
    pub async fn delete(&self, table: &str, query: &QueryParams) -> ResponseDescriptor {
        respond(Verb::Delete, table, self.try_delete(table, query).await)
    }

    /// Inserts one row or a batch and returns the new row ids in order.
    pub async fn create(
        &self,
        table: &str,
        query: &QueryParams,
        body: &JsonValue,
        upsert: bool,
    ) -> ResponseDescriptor {
        respond(
            Verb::Create,
            table,
            self.try_create(table, query, body, upsert).await,
        )
    }

    /// Updates the row named by its primary key, inserting it when no row
    /// matched.
    pub async fn replace(
        &self,
        table: &str,
        query: &QueryParams,
        body: &JsonValue,
    ) -> ResponseDescriptor {
        respond(
            Verb::Replace,
            table,
            self.try_replace(table, query, body).await,
        )
    }

    fn schema(&self, table: &str) -> Result<&TableSchema> {
        self.catalog
            .get(table)
            .ok_or_else(|| RestError::UnknownTable(table.to_string()).into())
    }

    async fn try_read(&self, table: &str, query: &QueryParams) -> Result<ResponseDescriptor> {
        let schema = self.schema(table)?;
        let plan = PlanBuilder::read(schema).extend(query)?.build();
        let (sql, params) = plan.build_select();
        debug!(sql = %sql, "Executing SQL");

        let rows = prepare(&sql, params).fetch_all(&self.pool).await?;
        let mut rows = rows
            .iter()
            .map(decode_row)
            .collect::<std::result::Result<Vec<Row>, _>>()?;

        if rows.len() == 1 && rows[0].sole_value().is_some_and(SqlValue::is_blob) {
            if let Some(SqlValue::Blob(bytes)) = rows.pop().and_then(Row::into_sole_value) {
                return Ok(sniff::negotiate(bytes));
            }
        }

        let body: Vec<JsonValue> = rows.iter().map(Row::to_json).collect();
        Ok(ResponseDescriptor::json(JsonValue::Array(body)))
    }

    async fn try_delete(&self, table: &str, query: &QueryParams) -> Result<ResponseDescriptor> {
        let schema = self.schema(table)?;
        if query.is_empty() {
            return Err(RestError::guard(NO_DELETE_PARAMS).into());
        }

        let plan = PlanBuilder::delete(schema).extend(query)?.build();
        let (sql, params) = plan.build_delete();
        debug!(sql = %sql, "Executing SQL");

        let result = prepare(&sql, params).execute(&self.pool).await?;
        debug!(table = %table, rows = result.rows_affected(), "Deleted rows");
        Ok(ResponseDescriptor::json(json!({})))
    }

    async fn try_create(
        &self,
        table: &str,
        query: &QueryParams,
        body: &JsonValue,
        upsert: bool,
    ) -> Result<ResponseDescriptor> {
        let schema = self.schema(table)?;
        let mut payload = Payload::from_json(body)?;
        if let Some(columns) = query.get(COLUMNS_KEY) {
            payload = payload.project(&split_list(columns));
        }

        let mut tx = self.pool.begin().await?;
        let mut ids = Vec::new();
        for row in payload.into_rows() {
            ids.push(insert_row(&mut *tx, schema, row, upsert).await?);
        }
        tx.commit().await?;

        debug!(table = %table, rows = ids.len(), upsert, "Inserted rows");
        Ok(ResponseDescriptor::json(json!(ids)))
    }

    async fn try_replace(
        &self,
        table: &str,
        query: &QueryParams,
        body: &JsonValue,
    ) -> Result<ResponseDescriptor> {
        let schema = self.schema(table)?;
        if body.is_array() {
            return Err(RestError::guard(PUT_SINGULAR_ONLY).into());
        }
        if query.is_empty() {
            return Err(RestError::guard(format!(
                "Cannot update \"{table}\" item without specifying primary key!"
            ))
            .into());
        }

        let (key_column, raw_key) = schema
            .primary_key()
            .and_then(|pk| query.get(pk).map(|value| (pk, value)))
            .ok_or_else(|| RestError::guard(PUT_REQUIRES_KEY))?;
        let key_value = percent_decode(raw_key.strip_prefix("eq.").unwrap_or(raw_key));

        let Payload::Single(row) = Payload::from_json(body)? else {
            return Err(RestError::guard(PUT_SINGULAR_ONLY).into());
        };
        if row.is_empty() {
            return Err(RestError::guard(PUT_REQUIRES_COLUMNS).into());
        }

        let update = row
            .iter()
            .fold(UpdateByKey::new(table, key_column, key_value), |u, (c, v)| {
                u.set(c.as_str(), v.clone())
            });
        let (sql, params) = update.build();
        debug!(sql = %sql, "Executing SQL");

        let affected = prepare(&sql, params)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if affected > 0 {
            return Ok(ResponseDescriptor::json(json!(affected)));
        }

        debug!(table = %table, "No row matched, inserting");
        let mut conn = self.pool.acquire().await?;
        let id = insert_row(&mut *conn, schema, row, true).await?;
        Ok(ResponseDescriptor::json(json!(id)))
    }
}

/// Inserts one row and returns its rowid.
async fn insert_row(
    conn: &mut SqliteConnection,
    schema: &TableSchema,
    row: RowValues,
    upsert: bool,
) -> Result<i64> {
    let mut builder = InsertBuilder::new().into_table(&schema.name).row(row);
    if upsert {
        builder = builder.upsert(schema);
    }
    let (sql, params) = builder.returning_rowid().build();
    debug!(sql = %sql, "Executing SQL");

    let inserted = prepare(&sql, params).fetch_one(&mut *conn).await?;
    Ok(inserted.try_get::<i64, _>(0)?)
}

fn respond(verb: Verb, table: &str, result: Result<ResponseDescriptor>) -> ResponseDescriptor {
    result.unwrap_or_else(|err| {
        warn!(verb = %verb, table = %table, error = %err, "Request rejected");
        ResponseDescriptor::error(err.to_string())
    })
}
