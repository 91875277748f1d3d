//! # oxide-rest-core
//!
//! Storage-free core of a schema-driven REST engine.
//!
//! This crate provides:
//! - A read-only schema catalog describing tables, keys and unique indexes
//! - A query-string filter grammar compiled into typed predicates
//! - Query plans rendered as parameterized SQLite statements
//! - INSERT/upsert and keyed UPDATE builders
//! - Content sniffing for binary column responses
//! - Framework-neutral request and response descriptors
//!
//! ## Filter grammar
//!
//! Every non-reserved query-string key names a column and its value takes
//! the form `[operator.]literal`. Reserved keys shape the plan instead:
//!
//! ```rust
//! use oxide_rest_core::{ColumnInfo, PlanBuilder, QueryParams, TableSchema};
//!
//! let table = TableSchema::new("countries")
//!     .column(ColumnInfo::new("id", "INTEGER").primary_key())
//!     .column(ColumnInfo::new("name", "TEXT"));
//!
//! let query = QueryParams::parse("name=like.Can*&order=id.desc&limit=5");
//! let plan = PlanBuilder::read(&table).extend(&query).unwrap().build();
//! let (sql, params) = plan.build_select();
//!
//! assert_eq!(
//!     sql,
//!     "SELECT * FROM `countries` WHERE `name` LIKE ? ORDER BY `id` DESC LIMIT 5 OFFSET 0"
//! );
//! assert_eq!(params.len(), 1);
//! ```
//!
//! ## SQL Injection Prevention
//!
//! Literals are always bound parameters and identifiers are always quoted,
//! so neither can change the shape of a statement.

pub mod decode;
pub mod dialect;
pub mod error;
pub mod filter;
pub mod payload;
pub mod plan;
pub mod query;
pub mod request;
pub mod response;
pub mod schema;
pub mod sniff;
pub mod value;
pub mod write;

pub use error::{FilterError, RestError, Result};
pub use filter::{
    FilterMode, FilterParser, Operator, Parsed, PlanModifier, Predicate, PredicateValue,
};
pub use payload::{Payload, RowValues};
pub use plan::{OrderBy, OrderDirection, PlanBuilder, QueryPlan};
pub use query::QueryParams;
pub use request::{RestRequest, Verb};
pub use response::{ResponseBody, ResponseDescriptor};
pub use schema::{ColumnInfo, ColumnKind, SchemaCatalog, TableSchema, UpsertPolicy};
pub use value::{Row, SqlValue, ToSqlValue, ValueKind};
pub use write::{InsertBuilder, UpdateByKey};
