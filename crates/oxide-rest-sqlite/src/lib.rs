//! # oxide-rest-sqlite
//!
//! SQLite backend for oxide-rest, built on sqlx.
//!
//! - [`introspect`] reads every user table into a [`SchemaCatalog`]
//! - [`Executor`] runs the read, create, replace and delete strategies
//!   and turns their outcome into response descriptors
//!
//! ## Example
//!
//! ```rust,ignore
//! use oxide_rest_core::QueryParams;
//! use oxide_rest_sqlite::Executor;
//! use sqlx::SqlitePool;
//!
//! let pool = SqlitePool::connect("sqlite:countries.db").await?;
//! let executor = Executor::connect(pool).await?;
//!
//! let response = executor
//!     .read("countries", &QueryParams::parse("name=like.Can*"))
//!     .await;
//! assert_eq!(response.status(), 200);
//! ```
//!
//! [`SchemaCatalog`]: oxide_rest_core::SchemaCatalog

pub mod bind;
pub mod error;
pub mod executor;
pub mod introspect;

pub use error::{EngineError, Result};
pub use executor::Executor;
pub use introspect::{introspect, introspect_table};
