//! # oxide-rest
//!
//! Serves every table of a SQLite database as a CRUD endpoint.
//!
//! `GET|POST|PUT|DELETE /<table>` are routed onto the executor from
//! `oxide-rest-sqlite`. Query strings use the filter grammar of
//! `oxide-rest-core`; bodies are JSON, or CSV when sent as `text/csv`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! let api = oxide_rest::connect("sqlite:countries.db", 5).await?;
//! let listener = oxide_rest::bind("127.0.0.1", 3000).await?;
//! oxide_rest::serve(listener, Arc::new(api)).await?;
//! ```

pub mod api;
pub mod body;
pub mod error;
pub mod request;
pub mod response;
pub mod server;

pub use api::{RestApi, Route, DEFAULT_MAX_BODY_BYTES};
pub use error::{BodyError, Result, ServerError};
pub use request::{Method, Request};
pub use response::Response;
pub use server::{bind, connect, serve};
