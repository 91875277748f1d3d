//! Per-table routing onto the CRUD executor.

use oxide_rest_core::decode::percent_decode;
use oxide_rest_core::request::prefers_merge;
use oxide_rest_core::{RestRequest, Verb};
use oxide_rest_sqlite::Executor;
use tracing::{debug, warn};

use crate::body::decode_body;
use crate::error::BodyError;
use crate::request::Request;
use crate::response::Response;

/// One registered path and the verbs it serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Request path, e.g. `/countries`.
    pub path: String,
    /// Table the path maps to.
    pub table: String,
    /// Verbs accepted on this path.
    pub verbs: Vec<Verb>,
}

impl Route {
    /// Creates a route serving every verb for `table`.
    pub fn for_table(table: impl Into<String>) -> Self {
        let table = table.into();
        Self {
            path: format!("/{table}"),
            table,
            verbs: Verb::ALL.to_vec(),
        }
    }

    /// Restricts the verbs this route accepts.
    #[must_use]
    pub fn only(mut self, verbs: &[Verb]) -> Self {
        self.verbs = verbs.to_vec();
        self
    }

    /// Returns true if the route accepts `verb`.
    #[must_use]
    pub fn allows(&self, verb: Verb) -> bool {
        self.verbs.contains(&verb)
    }
}

/// Default cap on request body size, in bytes.
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// The REST surface: a route table over one executor.
#[derive(Debug, Clone)]
pub struct RestApi {
    executor: Executor,
    routes: Vec<Route>,
    max_body_bytes: usize,
}

impl RestApi {
    /// Registers `GET|POST|PUT|DELETE /<table>` for every table in the
    /// executor's catalog.
    #[must_use]
    pub fn new(executor: Executor) -> Self {
        let routes = executor.catalog().table_names().map(Route::for_table).collect();
        Self::with_routes(executor, routes)
    }

    /// Creates an API with an explicit route table.
    #[must_use]
    pub const fn with_routes(executor: Executor, routes: Vec<Route>) -> Self {
        Self {
            executor,
            routes,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Sets the largest request body the server will read.
    #[must_use]
    pub const fn max_body_bytes(mut self, bytes: usize) -> Self {
        self.max_body_bytes = bytes;
        self
    }

    /// Returns the request body size cap.
    #[must_use]
    pub const fn body_limit(&self) -> usize {
        self.max_body_bytes
    }

    /// Returns the registered routes.
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Returns the executor.
    #[must_use]
    pub const fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Finds the route for a request path. A trailing slash is ignored.
    #[must_use]
    pub fn route(&self, path: &str) -> Option<&Route> {
        let path = percent_decode(path);
        let path = path
            .strip_suffix('/')
            .filter(|p| !p.is_empty())
            .unwrap_or(path.as_str());
        self.routes.iter().find(|route| route.path == path)
    }

    /// Handles one request end to end.
    pub async fn handle(&self, request: Request) -> Response {
        let Some(route) = self.route(&request.path) else {
            debug!(path = %request.path, "No route");
            return Response::not_found(&request.path);
        };
        let Some(verb) = request.method.verb().filter(|verb| route.allows(*verb)) else {
            debug!(method = %request.method, path = %request.path, "Method not allowed");
            return Response::method_not_allowed(&route.verbs);
        };

        let rest_request = match into_rest_request(verb, &route.table, request) {
            Ok(rest_request) => rest_request,
            Err(err) => {
                warn!(verb = %verb, table = %route.table, error = %err, "Undecodable body");
                return Response::bad_request(err.to_string());
            }
        };

        Response::from_descriptor(self.executor.execute(&rest_request).await)
    }
}

/// Decodes the body and headers of an HTTP request into an engine request.
///
/// # Errors
///
/// Returns an error if the body cannot be decoded.
pub fn into_rest_request(
    verb: Verb,
    table: &str,
    request: Request,
) -> Result<RestRequest, BodyError> {
    let upsert = request.get_header("Prefer").is_some_and(prefers_merge);
    let body = decode_body(request.content_type().as_deref(), &request.body)?;

    let mut rest_request = RestRequest::new(verb, table)
        .query(request.query)
        .upsert(upsert);
    rest_request.body = body;
    Ok(rest_request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_route_for_table() {
        let route = Route::for_table("countries");
        assert_eq!(route.path, "/countries");
        assert!(route.allows(Verb::Delete));

        let route = route.only(&[Verb::Read]);
        assert!(route.allows(Verb::Read));
        assert!(!route.allows(Verb::Create));
    }

    #[test]
    fn test_into_rest_request_with_prefer() {
        let request = Request::post("/countries?columns=name")
            .header("prefer", "resolution=merge-duplicates")
            .body(r#"{"name":"Chad"}"#);
        let rest = into_rest_request(Verb::Create, "countries", request).unwrap();
        assert!(rest.upsert);
        assert_eq!(rest.table, "countries");
        assert_eq!(rest.query.get("columns"), Some("name"));
        assert_eq!(rest.body, Some(json!({"name": "Chad"})));
    }

    #[test]
    fn test_into_rest_request_csv() {
        let request = Request::post("/countries")
            .header("Content-Type", "text/csv")
            .body("name\nChad\n");
        let rest = into_rest_request(Verb::Create, "countries", request).unwrap();
        assert!(!rest.upsert);
        assert_eq!(rest.body, Some(json!([{"name": "Chad"}])));
    }

    #[test]
    fn test_into_rest_request_without_body() {
        let rest = into_rest_request(Verb::Read, "countries", Request::get("/countries")).unwrap();
        assert_eq!(rest.body, None);
    }
}
