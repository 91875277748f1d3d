//! hyper server loop around [`RestApi`].

use std::convert::Infallible;
use std::sync::Arc;

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request as HyperRequest, Response as HyperResponse, StatusCode};
use hyper_util::rt::TokioIo;
use oxide_rest_sqlite::Executor;
use sqlx::sqlite::SqlitePoolOptions;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::api::RestApi;
use crate::error::Result;
use crate::request::{Method, Request};
use crate::response::Response;

/// Opens a pool on `database_url`, introspects it and builds the API.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or introspected.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<RestApi> {
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    let executor = Executor::connect(pool).await?;
    Ok(RestApi::new(executor))
}

/// Binds a listener on `host:port`.
///
/// # Errors
///
/// Returns an error if the address cannot be resolved or bound.
pub async fn bind(host: &str, port: u16) -> Result<TcpListener> {
    Ok(TcpListener::bind((host, port)).await?)
}

/// Accepts connections forever, one task per connection.
///
/// # Errors
///
/// Returns an error if accepting on the listener fails.
pub async fn serve(listener: TcpListener, api: Arc<RestApi>) -> Result<()> {
    info!(addr = %listener.local_addr()?, routes = api.routes().len(), "Listening");

    loop {
        let (stream, peer) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let api = Arc::clone(&api);

        tokio::task::spawn(async move {
            let service = service_fn(move |req| {
                let api = Arc::clone(&api);
                handle_request(req, api)
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                warn!(peer = %peer, error = %err, "Error serving connection");
            }
        });
    }
}

/// Converts a hyper request, runs it through the API and converts back.
///
/// # Errors
///
/// Never fails; the error type satisfies hyper's service contract.
pub async fn handle_request(
    req: HyperRequest<Incoming>,
    api: Arc<RestApi>,
) -> std::result::Result<HyperResponse<Full<Bytes>>, Infallible> {
    let response = match Method::parse(req.method().as_str()) {
        Some(method) => dispatch(method, req, &api).await,
        None => match api.route(req.uri().path()) {
            Some(route) => Response::method_not_allowed(&route.verbs),
            None => Response::not_found(req.uri().path()),
        },
    };
    Ok(into_hyper(response))
}

async fn dispatch(method: Method, req: HyperRequest<Incoming>, api: &RestApi) -> Response {
    let target = req
        .uri()
        .path_and_query()
        .map_or_else(|| req.uri().path().to_string(), ToString::to_string);
    let mut request = Request::new(method, target);

    for (key, value) in req.headers() {
        if let Ok(v) = value.to_str() {
            request.headers.insert(key.to_string(), v.to_string());
        }
    }

    let limit = api.body_limit();
    match Limited::new(req.into_body(), limit).collect().await {
        Ok(body) => request.body = body.to_bytes().to_vec(),
        Err(err) if err.downcast_ref::<LengthLimitError>().is_some() => {
            warn!(limit, "Request body too large");
            return Response::payload_too_large(limit);
        }
        Err(err) => {
            warn!(error = %err, "Failed to read request body");
            return Response::bad_request(err.to_string());
        }
    }

    debug!(method = %request.method, path = %request.path, "Request");
    api.handle(request).await
}

fn into_hyper(response: Response) -> HyperResponse<Full<Bytes>> {
    let mut builder = HyperResponse::builder().status(
        StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
    );
    for (key, value) in &response.headers {
        builder = builder.header(key.as_str(), value.as_str());
    }

    builder
        .body(Full::new(Bytes::from(response.body)))
        .unwrap_or_else(|err| {
            warn!(error = %err, "Invalid response");
            let mut fallback = HyperResponse::new(Full::new(Bytes::new()));
            *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            fallback
        })
}
