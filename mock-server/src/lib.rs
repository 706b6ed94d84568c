use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, RawQuery},
    http::{HeaderMap, HeaderValue, StatusCode, Uri},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use uuid::Uuid;

/// Largest body `/bytes/{n}` will produce.
pub const MAX_BYTES: usize = 8 * 1024 * 1024;

/// What `/echo` saw of the request.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub path: String,
    pub raw_query: Option<String>,
    pub query: BTreeMap<String, String>,
    /// Lower-cased header names, as normalized by the server.
    pub headers: BTreeMap<String, String>,
}

pub fn app() -> Router {
    Router::new()
        .route("/search", get(search))
        .route("/echo", get(echo))
        .route("/status/{code}", get(status))
        .route("/bytes/{n}", get(bytes))
        .layer(middleware::map_response(stamp_request_id))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn stamp_request_id(mut response: Response) -> Response {
    let id = Uuid::new_v4().to_string();
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}

async fn search() -> impl IntoResponse {
    ([("x-test", "ok")], "result")
}

async fn echo(
    uri: Uri,
    RawQuery(raw_query): RawQuery,
    Query(query): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
) -> Json<Echo> {
    let headers = headers
        .iter()
        .map(|(name, value)| {
            let value = value.to_str().unwrap_or_default().to_string();
            (name.as_str().to_string(), value)
        })
        .collect();
    Json(Echo {
        path: uri.path().to_string(),
        raw_query,
        query,
        headers,
    })
}

async fn status(Path(code): Path<u16>) -> Result<StatusCode, StatusCode> {
    StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)
}

async fn bytes(Path(n): Path<usize>) -> Result<String, StatusCode> {
    if n > MAX_BYTES {
        return Err(StatusCode::PAYLOAD_TOO_LARGE);
    }
    Ok("a".repeat(n))
}
