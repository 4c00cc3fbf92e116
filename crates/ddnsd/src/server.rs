//! HTTP surface of the daemon
//!
//! Translates axum requests into [`UpdateRequest`]s and [`UpdateResponse`]s
//! back into HTTP responses. No update logic lives here.

use axum::Router;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use ddns_core::{ResponseBody, UpdateQuery, UpdateRequest, UpdateResponse, UpdateService};
use tracing::debug;

/// Build the router for an update service
pub fn router(service: UpdateService) -> Router {
    Router::new()
        .route("/update", get(update))
        .route("/favicon.ico", get(no_content))
        .route("/robots.txt", get(no_content))
        .fallback(not_found)
        .with_state(service)
}

async fn update(
    State(service): State<UpdateService>,
    headers: HeaderMap,
    query: Option<Query<UpdateQuery>>,
) -> Response {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());

    // An unparseable query string counts as carrying no parameters
    let query = query.map(|Query(q)| q).unwrap_or_default();

    debug!(
        "GET /update (authorization: {})",
        if authorization.is_some() { "present" } else { "absent" }
    );

    let request = UpdateRequest::new(authorization, query);
    into_http(service.handle(&request).await)
}

async fn no_content() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found.")
}

fn into_http(response: UpdateResponse) -> Response {
    let status =
        StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    match response.body {
        ResponseBody::Text(text) => (status, text).into_response(),
        ResponseBody::Json(results) => (status, Json(results)).into_response(),
    }
}
