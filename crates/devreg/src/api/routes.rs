//! API route definitions.

use axum::{
    Router,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{MethodRouter, get},
};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use super::error::ApiError;
use super::handlers;
use super::state::AppState;

const COLLECTION_METHODS: &[&str] = &["GET", "HEAD", "OPTIONS", "POST"];
const ITEM_METHODS: &[&str] = &["DELETE", "GET", "HEAD", "OPTIONS", "PATCH", "PUT"];
const READ_ONLY_METHODS: &[&str] = &["GET", "HEAD", "OPTIONS"];

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route(
            "/status/",
            with_allowed(get(handlers::status), READ_ONLY_METHODS),
        )
        .route(
            "/authenticate/",
            with_allowed(get(handlers::authenticate), READ_ONLY_METHODS),
        )
        .route(
            "/devices/",
            with_allowed(
                get(handlers::list_devices).post(handlers::create_device),
                COLLECTION_METHODS,
            ),
        )
        .route(
            "/devices/{id}",
            with_allowed(
                get(handlers::get_device)
                    .put(handlers::replace_device)
                    .patch(handlers::patch_device)
                    .delete(handlers::delete_device),
                ITEM_METHODS,
            ),
        )
        .route(
            "/devices/{id}/report",
            with_allowed(get(handlers::device_report), READ_ONLY_METHODS),
        )
        .fallback(handlers::not_found)
        .layer(trace_layer)
        .with_state(state)
}

/// Answer `OPTIONS` with the route's methods and reject every other
/// unrouted verb with 405. Neither path looks at credentials.
fn with_allowed(
    router: MethodRouter<AppState>,
    allowed: &'static [&'static str],
) -> MethodRouter<AppState> {
    router
        .options(move || async move {
            (StatusCode::OK, [(header::ALLOW, allowed.join(", "))]).into_response()
        })
        .fallback(move || async move { ApiError::MethodNotAllowed(allowed) })
}
