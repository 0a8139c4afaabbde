//! Permissive CORS for the browser front end.
//!
//! Any origin may call the API with `GET`, `POST` and `OPTIONS` and send a
//! `Content-Type` header. An `OPTIONS` request on any path is answered here
//! with 200 and an empty body, before routing. The listing total header is
//! exposed so browser clients can read it.

use axum::{
    extract::Request,
    http::{Method, StatusCode, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_http::cors::{Any, CorsLayer};

use crate::routes::catalog::TOTAL_COUNT_HEADER;

/// Build the CORS layer.
#[must_use]
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .expose_headers([TOTAL_COUNT_HEADER.clone()])
}

/// Answer `OPTIONS` requests that are not CORS preflights.
///
/// `CorsLayer` only intercepts requests carrying
/// `Access-Control-Request-Method`; a bare `OPTIONS` would otherwise reach
/// the router and fall through to 404. Must sit inside [`cors_layer`] so the
/// response still gets CORS headers.
pub async fn options_middleware(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    next.run(request).await
}
