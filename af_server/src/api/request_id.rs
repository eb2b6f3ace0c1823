//! `x-request-id` propagation plus per-request metrics and logging.
//!
//! A caller-supplied id is kept; otherwise a UUID v4 is minted. Handlers
//! read it through the [`RequestId`] extractor, and the response echoes it.

use axum::{
    extract::{FromRequestParts, MatchedPath, Request},
    http::{HeaderMap, HeaderValue, StatusCode, request::Parts},
    middleware::Next,
    response::Response,
};
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::{logging::log_api_request, metrics};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlation id for one request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    /// Id from `headers`, or a fresh UUID when absent or blank
    fn from_headers(headers: &HeaderMap) -> Self {
        let incoming = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty());

        match incoming {
            Some(id) => Self(id.to_string()),
            None => Self(Uuid::new_v4().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<RequestId>().cloned().ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Request ID middleware is not installed",
        ))
    }
}

/// Tag the request, run it, then echo the id and record the outcome.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let id = RequestId::from_headers(request.headers());
    request.extensions_mut().insert(id.clone());

    let method = request.method().to_string();
    // Route template, not the raw path, so metric labels stay bounded
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let started = Instant::now();
    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(id.as_str()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    record(&method, &route, response.status().as_u16(), started.elapsed());
    response
}

fn record(method: &str, route: &str, status: u16, elapsed: Duration) {
    metrics::http_requests_total(method, route, status);
    metrics::http_request_duration_ms(method, route, elapsed.as_secs_f64() * 1000.0);
    log_api_request(method, route, status, elapsed.as_millis() as u64);
}
