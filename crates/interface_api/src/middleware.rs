//! API middleware

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use tracing::{error, info, warn};

use crate::auth::{verify_token, Claims};
use crate::error::ApiError;
use crate::AppState;

/// The token from an `Authorization: Bearer <token>` header
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Rejects `/api/v1` requests without a valid token; stores the caller's
/// [`Claims`] in request extensions for the permission checks
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = bearer_token(request.headers()) else {
        warn!(uri = %request.uri(), "Missing bearer token");
        return Err(ApiError::Unauthorized);
    };

    let claims = verify_token(token, &state.config.jwt_secret).map_err(|e| {
        warn!(error = %e, "Rejected bearer token");
        ApiError::Unauthorized
    })?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// One log line per scoring API request
///
/// Server errors log at error level and rejected requests at warn, so a
/// failing scorer or store stands out from routine traffic.
pub async fn audit_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let caller = request
        .extensions()
        .get::<Claims>()
        .map_or_else(|| "anonymous".to_string(), |c| c.sub.clone());
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let duration_ms = started.elapsed().as_millis() as u64;
    if response.status().is_server_error() {
        error!(%method, %uri, %caller, status, duration_ms, "API request failed");
    } else if response.status().is_client_error() {
        warn!(%method, %uri, %caller, status, duration_ms, "API request rejected");
    } else {
        info!(%method, %uri, %caller, status, duration_ms, "API request");
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extracted() {
        assert_eq!(bearer_token(&headers("Bearer abc.def")), Some("abc.def"));
    }

    #[test]
    fn test_other_schemes_rejected() {
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
