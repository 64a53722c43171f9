//! Error mapping shared by the HTTP adapters

use reqwest::StatusCode;

use core_kernel::PortError;

/// Maps a transport error from `service` into a port error
pub(crate) fn map_transport_error(service: &str, error: reqwest::Error, timeout_ms: u64) -> PortError {
    if error.is_timeout() {
        PortError::Timeout {
            operation: service.to_string(),
            duration_ms: timeout_ms,
        }
    } else if error.is_connect() {
        PortError::Connection {
            message: format!("{service}: {error}"),
            source: Some(Box::new(error)),
        }
    } else if error.is_decode() {
        PortError::transformation(format!("{service}: {error}"))
    } else {
        PortError::Internal {
            message: format!("{service}: {error}"),
            source: Some(Box::new(error)),
        }
    }
}

/// Maps a non-success HTTP status into a port error
pub(crate) fn map_status(service: &str, status: StatusCode) -> PortError {
    match status {
        StatusCode::NOT_FOUND => PortError::not_found(service, status),
        StatusCode::TOO_MANY_REQUESTS => PortError::RateLimited { retry_after_secs: 60 },
        s if s.is_server_error() => PortError::unavailable(format!("{service} ({s})")),
        s => PortError::internal(format!("{service} returned {s}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(map_status("vendor", StatusCode::BAD_GATEWAY).is_transient());
        assert!(map_status("vendor", StatusCode::TOO_MANY_REQUESTS).is_transient());
        assert!(map_status("vendor", StatusCode::NOT_FOUND).is_not_found());
        assert!(!map_status("vendor", StatusCode::BAD_REQUEST).is_transient());
    }
}
