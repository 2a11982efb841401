//! HTTP plumbing for the auth backend.

pub mod api;
pub mod csrf;

use std::time::Duration;

use api::ApiError;

const REQUEST_TIMEOUT_SECS: u64 = 30;
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Build the shared HTTP client used by the auth API and CSRF manager.
///
/// # Errors
///
/// Returns [`ApiError::HttpClientBuild`] if the TLS backend cannot be set up.
pub fn build_http_client() -> Result<reqwest::Client, ApiError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .build()
        .map_err(|e| ApiError::HttpClientBuild(e.to_string()))
}

/// Join a base URL and an absolute endpoint path.
#[must_use]
pub fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        assert_eq!(endpoint("http://localhost:3000/", "/api/auth/session"), "http://localhost:3000/api/auth/session");
        assert_eq!(endpoint("http://localhost:3000", "api/auth/login"), "http://localhost:3000/api/auth/login");
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        assert_eq!(endpoint("https://igreja.example/app", "/api/auth/logout"), "https://igreja.example/app/api/auth/logout");
    }
}
