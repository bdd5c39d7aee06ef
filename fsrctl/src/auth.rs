//! Username/password to bearer token exchange

use crate::client::endpoint_url;
use fsr_core::errors::{FsrError, FsrResult};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Login endpoint, relative to the server base URL
pub const AUTH_ENDPOINT: &str = "/auth/authenticate";

#[derive(Serialize)]
struct AuthRequest<'a> {
    credentials: LoginCredentials<'a>,
}

#[derive(Serialize)]
struct LoginCredentials<'a> {
    loginid: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct AuthResponse {
    token: Option<String>,
}

/// Trade a username and password for a bearer token.
///
/// One POST, no retries. Transport failures, non-2xx statuses and bodies
/// without a token all surface as authentication errors.
pub async fn exchange_token(
    base_url: &Url,
    username: &str,
    password: &str,
    verify_ssl: bool,
) -> FsrResult<String> {
    let url = endpoint_url(base_url, AUTH_ENDPOINT);
    info!("Requesting token for '{}' from {}", username, url);

    let client = Client::builder()
        .danger_accept_invalid_certs(!verify_ssl)
        .build()
        .map_err(|e| FsrError::authentication(e.to_string()))?;

    let request = AuthRequest {
        credentials: LoginCredentials {
            loginid: username,
            password,
        },
    };

    let response = client
        .post(&url)
        .json(&request)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|e| FsrError::authentication(e.to_string()))?;

    let body: AuthResponse = response
        .json()
        .await
        .map_err(|e| FsrError::authentication(format!("Invalid response from {}: {}", url, e)))?;

    debug!("Token exchange succeeded");
    body.token
        .filter(|token| !token.is_empty())
        .ok_or_else(|| FsrError::authentication("No token in response"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::parse_server;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_exchange_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(AUTH_ENDPOINT))
            .and(body_json(json!({"credentials": {"loginid": "u", "password": "p"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "tok123"})))
            .expect(1)
            .mount(&server)
            .await;

        let base = parse_server(&server.uri()).unwrap();
        let token = exchange_token(&base, "u", "p", true).await.unwrap();
        assert_eq!(token, "tok123");
    }

    #[tokio::test]
    async fn test_exchange_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(AUTH_ENDPOINT))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let base = parse_server(&server.uri()).unwrap();
        let err = exchange_token(&base, "u", "wrong-password", true).await.unwrap_err();
        assert!(matches!(err, FsrError::Authentication(_)));
        assert!(err.to_string().starts_with("Authentication failed:"));
        assert!(!err.to_string().contains("wrong-password"));
    }

    #[tokio::test]
    async fn test_exchange_without_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(AUTH_ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": "u"})))
            .mount(&server)
            .await;

        let base = parse_server(&server.uri()).unwrap();
        let err = exchange_token(&base, "u", "p", true).await.unwrap_err();
        assert_eq!(err.to_string(), "Authentication failed: No token in response");
    }

    #[tokio::test]
    async fn test_exchange_network_failure() {
        // Nothing listens on the discard port
        let base = parse_server("http://127.0.0.1:9").unwrap();
        let err = exchange_token(&base, "u", "p", true).await.unwrap_err();
        assert!(matches!(err, FsrError::Authentication(_)));
    }
}
