// HTTP client with request/response interceptors
// Attaches the bearer header and performs the single-shot 401 recovery

use anyhow::{Context, Result};
use reqwest::{header, Client, Request, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;

use crate::auth::AuthSession;
use crate::error::ApiError;

/// HTTP client for the pizza API
///
/// Wraps a shared `reqwest::Client` built once at startup. The session is
/// captured here by `Arc`, so the interceptor logic is wired exactly once.
pub struct ApiClient {
    /// Shared HTTP client with connection pooling
    client: Client,

    /// Auth session manager
    session: Arc<AuthSession>,
}

impl ApiClient {
    /// Create a new HTTP client
    pub fn new(session: Arc<AuthSession>, connect_timeout: u64, request_timeout: u64) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout))
            .timeout(Duration::from_secs(request_timeout))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, session })
    }

    /// Get the underlying HTTP client (for building requests)
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Execute a request through both interceptor phases
    ///
    /// Request phase: attach `Authorization: Bearer <token>` when an access
    /// token is present.
    ///
    /// Response phase, on a 401: refresh once and replay the original
    /// request with the new token. A 401 on the replay, a refresh failure,
    /// or a missing refresh token all force logout. At most one
    /// refresh-and-retry per original request; no loop, no backoff.
    pub async fn execute(&self, mut request: Request) -> Result<Response, ApiError> {
        let request_id = uuid::Uuid::new_v4().to_string()[..8].to_string();
        let method = request.method().clone();
        let url = request.url().clone();

        if let Some(token) = self.session.access_token().await {
            request
                .headers_mut()
                .insert(header::AUTHORIZATION, bearer_header(&token)?);
        }

        // Replay clone for the single recovery attempt; a request that
        // cannot be cloned cannot be replayed
        let mut replay = request.try_clone().ok_or_else(|| {
            ApiError::Internal(anyhow::anyhow!("Request body is not cloneable"))
        })?;

        tracing::debug!(
            request_id = %request_id,
            method = %method,
            url = %url,
            "Sending HTTP request"
        );

        let response = self.client.execute(request).await.map_err(|e| {
            ApiError::Internal(anyhow::anyhow!("HTTP request failed: {}", e))
        })?;

        if response.status() != StatusCode::UNAUTHORIZED {
            tracing::debug!(
                request_id = %request_id,
                status = %response.status(),
                "Received HTTP response"
            );
            return Ok(response);
        }

        if self.session.refresh_token().await.is_none() {
            tracing::warn!(
                request_id = %request_id,
                "Received 401 with no refresh token, logging out"
            );
            self.force_logout().await;
            return Err(ApiError::Unauthorized(format!(
                "{} {} returned 401",
                method, url
            )));
        }

        tracing::warn!(
            request_id = %request_id,
            "Received 401, refreshing token and replaying"
        );

        match self.session.refresh_access_token().await {
            Ok(pair) => {
                if let Some(token) = pair.access_token {
                    replay
                        .headers_mut()
                        .insert(header::AUTHORIZATION, bearer_header(&token)?);
                }

                let retried = self.client.execute(replay).await.map_err(|e| {
                    ApiError::Internal(anyhow::anyhow!("HTTP request failed: {}", e))
                })?;

                if retried.status() == StatusCode::UNAUTHORIZED {
                    // Already retried once for this request, do not refresh again
                    tracing::warn!(
                        request_id = %request_id,
                        "Replay returned 401, logging out"
                    );
                    self.force_logout().await;
                    return Err(ApiError::Unauthorized(format!(
                        "{} {} returned 401 after refresh",
                        method, url
                    )));
                }

                tracing::debug!(
                    request_id = %request_id,
                    status = %retried.status(),
                    "Replay succeeded"
                );
                Ok(retried)
            }
            Err(refresh_error) => {
                tracing::error!(
                    request_id = %request_id,
                    "Token refresh failed: {}",
                    refresh_error
                );
                self.force_logout().await;
                Err(ApiError::AuthError(format!(
                    "Token refresh failed: {}",
                    refresh_error
                )))
            }
        }
    }

    async fn force_logout(&self) {
        if let Err(e) = self.session.logout().await {
            tracing::error!("Logout failed: {}", e);
        }
    }
}

fn bearer_header(token: &str) -> Result<header::HeaderValue, ApiError> {
    format!("Bearer {}", token)
        .parse()
        .map_err(|_| ApiError::Internal(anyhow::anyhow!("Access token is not a valid header value")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_header_format() {
        let value = bearer_header("abc123").unwrap();
        assert_eq!(value.to_str().unwrap(), "Bearer abc123");
    }

    #[test]
    fn test_bearer_header_rejects_control_characters() {
        assert!(bearer_header("abc\ndef").is_err());
    }
}
