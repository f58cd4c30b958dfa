// Session manager for the authorization-code flow
// Owns the credential pair and keeps the token store in sync with it

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode, Url};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use super::store::{TokenStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use super::types::{CodeExchangeRequest, RefreshRequest, TokenPair, TokenResponse};
use crate::config::Config;
use crate::router::{Router, LANDING_ROUTE, LOGIN_ROUTE};

/// Auth session manager
///
/// Holds the in-memory credential pair, mirrors every mutation into the
/// token store, and performs the two token endpoint exchanges. Constructed
/// once at startup; the HTTP interceptors capture it by `Arc`.
pub struct AuthSession {
    /// In-memory credential pair, equal to the stored entries after every
    /// mutation
    tokens: RwLock<TokenPair>,

    /// Last human-readable exchange failure
    last_error: RwLock<Option<String>>,

    /// Durable credential storage
    store: Arc<dyn TokenStore>,

    /// Router used for post-login and post-logout navigation
    router: Arc<Router>,

    /// HTTP client for token endpoint calls
    client: Client,

    config: Arc<Config>,
}

impl AuthSession {
    /// Create the session, loading any persisted credential pair
    pub fn new(
        config: Arc<Config>,
        store: Arc<dyn TokenStore>,
        router: Arc<Router>,
    ) -> Result<Self> {
        let pair = TokenPair {
            access_token: store.get(ACCESS_TOKEN_KEY)?,
            refresh_token: store.get(REFRESH_TOKEN_KEY)?,
        };

        if !pair.is_empty() {
            tracing::debug!("Loaded persisted credentials");
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.http_connect_timeout))
            .timeout(Duration::from_secs(config.http_request_timeout))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            tokens: RwLock::new(pair),
            last_error: RwLock::new(None),
            store,
            router,
            client,
            config,
        })
    }

    /// Build the authorization endpoint URL for the code grant
    pub fn login_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.config.auth_server_url)
            .context("Invalid authorization endpoint URL")?;

        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("scope", &self.config.scopes);

        Ok(url)
    }

    /// Send the browser to the authorization endpoint
    ///
    /// A full page navigation, so it goes straight to the navigator rather
    /// than through the route guard. Not retryable or cancelable.
    pub fn login(&self) -> Result<()> {
        let url = self.login_url()?;
        tracing::info!(url = %url, "Redirecting to authorization endpoint");
        self.router.navigator().navigate(url.as_str());
        Ok(())
    }

    /// Exchange an authorization code for the initial credential pair
    ///
    /// On success both tokens are stored and navigation proceeds to the
    /// protected landing route. On failure the error message is recorded
    /// and no navigation happens.
    pub async fn handle_callback(&self, code: &str) -> Result<()> {
        if code.trim().is_empty() {
            anyhow::bail!("Authorization code is missing from the callback");
        }

        match self.exchange_code(code).await {
            Ok(response) => {
                self.install_pair(response).await?;
                tracing::info!("Authorization code exchanged");
                self.router.push(LANDING_ROUTE)
            }
            Err(e) => {
                self.record_error(&e).await;
                Err(e)
            }
        }
    }

    /// Exchange the stored refresh token for a new credential pair
    ///
    /// The refresh token rotates on success. On failure the stored state is
    /// left untouched; logging out is the caller's decision.
    pub async fn refresh_access_token(&self) -> Result<TokenPair> {
        // Write lock held across the exchange so concurrent refreshes
        // serialize instead of interleaving rotations
        let mut tokens = self.tokens.write().await;

        let refresh_token = tokens
            .refresh_token
            .clone()
            .context("No refresh token available")?;

        match self.exchange_refresh(&refresh_token).await {
            Ok(response) => {
                let pair = TokenPair {
                    access_token: Some(response.access_token),
                    refresh_token: Some(response.refresh_token),
                };
                self.persist_pair(&pair)?;
                *tokens = pair.clone();
                tracing::debug!("Access token refreshed");
                Ok(pair)
            }
            Err(e) => {
                self.record_error(&e).await;
                Err(e)
            }
        }
    }

    /// Clear both credentials and return to the login route
    pub async fn logout(&self) -> Result<()> {
        {
            let mut tokens = self.tokens.write().await;
            self.store.remove(ACCESS_TOKEN_KEY)?;
            self.store.remove(REFRESH_TOKEN_KEY)?;
            *tokens = TokenPair::default();
        }

        tracing::info!("Logged out");
        self.router.push(LOGIN_ROUTE)
    }

    pub async fn access_token(&self) -> Option<String> {
        self.tokens.read().await.access_token.clone()
    }

    pub async fn refresh_token(&self) -> Option<String> {
        self.tokens.read().await.refresh_token.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.tokens.read().await.access_token.is_some()
    }

    /// Message recorded by the most recent failed exchange
    pub async fn last_error(&self) -> Option<String> {
        self.last_error.read().await.clone()
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenResponse> {
        let request = CodeExchangeRequest {
            grant_type: "authorization_code",
            code,
            redirect_uri: &self.config.redirect_uri,
        };

        let response = self
            .client
            .post(&self.config.token_endpoint_url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&request)
            .send()
            .await
            .context("Failed to reach the token endpoint")?;

        parse_token_response(response).await
    }

    async fn exchange_refresh(&self, refresh_token: &str) -> Result<TokenResponse> {
        let request = RefreshRequest {
            grant_type: "refresh_token",
            refresh_token,
        };

        let response = self
            .client
            .post(&self.config.token_endpoint_url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .json(&request)
            .send()
            .await
            .context("Failed to reach the token endpoint")?;

        parse_token_response(response).await
    }

    /// Store a fresh pair from a successful code exchange
    async fn install_pair(&self, response: TokenResponse) -> Result<()> {
        let pair = TokenPair {
            access_token: Some(response.access_token),
            refresh_token: Some(response.refresh_token),
        };

        let mut tokens = self.tokens.write().await;
        self.persist_pair(&pair)?;
        *tokens = pair;
        Ok(())
    }

    fn persist_pair(&self, pair: &TokenPair) -> Result<()> {
        if let Some(ref access_token) = pair.access_token {
            self.store.set(ACCESS_TOKEN_KEY, access_token)?;
        }
        if let Some(ref refresh_token) = pair.refresh_token {
            self.store.set(REFRESH_TOKEN_KEY, refresh_token)?;
        }
        Ok(())
    }

    async fn record_error(&self, error: &anyhow::Error) {
        let message = error.to_string();
        tracing::error!("Token exchange failed: {}", message);
        *self.last_error.write().await = Some(message);
    }
}

/// Turn a token endpoint response into a `TokenResponse` or an error
/// carrying a human-readable message
async fn parse_token_response(response: reqwest::Response) -> Result<TokenResponse> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("{}", token_error_message(status, &body));
    }

    response
        .json()
        .await
        .context("Failed to parse token endpoint response")
}

/// Prefer the `error` field of the response body, fall back to status + body
fn token_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(error) = json.get("error").and_then(|v| v.as_str()) {
            return error.to_string();
        }
    }
    format!("{} - {}", status, body)
}
