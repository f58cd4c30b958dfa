use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

/// Pizza Client - OAuth2 login with silent token refresh
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Authorization endpoint used for the login redirect
    #[arg(
        long,
        env = "AUTH_SERVER_URL",
        default_value = "http://localhost:9000/oauth2/authorize"
    )]
    pub auth_url: String,

    /// Token endpoint for the code and refresh exchanges
    #[arg(
        long,
        env = "TOKEN_ENDPOINT_URL",
        default_value = "http://localhost:9000/oauth2/token"
    )]
    pub token_url: String,

    /// Base URL of the pizza service
    #[arg(long, env = "PIZZA_API_URL", default_value = "http://localhost:8080")]
    pub api_url: String,

    /// OAuth2 client id
    #[arg(long, env = "OAUTH_CLIENT_ID", default_value = "pizza-client")]
    pub client_id: String,

    /// OAuth2 client secret used for the Basic auth header
    #[arg(long, env = "OAUTH_CLIENT_SECRET", default_value = "secret")]
    pub client_secret: String,

    /// Redirect URI registered with the authorization server
    #[arg(
        long,
        env = "OAUTH_REDIRECT_URI",
        default_value = "http://localhost:5173/callback"
    )]
    pub redirect_uri: String,

    /// Requested scopes, space-delimited
    #[arg(long, env = "OAUTH_SCOPES", default_value = "api.read openid")]
    pub scopes: String,

    /// Path to the SQLite token store
    #[arg(short = 'd', long, env = "TOKEN_DB_FILE")]
    pub db_file: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// HTTP connect timeout in seconds
    #[arg(long, env = "HTTP_CONNECT_TIMEOUT", default_value = "10")]
    pub connect_timeout: u64,

    /// HTTP request timeout in seconds
    #[arg(long, env = "HTTP_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,
}

#[derive(Clone, Debug)]
pub struct Config {
    // OAuth2 endpoints and client registration
    pub auth_server_url: String,
    pub token_endpoint_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scopes: String,

    // Pizza service
    pub api_base_url: String,

    // Token storage
    pub token_db_file: PathBuf,

    // Logging
    pub log_level: String,

    // HTTP client
    pub http_connect_timeout: u64,
    pub http_request_timeout: u64,
}

impl Config {
    /// Load configuration from all sources with priority: CLI > ENV > defaults
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let args = CliArgs::parse();

        Ok(Config {
            auth_server_url: args.auth_url,
            token_endpoint_url: args.token_url,
            client_id: args.client_id,
            client_secret: args.client_secret,
            redirect_uri: args.redirect_uri,
            scopes: args.scopes,
            api_base_url: args.api_url,
            token_db_file: args
                .db_file
                .map(|s| expand_tilde(&s))
                .unwrap_or_else(default_db_path),
            log_level: args.log_level,
            http_connect_timeout: args.connect_timeout,
            http_request_timeout: args.request_timeout,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("AUTH_SERVER_URL", &self.auth_server_url),
            ("TOKEN_ENDPOINT_URL", &self.token_endpoint_url),
            ("PIZZA_API_URL", &self.api_base_url),
            ("OAUTH_REDIRECT_URI", &self.redirect_uri),
        ] {
            reqwest::Url::parse(value)
                .with_context(|| format!("{} is not a valid URL: {}", name, value))?;
        }

        if self.client_id.is_empty() {
            anyhow::bail!("OAUTH_CLIENT_ID cannot be empty");
        }

        if self.scopes.trim().is_empty() {
            anyhow::bail!("OAUTH_SCOPES cannot be empty");
        }

        Ok(())
    }
}

/// Default token store location under the platform data directory
fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("pizza-client").join("tokens.sqlite3"))
        .unwrap_or_else(|| PathBuf::from("tokens.sqlite3"))
}

/// Expand tilde (~) in file paths to the user's home directory
fn expand_tilde(path: &str) -> PathBuf {
    if path.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(&path[2..]);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            auth_server_url: "http://localhost:9000/oauth2/authorize".to_string(),
            token_endpoint_url: "http://localhost:9000/oauth2/token".to_string(),
            client_id: "pizza-client".to_string(),
            client_secret: "secret".to_string(),
            redirect_uri: "http://localhost:5173/callback".to_string(),
            scopes: "api.read openid".to_string(),
            api_base_url: "http://localhost:8080".to_string(),
            token_db_file: PathBuf::from("/tmp/tokens.sqlite3"),
            log_level: "info".to_string(),
            http_connect_timeout: 10,
            http_request_timeout: 30,
        }
    }

    #[test]
    fn test_expand_tilde() {
        let path = expand_tilde("~/test/file.txt");
        assert!(path.to_string_lossy().contains("test/file.txt"));
        assert!(!path.to_string_lossy().starts_with('~'));

        let path = expand_tilde("/absolute/path");
        assert_eq!(path, PathBuf::from("/absolute/path"));
    }

    #[test]
    fn test_expand_tilde_relative_path() {
        let path = expand_tilde("relative/path");
        assert_eq!(path, PathBuf::from("relative/path"));
    }

    #[test]
    fn test_default_db_path_has_file_name() {
        let path = default_db_path();
        assert_eq!(path.file_name().unwrap(), "tokens.sqlite3");
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = base_config();
        config.token_endpoint_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_client_id() {
        let mut config = base_config();
        config.client_id = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_scopes() {
        let mut config = base_config();
        config.scopes = "   ".to_string();
        assert!(config.validate().is_err());
    }
}
