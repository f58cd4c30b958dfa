use anyhow::Result;
use std::sync::Arc;

use pizza_client::api::PizzaApi;
use pizza_client::auth::store::SqliteStore;
use pizza_client::auth::AuthSession;
use pizza_client::config::Config;
use pizza_client::http_client::ApiClient;
use pizza_client::router::{Navigator, Router};

/// Navigator for the terminal: external URLs are handed to the user,
/// route changes are logged
struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, location: &str) {
        if location.starts_with("http://") || location.starts_with("https://") {
            println!();
            println!("Open this URL in your browser and log in:");
            println!();
            println!("  {}", location);
            println!();
        } else {
            tracing::info!(route = location, "Navigated");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    config.validate()?;

    // Initialize logging with the configured level
    let log_level = config.log_level.to_lowercase();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    print_startup_banner(&config);

    // Wire storage, router, session and HTTP client once at startup
    let store = Arc::new(SqliteStore::open(&config.token_db_file)?);
    let navigator = Arc::new(TerminalNavigator);
    let router = Arc::new(Router::with_default_routes(store.clone(), navigator));

    let config = Arc::new(config);
    let session = Arc::new(AuthSession::new(config.clone(), store, router)?);
    let http = Arc::new(ApiClient::new(
        session.clone(),
        config.http_connect_timeout,
        config.http_request_timeout,
    )?);
    let pizzas = PizzaApi::new(http, config.api_base_url.clone());

    if session.is_authenticated().await {
        tracing::info!("✅ Found stored credentials, skipping login");
    } else {
        session.login()?;

        let code: String = dialoguer::Input::new()
            .with_prompt("Paste the authorization code from the callback URL")
            .interact_text()?;

        if let Err(e) = session.handle_callback(&code).await {
            let message = session.last_error().await.unwrap_or_else(|| e.to_string());
            anyhow::bail!("Login failed: {}", message);
        }

        tracing::info!("✅ Logged in");
    }

    match pizzas.list().await {
        Ok(menu) => {
            println!();
            println!("Today's menu:");
            for pizza in menu {
                println!("  {}. {}", pizza.id, pizza.name);
            }
            println!();
        }
        Err(e) => {
            // An expired session ends up here after the forced logout
            tracing::error!("Failed to fetch the menu: {}", e);
            anyhow::bail!("Could not fetch the menu; try logging in again");
        }
    }

    Ok(())
}

/// Print startup banner
fn print_startup_banner(config: &Config) {
    let banner = r#"
╔═══════════════════════════════════════════════════════════╗
║                                                           ║
║            🍕 Pizza Client - OAuth2 edition               ║
║                                                           ║
║   Authorization-code login with silent token refresh      ║
║                                                           ║
╚═══════════════════════════════════════════════════════════╝
"#;

    println!("{}", banner);
    println!("  Version:      {}", env!("CARGO_PKG_VERSION"));
    println!("  Auth server:  {}", config.auth_server_url);
    println!("  Pizza API:    {}", config.api_base_url);
    println!("  Token store:  {}", config.token_db_file.display());
    println!("  Log level:    {}", config.log_level);
    println!();
}
