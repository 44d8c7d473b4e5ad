use tokio::net::TcpListener;
use eeat_analyzer::{
    AppState,
    api::routes::create_router,
    config::{Config, FetchMode},
    logging::init_tracing,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing("info");

    // Load configuration
    let config = Config::load()?;
    let server_addr = config.server_addr;

    if config.openai_api_key.is_none() && !config.preview_mode {
        tracing::warn!("OPENAI_API_KEY is not set, analysis requests will fail until it is");
    }
    if config.fetch_mode == FetchMode::Browser {
        tracing::info!(webdriver = %config.webdriver_url, "Fetching pages through WebDriver");
    }

    // Create application state
    let app_state = AppState::from_config(config)?;

    // Build the router with routes
    let app = create_router(app_state);

    let listener = TcpListener::bind(server_addr).await?;

    tracing::info!("Listening on {}", server_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
