use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use retro_news::config::{load_sources, Config};
use retro_news::fetcher::{start_background_refresh, Fetcher};
use retro_news::routes::{self, AppState};
use retro_news::store::ArticleStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "retro_news=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path =
        std::env::var("RETRO_NEWS_CONFIG").unwrap_or_else(|_| "retro_news.toml".to_string());
    let config = Config::load_or_default(&config_path)
        .with_context(|| format!("failed to load settings from {}", config_path))?;

    let sources = load_sources(&config.sources_path).with_context(|| {
        format!(
            "failed to load source registry from {}",
            config.sources_path.display()
        )
    })?;
    let store = Arc::new(ArticleStore::new());
    let fetcher = Arc::new(
        Fetcher::new(store.clone(), sources, &config).context("failed to build HTTP client")?,
    );
    info!("Loaded {} sources from registry", fetcher.sources().len());

    // Populate the store before the first query can arrive
    info!("Starting initial feed fetch");
    fetcher.refresh().await;

    if config.refresh_interval > 0 {
        let bg_fetcher = fetcher.clone();
        let refresh_interval = config.refresh_interval;
        tokio::spawn(async move {
            start_background_refresh(bg_fetcher, refresh_interval).await;
        });
    }

    let state = Arc::new(AppState {
        store: store.clone(),
        fetcher: fetcher.clone(),
    });
    let app = routes::router(state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("Server starting on http://{}", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
