use anyhow::{Context, Result, bail};
use deepfake_guard::{
    config::{self, Config},
    server,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

/// `RUST_LOG` takes precedence over `server.logs.level`.
fn resolve_log_level(config: &Config) -> Result<String> {
    let level = std::env::var("RUST_LOG").unwrap_or_else(|_| config.server.logs.level.clone());

    if level.parse::<LevelFilter>().is_err() {
        bail!(
            "Invalid log level: '{}'. Valid levels: error, warn, info, debug, trace",
            level
        );
    }

    Ok(level)
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load()
        .await
        .context("Failed to load configuration")?;
    let log_level = resolve_log_level(&config)?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&log_level))
        .json()
        .init();

    let limits = &config.server.limits;
    info!(
        log_level = %log_level,
        image_max_mb = limits.image_max_mb,
        video_max_mb = limits.video_max_mb,
        audio_max_mb = limits.audio_max_mb,
        "Starting DeepFake Guard API"
    );

    server::run(config).await.context("Server error")
}
