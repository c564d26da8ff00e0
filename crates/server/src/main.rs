//! Golden Hearts API server binary

use hearts_server::Config;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Optional config file as the first argument; defaults otherwise
    let mut config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    if let Ok(url) = std::env::var("DATABASE_URL") {
        config.database.url = url;
    }

    info!("Starting Golden Hearts server");
    hearts_server::run(config).await
}
