use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::domain::error::Result;
use crate::infrastructure::bootstrap::build_state;
use crate::infrastructure::config::AppConfig;
use crate::interfaces::http::start_server;

/// `RUST_LOG` wins over the configured filter
fn init_tracing(log_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_filter));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

pub fn run() -> Result<()> {
    let config = AppConfig::load()?;
    init_tracing(&config.log_filter);

    let state = build_state(config)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let server = start_server(state)?;
        server.await
    })?;

    info!("HTTP server stopped");
    Ok(())
}
