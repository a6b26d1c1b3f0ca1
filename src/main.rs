use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use talkai_proxy::config::ProxyConfig;
use talkai_proxy::handler::build_router;
use talkai_proxy::state::AppState;

#[derive(Parser, Debug)]
#[command(
    name = "talkai-proxy",
    version,
    about = "OpenAI-compatible gateway for the TalkAI backend"
)]
struct Args {
    /// Path to a TOML config file; environment variables are used when absent
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ProxyConfig::from_file(path)?,
        None => ProxyConfig::from_env()?,
    };
    config.validate()?;

    init_tracing(config.debug);

    if let Some(key) = config.ensure_api_key() {
        info!(key = %key, "no API keys configured, generated one");
    }

    info!(
        port = config.port,
        default_model = %config.default_model,
        default_temperature = config.default_temperature,
        default_stream = config.default_stream,
        timeout_secs = config.timeout_secs,
        dashboard_enabled = config.dashboard_enabled,
        api_keys = config.api_keys.len(),
        "starting talkai-proxy"
    );

    let state = Arc::new(AppState::new(config)?);
    let app = build_router(state.clone());

    let listener = tokio::net::TcpListener::bind(state.config.bind_addr()).await?;
    info!(addr = %state.config.bind_addr(), "listening");
    if state.config.dashboard_enabled {
        info!(
            "dashboard available at http://localhost:{}/dashboard",
            state.config.port
        );
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!(stats = %state.stats.snapshot(), "server stopped");
    Ok(())
}

fn init_tracing(debug: bool) {
    let default_directive = if debug {
        "talkai_proxy=debug"
    } else {
        "talkai_proxy=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    info!("shutdown signal received");
}
