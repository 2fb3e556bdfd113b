use clap::Parser;
use dialect_bridge::config::config_search_paths;
use dialect_bridge::{build_router, AppState, BridgeConfig, ModelRouter, SharedLogger, TranslationEngine};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "dialect-bridge",
    about = "Translate between Chat Completions and Responses API payloads",
    version
)]
struct Cli {
    /// Path to config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Log file path
    #[arg(long, default_value = "dialect-bridge.log")]
    log_file: PathBuf,

    /// Print config search paths and exit
    #[arg(long)]
    show_config_paths: bool,

    /// Validate the config, print the routing table and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dialect_bridge=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if cli.show_config_paths {
        println!("Config search paths:");
        for (i, path) in config_search_paths().iter().enumerate() {
            println!("  {}. {}", i + 1, path.display());
        }
        return Ok(());
    }

    let mut config = BridgeConfig::find_and_load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.port = port;
    }

    // Every invalid mapping is reported at once; refuse to start on any.
    let router = Arc::new(ModelRouter::from_config(&config)?);

    if cli.check {
        println!("Routing table ({} models):", router.len());
        for (model, api_type) in router.entries() {
            println!("  {model:<32} {api_type}");
        }
        return Ok(());
    }

    let logger = SharedLogger::new(&cli.log_file)?;
    let engine = TranslationEngine::new(router.clone(), logger.clone())
        .with_shadow_verify(config.translation.shadow_verify);

    info!("dialect-bridge v{}", env!("CARGO_PKG_VERSION"));
    info!("  Port:          {}", config.port);
    info!("  Models:        {} routed", router.len());
    info!("  Shadow verify: {}", config.translation.shadow_verify);
    info!("  Log file:      {}", cli.log_file.display());

    logger.info(
        "startup",
        format!(
            "Starting dialect-bridge port={} models={} shadow_verify={}",
            config.port,
            router.len(),
            config.translation.shadow_verify
        ),
    );

    let state = Arc::new(AppState {
        config: config.clone(),
        engine,
        logger: logger.clone(),
    });

    let app = build_router(state);
    let bind_addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
