//! Stock table API entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use topstocks_api::api::{create_router, AppState};
use topstocks_api::config::Config;
use topstocks_api::metrics;
use topstocks_api::sink::LogglyClient;
use topstocks_api::store::DynamoStore;
use topstocks_api::utils::shutdown_signal;
use topstocks_api::Result;

/// Read-only HTTP API over a DynamoDB stock summary table.
#[derive(Parser, Debug)]
#[command(name = "topstocks-api")]
#[command(about = "Serve status, dump and date search endpoints over a stock summary table")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve {
        /// HTTP server port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Secrets and settings are loaded once, before any handler runs
    let config = Config::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    init_logging(&config, args.verbose);

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(&config)?,
        Some(Command::Serve { port }) => cmd_serve(config, port.or(args.port)).await?,
        None => cmd_serve(config, args.port).await?,
    }

    Ok(())
}

/// Initialize the tracing subscriber.
fn init_logging(config: &Config, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("topstocks_api=debug,info")
    } else {
        EnvFilter::try_new(&config.rust_log).unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if config.log_format == "json" {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Check configuration validity.
fn cmd_check_config(config: &Config) -> Result<()> {
    println!("======================================================================");
    println!("TOPSTOCKS API - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Validating configuration... ");
    let settings = match config.validate().and_then(|_| config.settings()) {
        Ok(settings) => {
            println!("OK");
            settings
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(e);
        }
    };

    let endpoints: Vec<String> = settings
        .endpoints
        .iter()
        .map(|e| e.path(&settings.namespace))
        .collect();

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Region: {}", config.aws_region);
    println!(
        "  Credentials: {}",
        if config.aws_access_key_id.is_some() { "static" } else { "default chain" }
    );
    if let Some(endpoint) = &config.dynamodb_endpoint {
        println!("  Endpoint Override: {}", endpoint);
    }
    println!("  Table: {}", settings.table_name);
    println!("  Status Table: {}", settings.status_table);
    println!("  Record Shape: {}", settings.record_shape);
    println!("  Filter Attribute: {}", settings.filter_attribute);
    println!("  Endpoints: {}", endpoints.join(", "));
    println!("  Port: {}", config.port);
    println!("  Request Timeout: {}ms", config.request_timeout_ms);
    println!(
        "  Store Retries: {} (base {}ms, max {}ms)",
        config.store_max_retries, config.store_retry_base_delay_ms, config.store_retry_max_delay_ms
    );
    println!(
        "  Log Shipping: {}",
        if config.log_shipping_enabled() { "Enabled" } else { "Disabled" }
    );
    println!(
        "  Metrics: {}",
        if config.metrics_enabled {
            format!("Enabled (port {})", config.metrics_port)
        } else {
            "Disabled".to_string()
        }
    );
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Run the HTTP server until a shutdown signal arrives.
async fn cmd_serve(config: Config, port_override: Option<u16>) -> Result<()> {
    let settings = config.validate().and_then(|_| config.settings()).map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    // Initialize metrics
    metrics::init_metrics();
    if config.metrics_enabled {
        let metrics_addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
        metrics::install_exporter(metrics_addr)?;
    }

    // Create store client
    let store = DynamoStore::from_config(&config).await;
    info!(region = %config.aws_region, table = %settings.table_name, "DynamoDB client ready");

    let mut app_state = AppState::new(Arc::new(store), settings);
    match LogglyClient::from_config(&config)? {
        Some(loggly) => {
            info!(tag = %config.loggly_tag, "Shipping request logs to Loggly");
            app_state = app_state.with_sink(Arc::new(loggly));
        }
        None => info!("LOGGLY_TOKEN not set, request logs stay local"),
    }

    for endpoint in app_state.settings.endpoints.iter() {
        info!("Serving GET {}", endpoint.path(&app_state.settings.namespace));
    }

    // Start HTTP server
    let port = port_override.unwrap_or(config.port);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    let router = create_router(app_state);
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("HTTP server stopped");
    Ok(())
}
