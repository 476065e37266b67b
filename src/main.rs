mod cli;

use tidepool::{config, engine, server};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use tidepool_common::{MediaKind, SearchQuery};

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&std::path::Path>,
) -> Result<()> {
    // Load config
    let mut config = config::load_config_or_default(config_path)?;

    // Override host/port from CLI if specified
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting Tidepool server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );
    tracing::info!(
        "Catalog backend: {:?}, public base URL: {}",
        config.storage.backend,
        config.storage.resolved_public_base_url()
    );

    let aggregator = engine::build_aggregator(&config)?;
    server::start_server(config, aggregator).await
}

async fn run_search(
    config_path: Option<&std::path::Path>,
    kind: MediaKind,
    query: Option<String>,
    page: u32,
    per_page: u32,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let aggregator = engine::build_aggregator(&config)?;

    let query = SearchQuery::new(query.unwrap_or_default(), page, per_page);
    let response = aggregator.search(kind, &query).await?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn main() -> Result<()> {
    // .env is optional; real environment variables win
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "tidepool=trace,tidepool_search=trace,tidepool_common=debug,tower_http=debug".to_string()
        } else {
            "tidepool=info,tidepool_search=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Search {
            kind,
            query,
            page,
            per_page,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_search(cli.config.as_deref(), kind, query, page, per_page))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("tidepool {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn validate_config(path: Option<&std::path::Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Storage backend: {:?}", config.storage.backend);
            println!(
                "  Public base URL: {}",
                config.storage.resolved_public_base_url()
            );
            println!(
                "  Prefixes: {} {} {}",
                config.storage.photos_prefix,
                config.storage.videos_prefix,
                config.storage.collections_prefix
            );
            println!(
                "  Provider: {} (API key {})",
                config.provider.base_url,
                if config.provider.api_key.is_empty() {
                    "missing"
                } else {
                    "set"
                }
            );
            println!(
                "  Search: threshold {}, fallback term {:?}",
                config.search.threshold, config.search.fallback_term
            );
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Server: {}:{}", config.server.host, config.server.port);
        }
    }

    Ok(())
}
