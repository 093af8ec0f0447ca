use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Use the library instead of redeclaring modules
use school_pages::{
    catalog::Catalog,
    config::Config,
    generator::{GeminiClient, GenerationService},
    palette::LogoPalette,
    resolver::SchoolResolver,
    services::PageService,
    store::PageStore,
    web::WebServer,
};

#[derive(Parser)]
#[command(name = "school-pages")]
#[command(version = "0.1.0")]
#[command(about = "Generates and caches school websites from fuzzy name queries")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Database URL (overrides config file)
    #[arg(short = 'd', long, value_name = "URL")]
    database_url: Option<String>,

    /// School catalog JSON file (overrides the embedded catalog)
    #[arg(long, value_name = "PATH")]
    catalog: Option<std::path::PathBuf>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with specified level
    let log_filter = if cli.log_level == "trace" {
        format!("school_pages={},tower_http=trace", cli.log_level)
    } else {
        format!("school_pages={}", cli.log_level)
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting School Pages Service v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration from specified file
    std::env::set_var("CONFIG_FILE", &cli.config);
    let mut config = Config::load()?;
    info!("Configuration loaded from: {}", cli.config);

    // Override config with CLI arguments
    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }
    if let Some(database_url) = cli.database_url {
        config.database.url = database_url;
    }
    if let Some(catalog_path) = cli.catalog {
        config.catalog.path = Some(catalog_path);
    }

    info!("Using database: {}", config.database.url);

    let store = PageStore::new(&config.database).await?;
    store.migrate().await?;
    info!("Database connection established and migrations applied");

    let catalog = Catalog::load(&config.catalog)?;
    let resolver = SchoolResolver::new(catalog.schools().to_vec(), config.resolver.min_score);
    info!(
        "School resolver initialized ({} schools, minimum score {})",
        catalog.len(),
        config.resolver.min_score
    );

    let palette_source = LogoPalette::new(&config.palette)?;
    let generator = GeminiClient::new(&config.generator)?;
    let generation = GenerationService::new(
        Arc::new(palette_source),
        Arc::new(generator),
        config.generator.region.clone(),
    );
    info!("Page generation service initialized (model: {})", config.generator.model);

    let page_service = PageService::new(resolver, store, generation, config.cache.clone());

    let web_server = WebServer::new(&config.web, Arc::new(page_service))?;

    info!(
        "Starting web server on {}:{}",
        web_server.host(),
        web_server.port()
    );
    web_server.serve().await?;

    Ok(())
}
