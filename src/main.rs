use tracing::info;

use filestash::file::{FileRegistry, FileStorage};
use filestash::web::server::shutdown_signal;
use filestash::{Config, Database, WebServer};

const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load_with_env(CONFIG_PATH) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {CONFIG_PATH}: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = filestash::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        filestash::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = run(config).await {
        tracing::error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> filestash::Result<()> {
    config.validate()?;

    info!("filestash starting");

    let db = Database::open(&config.database.path).await?;
    info!("Database opened at {}", config.database.path);

    let storage = FileStorage::new(&config.files.storage_path)?;
    match storage.cleanup_empty_dirs() {
        Ok(0) => {}
        Ok(removed) => info!("Removed {} empty storage directories", removed),
        Err(e) => tracing::warn!("Failed to clean up storage directories: {}", e),
    }
    info!("File storage at {}", config.files.storage_path);

    let registry = FileRegistry::with_database(&db, storage);
    let server = WebServer::new(&config.server, &config.files, registry)?;

    let result = server.run(shutdown_signal()).await;

    db.close().await;
    info!("Database closed");

    result?;
    info!("filestash stopped");
    Ok(())
}
