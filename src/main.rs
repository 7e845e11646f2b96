use artgen::logger::{self, LoggerConfig};
use artgen::{ArtClient, ArtConfig};
use std::process::ExitCode;

#[actix_web::main]
async fn main() -> ExitCode {
    // Load .env file first
    let dotenv_loaded = dotenv::dotenv().is_ok();

    if let Err(e) = logger::init_with_config(LoggerConfig::from_env()) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    if dotenv_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let config = ArtConfig::from_env();
    logger::log_config_info(&config);

    // Refuse to start rather than send unauthenticated requests later.
    if let Err(e) = config.validate() {
        log::error!("❌ {}", e);
        return ExitCode::FAILURE;
    }

    let client = match ArtClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            log::error!("❌ Failed to initialize inference client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    logger::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), config.port);

    match artgen::server::run(client, config.port).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("❌ Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}
