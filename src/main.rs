//! doc-analytics: ad-hoc SQL over an embedded database next to a Cube.js report.

use doc_analytics::analytics::create_client;
use doc_analytics::app::Session;
use doc_analytics::cli::Cli;
use doc_analytics::config::Config;
use doc_analytics::db::{bootstrap, BootstrapOptions};
use doc_analytics::error::Result;
use doc_analytics::{logging, tui};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // Load .env before clap reads env-backed flags
    let _ = dotenvy::dotenv();

    let cli = Cli::parse_args();
    if cli.headless {
        logging::init_stderr_logging();
    } else {
        logging::init_file_logging();
    }

    match run(&cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("{}: {}", e.category(), e);
            if !cli.headless {
                eprintln!("{}: {}", e.category(), e);
            }
            std::process::exit(1);
        }
    }
}

async fn run(cli: &Cli) -> Result<i32> {
    cli.validate_headless()?;

    // Precedence: CLI flags > config file > environment > defaults
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;
    config.analytics.apply_env_defaults();
    cli.apply_overrides(&mut config)?;
    config.validate()?;

    let db = bootstrap(&BootstrapOptions { seed: !cli.no_seed }).await?;

    let client = if config.analytics.enabled {
        match create_client(&config.analytics, cli.mock_analytics) {
            Ok(client) => {
                info!("Remote analytics: {}", client.endpoint());
                Some(client)
            }
            Err(e) => {
                warn!("Remote analytics unavailable: {}", e);
                None
            }
        }
    } else {
        None
    };
    let session = Session::new(Box::new(db), client);

    if cli.headless {
        tui::headless::run_headless(cli, &config.ui, session).await
    } else {
        info!("Logging to {}", logging::get_log_path().display());
        tui::run(&config.ui, session).await?;
        Ok(0)
    }
}
