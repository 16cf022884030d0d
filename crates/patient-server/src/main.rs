use clap::Parser;
use patient_server::ServerBuilder;
use patient_server::config::loader::{DEFAULT_CONFIG_FILE, load_config};

/// Environment variable naming the configuration file.
const CONFIG_ENV: &str = "PATIENTS_CONFIG";

#[derive(Debug, Parser)]
#[command(name = "patient-server", version, about = "Patient registry HTTP server")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, env = CONFIG_ENV, default_value = DEFAULT_CONFIG_FILE)]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    if let Err(e) = dotenvy::dotenv()
        && !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
    {
        eprintln!("Warning: Failed to load .env file: {e}");
    }

    patient_server::observability::init_tracing();

    let cli = Cli::parse();

    let cfg = match load_config(Some(&cli.config)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    patient_server::observability::apply_logging_level(&cfg.logging.level);

    tracing::info!(
        path = %cli.config,
        backend = %cfg.storage.backend,
        "Configuration loaded"
    );

    let server = ServerBuilder::new().with_config(cfg).build().await?;
    server.run().await
}
