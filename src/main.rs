use clap::Parser;
use okx_tape::cli::{Cli, Commands};
use okx_tape::config::{Config, ConfigError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration; only a missing file falls back to the bundled example
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(ConfigError::Io { path, source }) => {
            let path = path.display();
            eprintln!("Warning: Could not load config from {path}: {source}");
            eprintln!("Using default configuration");
            Config::from_toml_str(include_str!("../config.toml.example"))?
        }
        Err(e) => anyhow::bail!("Invalid configuration in {}: {}", cli.config, e),
    };

    // Initialize telemetry
    let _telemetry = okx_tape::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            tracing::info!("Starting trade feed");
            args.execute(config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!(
                "  Endpoint: {} (tls: {:?})",
                config.feed.url, config.feed.tls
            );
            println!(
                "  Instruments: {} [{}]",
                config.feed.exchange_tag,
                config.feed.instruments.join(", ")
            );
            println!("  Buffer capacity: {}", config.buffer.capacity);
            println!(
                "  Keepalive: ping {}s, timeout {}s",
                config.keepalive.ping_interval_secs, config.keepalive.pong_timeout_secs
            );
            println!(
                "  Reconnect: {}ms initial, {}s max",
                config.reconnect.initial_delay_ms, config.reconnect.max_delay_secs
            );
            println!(
                "  Display: every {}ms, times in {}",
                config.display.refresh_ms, config.display.timezone
            );
        }
    }

    Ok(())
}
