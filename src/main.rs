use clap::Parser;
use ordertrack::cli::{Cli, Commands};
use ordertrack::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        Config::default()
    });

    // Initialize telemetry
    let _guard = ordertrack::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Track(args) => {
            args.execute(&config).await?;
        }
        Commands::Simulate(args) => {
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  API: {}", config.api.base_url);
            println!("  Tracking: {}", config.tracking.ws_base_url);
            println!(
                "  Reconnect: max {} attempts, {}ms base, {}ms cap",
                config.tracking.max_reconnect_attempts,
                config.tracking.base_delay_ms,
                config.tracking.max_delay_ms
            );
            println!(
                "  Logging: {} ({})",
                config.telemetry.log_level, config.telemetry.log_format
            );
        }
    }

    Ok(())
}
