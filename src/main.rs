use clap::Parser;
use discord_reset::{Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Reset { week, config, json } => {
            discord_reset::run_reset(&week, &config, json).await
        }
        Commands::MarkDone { channel, config } => {
            discord_reset::run_mark_done(channel, &config).await
        }
        Commands::StripMark { channel, config } => {
            discord_reset::run_strip_mark(channel, &config).await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
