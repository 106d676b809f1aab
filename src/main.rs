use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use freshet::app::AppContext;
use freshet::cli::{commands, Cli, Commands};
use freshet::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("freshet=warn")))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(store) = cli.store {
        config.store_path = Some(store);
    }
    if let Some(workers) = cli.workers {
        config.fetch.workers = Some(workers);
    }

    let ctx = AppContext::new(&config)?;

    match cli.command {
        Commands::Add { urls } => {
            commands::add_sources(&ctx, &urls, cli.salvage)?;
        }
        Commands::Delete { urls } => {
            commands::delete_sources(&ctx, &urls, cli.salvage)?;
        }
        Commands::List => {
            commands::list_sources(&ctx)?;
        }
        Commands::Fetch => {
            commands::fetch_sources(&ctx, cli.salvage).await?;
        }
    }

    Ok(())
}
