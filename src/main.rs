// ABOUTME: Command-line entry point for mesh-forge
// ABOUTME: Loads config, wires the remote client and asset database, runs one conversion

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use mesh_forge::{
    Config, LoggingGateway, Orchestrator, PersistenceGateway, PollLoop, PostgresGateway,
    RemoteClient,
};

#[derive(Parser)]
#[command(name = "mesh-forge")]
#[command(about = "Turn an image into a 3D model and attach it to its asset", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a 3D model from an image and record it on the asset
    Generate {
        /// Asset that owns the generated model
        #[arg(long)]
        owner_id: Uuid,
        /// Publicly reachable URL of the source image
        #[arg(long)]
        image_url: String,
        /// Text guidance for the generator
        #[arg(long, default_value = "")]
        prompt: String,
        /// Log the database update instead of executing it
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.apply_env();
    config.validate()?;

    match cli.command {
        Commands::Generate {
            owner_id,
            image_url,
            prompt,
            dry_run,
        } => generate(&config, owner_id, image_url, prompt, dry_run).await,
    }
}

async fn generate(
    config: &Config,
    owner_id: Uuid,
    image_url: String,
    prompt: String,
    dry_run: bool,
) -> Result<()> {
    let client = Arc::new(RemoteClient::from_config(&config.remote)?);

    let gateway: Arc<dyn PersistenceGateway> = if dry_run {
        Arc::new(LoggingGateway)
    } else {
        let url = config.database.url.as_deref().context(
            "No database configured. Set database.url or DATABASE_URL, or pass --dry-run",
        )?;
        Arc::new(PostgresGateway::connect(url, config.database.status_marker.clone()).await?)
    };

    let orchestrator = Orchestrator::new(client, gateway, PollLoop::from(&config.poll));

    let result_url = orchestrator
        .run(owner_id, image_url, prompt)
        .await
        .with_context(|| format!("3D generation for asset {} failed", owner_id))?;

    println!("Success! 3D asset ready at: {}", result_url);
    Ok(())
}
