use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use scenecast::relay::{MemoryEngine, RelayConfig, RelayEngine, run_relay};
use scenecast::server::{HubConfig, serve, verifier_for};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "scenecast", version, about = "Pixel-streaming session orchestration")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signalling hub for render hosts, viewers and the relay.
    Hub {
        /// JSON config file; flags below override it.
        #[arg(short, long, env = "SCENECAST_HUB_CONFIG")]
        config: Option<PathBuf>,

        #[arg(long, env = "SCENECAST_BIND")]
        bind: Option<String>,

        #[arg(long, env = "SCENECAST_HTTP_PORT")]
        http_port: Option<u16>,

        #[arg(long, env = "SCENECAST_STREAMER_PORT")]
        streamer_port: Option<u16>,

        #[arg(long, env = "SCENECAST_RELAY_PORT")]
        relay_port: Option<u16>,

        #[arg(long, env = "SCENECAST_KEEP_ALIVE_MS")]
        keep_alive_ms: Option<u64>,
    },

    /// Run a relay against the in-process memory engine.
    Relay {
        #[arg(short, long, env = "SCENECAST_RELAY_CONFIG")]
        config: Option<PathBuf>,

        #[arg(long, env = "SCENECAST_HUB_URL")]
        hub_url: Option<String>,

        #[arg(long, env = "SCENECAST_WORKERS")]
        workers: Option<usize>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Hub {
            config,
            bind,
            http_port,
            streamer_port,
            relay_port,
            keep_alive_ms,
        } => {
            let mut hub = HubConfig::load(config.as_deref()).context("Failed to load hub config")?;
            if let Some(bind) = bind {
                hub.bind_address = bind;
            }
            if let Some(port) = http_port {
                hub.http_port = port;
            }
            if let Some(port) = streamer_port {
                hub.streamer_port = port;
            }
            if let Some(port) = relay_port {
                hub.relay_port = port;
            }
            if let Some(ms) = keep_alive_ms {
                hub.keep_alive_ms = ms;
            }

            println!("{}", "Starting scenecast hub".green().bold());
            println!("   viewers:      {}:{}", hub.bind_address, hub.http_port);
            println!("   render hosts: {}:{}", hub.bind_address, hub.streamer_port);
            println!("   relay:        {}:{}", hub.bind_address, hub.relay_port);

            let verifier = verifier_for(&hub);
            serve(hub, verifier).await.context("Hub stopped")?;
        }

        Commands::Relay {
            config,
            hub_url,
            workers,
        } => {
            let mut relay =
                RelayConfig::load(config.as_deref()).context("Failed to load relay config")?;
            if let Some(url) = hub_url {
                relay.hub_url = url;
            }
            if let Some(workers) = workers {
                relay.worker_count = workers;
            }

            println!("{}", "Starting scenecast relay".cyan().bold());
            println!("   hub:     {}", relay.hub_url);
            println!("   workers: {}", relay.worker_count);

            let engine: Arc<dyn RelayEngine> = Arc::new(MemoryEngine::new());
            run_relay(relay, engine).await.context("Relay stopped")?;
        }
    }

    Ok(())
}
