use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rank_tracker::api::state::AppState;
use rank_tracker::config::AppConfig;
use rank_tracker::models::RiotId;
use rank_tracker::retry::{retry_with_backoff, RetryPolicy};
use rank_tracker::riot::RiotClient;
use rank_tracker::storage::{JsonlPlayerStore, PlayerStore, StorageConfig};
use rank_tracker::sync::{RefreshScheduler, Reconciler, SchedulerConfig};

#[derive(Parser)]
#[command(name = "rank-tracker")]
#[command(about = "League of Legends solo/duo ladder for a fixed roster of accounts")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server and the background refresh loop
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,
    },

    /// Reconcile the seed roster and every stored player
    Sync {
        /// Run one pass and exit instead of looping
        #[arg(long)]
        once: bool,
    },

    /// Add (or refresh) a single player, e.g. "Larapio#Larap"
    Add {
        riot_id: String,
    },

    /// Print the stored ladder
    Ranking,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = AppConfig::resolve(&PathBuf::from(&cli.config))
        .with_context(|| format!("loading {}", cli.config))?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir = PathBuf::from(dir);
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting rank-tracker v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Ranking => {
            let store = open_store(&config).await?;
            print_ranking(store.as_ref()).await?;
        }
        Commands::Add { riot_id } => {
            let riot_id: RiotId = riot_id.parse()?;
            config.validate()?;
            let store = open_store(&config).await?;
            let reconciler = build_reconciler(&config, store)?;

            let player = reconciler.reconcile(&riot_id).await?;
            println!(
                "{} {} {} {} LP (score {})",
                player.riot_id(),
                player.tier,
                player.division,
                player.league_points,
                player.sort_score
            );
        }
        Commands::Sync { once } => {
            config.validate()?;
            let store = open_store(&config).await?;
            let reconciler = build_reconciler(&config, store.clone())?;
            let scheduler = Arc::new(RefreshScheduler::new(
                reconciler,
                scheduler_config(&config)?,
            ));

            if once {
                let report = scheduler.sync_once().await?;
                tracing::info!(
                    "Sync finished: {}/{} ok, {} failed{}",
                    report.succeeded,
                    report.attempted,
                    report.failed,
                    if report.aborted { " (aborted)" } else { "" }
                );
                print_ranking(store.as_ref()).await?;
            } else {
                tokio::select! {
                    _ = scheduler.run() => {}
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Shutting down...");
                    }
                }
            }
        }
        Commands::Serve { host, port } => {
            config.validate()?;
            let store = open_store(&config).await?;
            let reconciler = build_reconciler(&config, store.clone())?;
            let scheduler = Arc::new(RefreshScheduler::new(
                reconciler.clone(),
                scheduler_config(&config)?,
            ));

            let state = AppState {
                store,
                reconciler,
                scheduler_status: scheduler.status(),
                cors_origin: config.server.cors_origin.clone(),
            };
            let refresh = scheduler.spawn();

            let app = rank_tracker::api::build_router(state);
            let addr = format!(
                "{}:{}",
                host.unwrap_or_else(|| config.server.host.clone()),
                port.unwrap_or(config.server.port)
            );
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("binding {}", addr))?;
            tracing::info!("Ladder: http://{}/api/ranking", addr);

            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    tokio::signal::ctrl_c().await.ok();
                    tracing::info!("Shutting down...");
                })
                .await?;
            refresh.abort();
        }
    }

    Ok(())
}

async fn open_store(config: &AppConfig) -> Result<Arc<JsonlPlayerStore>> {
    let storage = StorageConfig::new(config.data_dir.clone());
    let target = &storage;
    let store = retry_with_backoff(
        "player store",
        RetryPolicy::with_attempts(config.sync.startup_retries),
        move || async move { JsonlPlayerStore::open(target) },
    )
    .await
    .with_context(|| format!("opening {}", storage.players_path().display()))?;

    Ok(Arc::new(store))
}

fn build_reconciler(config: &AppConfig, store: Arc<JsonlPlayerStore>) -> Result<Arc<Reconciler>> {
    let client = RiotClient::new(&config.riot).context("building Riot client")?;
    Ok(Arc::new(Reconciler::new(Arc::new(client), store)))
}

fn scheduler_config(config: &AppConfig) -> Result<SchedulerConfig> {
    let refresh_interval = config
        .sync
        .refresh_interval()
        .with_context(|| format!("invalid refresh interval {}", config.sync.refresh_interval))?;

    Ok(SchedulerConfig {
        seed_players: config.sync.seed_players.clone(),
        refresh_interval,
        request_delay: config.sync.request_delay(),
    })
}

async fn print_ranking(store: &dyn PlayerStore) -> Result<()> {
    let players = store.list().await?;
    if players.is_empty() {
        println!("No players tracked yet.");
        return Ok(());
    }

    println!(
        "{:>3}  {:<28} {:<12} {:>4} {:>6} {:>6}",
        "#", "Player", "Rank", "LP", "Win%", "Score"
    );
    for (idx, p) in players.iter().enumerate() {
        let rank = if p.division.is_empty() {
            p.tier.clone()
        } else {
            format!("{} {}", p.tier, p.division)
        };
        println!(
            "{:>3}  {:<28} {:<12} {:>4} {:>5.1}% {:>6}",
            idx + 1,
            p.riot_id().to_string(),
            rank,
            p.league_points,
            p.win_rate,
            p.sort_score
        );
    }
    Ok(())
}
