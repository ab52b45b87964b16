//! Headless command-line front end for the Keyhaven pipeline.
//!
//! Wires configuration, the SQLite catalog, the harvest orchestrator, the
//! validation runner, and the sync controller together. The browser-facing
//! surfaces live elsewhere; this binary exists to run and observe the
//! pipeline end to end.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use keyhaven_core::{AppConfig, CatalogStore, Target};
use keyhaven_db::Database;
use keyhaven_harvest::HarvestOrchestrator;
use keyhaven_sync::{SyncController, SyncMode, SyncStatus};
use keyhaven_validate::{HttpAuthChecker, ValidationRunner};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "keyhaven", version, about = "Shared game account catalog pipeline")]
struct Cli {
    /// Path to the catalog database (defaults to the XDG data dir)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a default config file if none exists
    InitConfig,
    /// Harvest one page and print the candidates found
    Harvest {
        /// Source-site page URL
        url: String,
    },
    /// Run a sync over a target list (or a single target)
    Sync {
        /// JSON file with an array of {"game_name", "page_url"} targets
        #[arg(long, conflicts_with_all = ["game", "url"])]
        targets: Option<PathBuf>,
        /// Game name for a single-target sync
        #[arg(long, requires = "url")]
        game: Option<String>,
        /// Page URL for a single-target sync
        #[arg(long, requires = "game")]
        url: Option<String>,
    },
    /// Show catalog totals and the last sync run
    Status,
    /// Validate all accounts of a game against the platform
    Validate {
        /// Game name as catalogued
        game: String,
    },
}

/// Target list file entry; short field spellings are accepted too.
#[derive(Debug, Deserialize)]
struct TargetEntry {
    #[serde(alias = "name")]
    game_name: String,
    #[serde(alias = "url")]
    page_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("keyhaven=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load_with_env().context("load configuration")?;

    match cli.command {
        Command::InitConfig => init_config(&config),
        Command::Harvest { url } => harvest(&config, &url).await,
        Command::Sync { targets, game, url } => {
            let targets = resolve_targets(targets, game, url)?;
            sync(&config, cli.db, targets).await
        }
        Command::Status => status(cli.db).await,
        Command::Validate { game } => validate(&config, cli.db, &game).await,
    }
}

fn init_config(config: &AppConfig) -> Result<()> {
    let path = AppConfig::config_path().context("determine config path")?;
    if path.exists() {
        println!("config already present at {}", path.display());
        return Ok(());
    }
    config.save().context("write default config")?;
    println!("wrote default config to {}", path.display());
    Ok(())
}

async fn open_database(db_path: Option<PathBuf>) -> Result<Arc<Database>> {
    let path = match db_path {
        Some(path) => path,
        None => {
            let dir = AppConfig::data_dir().context("determine data dir")?;
            std::fs::create_dir_all(&dir).context("create data dir")?;
            dir.join("keyhaven.db")
        }
    };
    let db = Database::new(&path)
        .await
        .with_context(|| format!("open database at {}", path.display()))?;
    db.run_migrations().await.context("run migrations")?;
    Ok(Arc::new(db))
}

async fn harvest(config: &AppConfig, url: &str) -> Result<()> {
    let orchestrator =
        HarvestOrchestrator::from_config(&config.harvest).context("build source chain")?;
    let report = orchestrator.harvest(url).await;

    match report.source {
        Some(source) => {
            println!("{} candidates via {source}", report.candidates.len());
            for candidate in &report.candidates {
                println!("  {}\t{}", candidate.identifier, candidate.secret);
            }
        }
        None => println!("nothing found: {}", report.reason),
    }
    Ok(())
}

fn resolve_targets(
    targets_file: Option<PathBuf>,
    game: Option<String>,
    url: Option<String>,
) -> Result<(Vec<Target>, SyncMode)> {
    if let Some(path) = targets_file {
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("read targets file {}", path.display()))?;
        let entries: Vec<TargetEntry> =
            serde_json::from_str(&contents).context("parse targets file")?;
        let targets = entries
            .into_iter()
            .map(|e| Target::new(e.game_name, e.page_url))
            .collect();
        return Ok((targets, SyncMode::Full));
    }

    match (game, url) {
        (Some(game), Some(url)) => Ok((vec![Target::new(game, url)], SyncMode::Single)),
        _ => bail!("pass either --targets FILE or both --game and --url"),
    }
}

async fn sync(
    config: &AppConfig,
    db_path: Option<PathBuf>,
    (targets, mode): (Vec<Target>, SyncMode),
) -> Result<()> {
    let db = open_database(db_path).await?;
    let store: Arc<dyn CatalogStore> = db.clone();
    let orchestrator = Arc::new(
        HarvestOrchestrator::from_config(&config.harvest).context("build source chain")?,
    );
    let controller = SyncController::new(orchestrator, store, &config.sync);

    #[allow(clippy::cast_possible_truncation)]
    let total = targets.len() as u32;
    let run = keyhaven_db::sync_runs::create_sync_run(db.pool(), "global", mode.as_str(), total)
        .await
        .context("record sync run")?;

    if let Err(err) = controller.start("global", targets, mode) {
        bail!("sync refused: {err}");
    }

    // Poll the snapshot the way a browser client would.
    let snapshot = loop {
        let snapshot = controller.snapshot("global");
        println!(
            "{}: {:.0}% ({}/{} targets, {} accounts, {} games)",
            snapshot.status,
            snapshot.percent,
            snapshot.targets_processed,
            snapshot.targets_total,
            snapshot.accounts_added,
            snapshot.games_added
        );
        if snapshot.status.is_terminal() {
            break snapshot;
        }
        tokio::time::sleep(Duration::from_secs(2)).await;
    };

    keyhaven_db::sync_runs::finish_sync_run(
        db.pool(),
        &run.id,
        snapshot.status.as_str(),
        snapshot.targets_processed,
        snapshot.accounts_added,
        snapshot.games_added,
        snapshot.error.as_deref(),
    )
    .await
    .context("record sync result")?;

    if snapshot.status == SyncStatus::Failed {
        bail!(
            "sync failed: {}",
            snapshot.error.unwrap_or_else(|| "unknown error".to_string())
        );
    }

    if !snapshot.recently_added_games.is_empty() {
        println!("new games: {}", snapshot.recently_added_games.join(", "));
    }
    println!(
        "done: {} accounts added across {} targets",
        snapshot.accounts_added, snapshot.targets_total
    );
    Ok(())
}

async fn status(db_path: Option<PathBuf>) -> Result<()> {
    let db = open_database(db_path).await?;

    let games = keyhaven_db::games::list_games(db.pool())
        .await
        .context("list games")?;
    let accounts = keyhaven_db::accounts::count_accounts(db.pool())
        .await
        .context("count accounts")?;
    println!("{} games, {} accounts", games.len(), accounts);

    match keyhaven_db::sync_runs::latest_sync_run(db.pool(), "global")
        .await
        .context("query sync history")?
    {
        Some(run) => {
            println!(
                "last sync: {} ({}), {}/{} targets, {} accounts added, started {}",
                run.status,
                run.mode,
                run.targets_processed,
                run.targets_total,
                run.accounts_added,
                run.started_at
            );
            if let Some(error) = run.error {
                println!("  error: {error}");
            }
        }
        None => println!("no sync has run yet"),
    }
    Ok(())
}

async fn validate(config: &AppConfig, db_path: Option<PathBuf>, game_name: &str) -> Result<()> {
    let db = open_database(db_path).await?;
    let store: Arc<dyn CatalogStore> = db.clone();

    let Some(game) = keyhaven_db::games::find_game(db.pool(), game_name)
        .await
        .context("look up game")?
    else {
        bail!("game '{game_name}' is not in the catalog");
    };

    let accounts = store
        .find_accounts_by_game(&game.id)
        .await
        .context("load accounts")?;
    if accounts.is_empty() {
        println!("no accounts catalogued for '{game_name}'");
        return Ok(());
    }

    let checker = HttpAuthChecker::new(
        reqwest::Client::new(),
        config.validation.checker_url.clone(),
    );
    let runner = ValidationRunner::new(Arc::new(checker), store, &config.validation);

    println!(
        "validating {} accounts, one every {}ms",
        accounts.len(),
        config.validation.min_delay_ms
    );
    let report = runner.validate_batch(&accounts).await;

    for outcome in &report.outcomes {
        println!(
            "  {}\t{}\t{} ({}ms)",
            outcome.identifier, outcome.status, outcome.reason, outcome.duration_ms
        );
    }

    if report.checker_unavailable {
        bail!(
            "authentication checker unavailable after {} of {} checks; try again later",
            report.outcomes.len(),
            accounts.len()
        );
    }
    Ok(())
}
