use anyhow::Context;
use clap::{Parser, Subcommand};
use stardrop_simulator::{
    load_catalog, load_config,
    rtp::{self, Game, Params},
    session::{self, Options},
    store::FileStore,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Catalog JSON (defaults to the bundled catalog).
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Game config JSON; any omitted field keeps its default.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Estimate the realized return of one or all game modes.
    Rtp {
        #[arg(short, long, value_enum)]
        game: Option<Game>,

        #[arg(short, long, default_value_t = 100_000)]
        rounds: u64,

        #[arg(short, long, default_value_t = 0)]
        seed: u64,

        #[arg(long, default_value = "starter")]
        case: String,

        #[arg(long, default_value_t = 100)]
        stake: u64,

        #[arg(long, default_value_t = 2.0)]
        cash_out_at: f64,

        #[arg(long, default_value_t = 400)]
        target: u64,

        #[arg(long, default_value_t = 100)]
        bet: u64,

        #[arg(long, default_value_t = 1_000)]
        investment: u64,
    },
    /// Play a live session persisted to disk.
    Session {
        #[arg(long, default_value = "stardrop-data")]
        data_dir: PathBuf,

        /// Player id (a fresh one is generated if omitted).
        #[arg(short, long)]
        player: Option<String>,

        #[arg(long, default_value_t = 30)]
        seconds: u64,

        #[arg(long, default_value_t = 1.5)]
        cash_out_at: f64,

        /// Slot bet per business tick (0 to skip the slot).
        #[arg(long, default_value_t = 10)]
        slot_bet: u64,

        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse args
    let args = Args::parse();

    // Create logger
    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    // Load static configuration
    let catalog = load_catalog(args.catalog.as_deref())?;
    let config = load_config(args.config.as_deref(), &catalog)?;
    info!(
        items = catalog.items().len(),
        cases = catalog.cases().len(),
        "loaded catalog"
    );

    match args.command {
        Command::Rtp {
            game,
            rounds,
            seed,
            case,
            stake,
            cash_out_at,
            target,
            bet,
            investment,
        } => {
            let params = Params {
                case,
                stake_price: stake,
                cash_out_at,
                upgrade_target_price: target,
                bet,
                investment,
            };
            let games = match game {
                Some(game) => vec![game],
                None => vec![Game::Case, Game::Crash, Game::Upgrade, Game::Slot, Game::Business],
            };
            for game in games {
                let report = rtp::estimate(game, &catalog, &config, &params, rounds, seed)
                    .with_context(|| format!("failed to estimate {game:?}"))?;
                println!("{}", serde_json::to_string(&report)?);
            }
        }
        Command::Session {
            data_dir,
            player,
            seconds,
            cash_out_at,
            slot_bet,
            seed,
        } => {
            let player_id = player.unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());
            let options = Options {
                player_id,
                duration: Duration::from_secs(seconds),
                cash_out_at,
                slot_bet,
                seed,
                ..Options::default()
            };
            let store = FileStore::new(data_dir);
            let summary = session::run(&catalog, &config, store, &options)
                .await
                .context("session failed")?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}
