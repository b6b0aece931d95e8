use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing::{Level, event};

use thorp_app::background::now_ms;
use thorp_app::config::ThorpConfig;
use thorp_app::logging::init_logging;
use thorp_app::presentation::format::Tone;
use thorp_app::presentation::{OverlayView, PopupView, TerminalOverlay};
use thorp_app::store::{JsonFileStore, PersistenceStore, StoredStatus, keys, reset_entries};
use thorp_app::watch::Watch;
use thorp_core::engine::clamp_deck_count;
use thorp_core::model::card::Card;
use thorp_core::model::shoe::Shoe;
use thorp_core::{AppInfo, CountingEngine};
use thorp_page::detect::extract_rank_token;
use thorp_page::{DetectionStream, StreamError};

/// Hi-Lo card counter for table game pages.
#[derive(Debug, Parser)]
#[command(
    name = AppInfo::name(),
    author,
    version = AppInfo::version(),
    about = "Hi-Lo card counting from a page event feed"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Override the persisted store location.
    #[arg(long, value_name = "FILE", global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Count cards from page events and protocol messages, one JSON object per line.
    Watch(WatchArgs),
    /// Print each detection in a page event feed as a JSON line.
    Scan {
        /// Read events from FILE instead of stdin.
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,
    },
    /// Show the stored count.
    Status,
    /// Zero the stored count.
    Reset,
    /// Store the number of decks in the shoe (clamped to 1..=8).
    SetDecks {
        #[arg(value_name = "N", allow_negative_numbers = true)]
        count: i64,
    },
    /// Deal cards from a seeded shoe through a fresh engine.
    Simulate(SimulateArgs),
}

#[derive(Debug, Args)]
struct WatchArgs {
    /// Read input from FILE instead of stdin.
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Override the configured deck count.
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    decks: Option<i64>,

    /// Override the overlay refresh interval.
    #[arg(long, value_name = "MS")]
    refresh_ms: Option<u64>,

    /// Colour the overlay with ANSI escapes.
    #[arg(long)]
    color: bool,
}

#[derive(Debug, Args)]
struct SimulateArgs {
    /// Decks in the shoe; defaults to the configured count.
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    decks: Option<i64>,

    /// RNG seed for the shuffle; defaults to the current time.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Number of cards to deal; defaults to the whole shoe.
    #[arg(long, value_name = "COUNT")]
    cards: Option<usize>,

    /// Count these cards instead of a shuffled shoe, e.g. "K♠,5h,10 of diamonds".
    #[arg(long, value_name = "CARDS", conflicts_with_all = ["seed", "cards"])]
    deal: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = ThorpConfig::load_or_default(cli.config.as_deref())?;

    if let Some(store) = cli.store {
        config.store.path = store;
    }

    if let Command::Watch(args) = &cli.command {
        if let Some(refresh_ms) = args.refresh_ms {
            config.overlay.refresh_interval_ms = refresh_ms;
        }
        if args.color {
            config.overlay.color = true;
        }
    }

    config.validate()?;

    let _logging_guard = init_logging(&config.logging)?;
    event!(
        target: "thorp::session",
        Level::DEBUG,
        version = AppInfo::version(),
        codename = AppInfo::codename(),
        "{} starting",
        AppInfo::name()
    );

    match cli.command {
        Command::Watch(args) => run_watch(&config, args),
        Command::Scan { input } => run_scan(input.as_deref()),
        Command::Status => run_status(&config),
        Command::Reset => run_reset(&config),
        Command::SetDecks { count } => run_set_decks(&config, count),
        Command::Simulate(args) => run_simulate(&config, args),
    }
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead + Send>> {
    match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("opening input at {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

fn open_store(config: &ThorpConfig) -> Result<JsonFileStore> {
    let path = &config.store.path;
    JsonFileStore::open(path).with_context(|| format!("opening store at {}", path.display()))
}

fn run_watch(config: &ThorpConfig, args: WatchArgs) -> Result<()> {
    let input = open_input(args.input.as_deref())?;
    let store = open_store(config)?;
    let decks = args.decks.unwrap_or_else(|| {
        store
            .get(keys::DECK_COUNT)
            .and_then(|value| value.as_i64())
            .unwrap_or(config.engine.deck_count)
    });
    let sink = TerminalOverlay::new(io::stderr(), config.overlay.color);

    let mut watch = Watch::new(store, sink, decks);
    let refresh = Duration::from_millis(config.overlay.refresh_interval_ms);
    let summary = watch
        .run(input, io::stdout(), refresh)
        .context("watching page events")?;
    if summary.store_failures > 0 {
        eprintln!(
            "warning: {} store writes failed; {} may be stale",
            summary.store_failures,
            config.store.path.display()
        );
    }
    Ok(())
}

fn run_scan(input: Option<&Path>) -> Result<()> {
    let reader = open_input(input)?;
    for item in DetectionStream::new(reader) {
        match item {
            Ok(detection) => println!("{}", serde_json::to_string(&detection)?),
            Err(err @ StreamError::Parse { .. }) => {
                event!(
                    target: "thorp::detect",
                    Level::WARN,
                    line = err.line(),
                    error = %err,
                    "skipping malformed page event"
                );
            }
            Err(err) => return Err(err).context("scanning page events"),
        }
    }
    Ok(())
}

fn run_status(config: &ThorpConfig) -> Result<()> {
    let store = open_store(config)?;
    let status = StoredStatus::load(&store);
    println!(
        "{}",
        PopupView::from_status(&status).render(config.overlay.color)
    );
    Ok(())
}

fn run_reset(config: &ThorpConfig) -> Result<()> {
    let mut store = open_store(config)?;
    store
        .set_many(reset_entries())
        .context("writing reset values")?;
    println!("Count reset");
    Ok(())
}

fn run_set_decks(config: &ThorpConfig, count: i64) -> Result<()> {
    let decks = clamp_deck_count(count);
    let mut store = open_store(config)?;
    store
        .set(keys::DECK_COUNT, Value::from(decks))
        .context("writing deck count")?;
    println!("Deck count set to {decks}");
    Ok(())
}

fn run_simulate(config: &ThorpConfig, args: SimulateArgs) -> Result<()> {
    let decks = clamp_deck_count(args.decks.unwrap_or(config.engine.deck_count));
    if let Some(deal) = args.deal.as_deref() {
        return run_deal(config, decks, deal);
    }
    let seed = args.seed.unwrap_or_else(now_ms);
    let shoe = Shoe::shuffled_with_seed(decks, seed);
    let dealt = args.cards.unwrap_or(shoe.cards().len()).min(shoe.cards().len());

    let mut engine = CountingEngine::with_deck_count(i64::from(decks));
    for card in &shoe.cards()[..dealt] {
        let label = card.page_label();
        if let Some(token) = extract_rank_token(&label) {
            engine.observe_card(token);
        }
    }

    println!(
        "Dealt {dealt} of {} cards ({decks} decks, seed {seed})",
        shoe.cards().len()
    );
    println!(
        "{}",
        OverlayView::from_state(engine.state()).render(config.overlay.color)
    );
    Ok(())
}

fn run_deal(config: &ThorpConfig, decks: u8, deal: &str) -> Result<()> {
    let mut engine = CountingEngine::with_deck_count(i64::from(decks));
    let mut shown = Vec::new();
    for token in deal.split(',').map(str::trim).filter(|token| !token.is_empty()) {
        let Some(card) = Card::from_token(token) else {
            bail!("unrecognised card `{token}`");
        };
        engine.observe_rank(card.rank);
        let tone = if card.suit.is_red() {
            Tone::Negative
        } else {
            Tone::Neutral
        };
        shown.push(tone.paint(&card.to_string(), config.overlay.color));
    }

    println!("Dealt {} ({decks} decks)", shown.join(" "));
    println!(
        "{}",
        OverlayView::from_state(engine.state()).render(config.overlay.color)
    );
    Ok(())
}
