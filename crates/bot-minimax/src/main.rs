//! Terminal front end for the mailbox chess engine.
//!
//! Play against the engine on stdin/stdout, or let it play itself for a
//! fixed number of plies. Search settings come from `engine.toml` (or
//! `--config`) and can be overridden on the command line.

mod config;
mod session;

use anyhow::Context;
use chess_core::Color;
use chess_engine::Game;
use clap::{Parser, ValueEnum};
use config::EngineConfig;
use session::Session;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Side {
    White,
    Black,
    /// Engine only moves on "go".
    None,
}

impl Side {
    fn color(self) -> Option<Color> {
        match self {
            Side::White => Some(Color::White),
            Side::Black => Some(Color::Black),
            Side::None => None,
        }
    }
}

/// Mailbox chess engine with alpha-beta search.
#[derive(Parser, Debug)]
#[command(name = "bot-minimax")]
#[command(about = "Play chess against an alpha-beta engine in the terminal")]
struct Args {
    /// Path to a TOML config file with a [search] table
    #[arg(long)]
    config: Option<PathBuf>,

    /// Search depth in plies
    #[arg(long)]
    depth: Option<u8>,

    /// Time budget per move in milliseconds (0 disables)
    #[arg(long)]
    time_ms: Option<i64>,

    /// Extend the search with captures past the nominal depth
    #[arg(long)]
    quiescence: bool,

    /// Play stock centre moves during the first plies
    #[arg(long)]
    opening: bool,

    /// Side the human plays
    #[arg(long, value_enum, default_value = "white")]
    play_as: Side,

    /// Let the engine play both sides for this many plies, then exit
    #[arg(long)]
    selfplay_plies: Option<usize>,

    /// Starting position
    #[arg(long)]
    fen: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    let mut config = EngineConfig::load(args.config.as_deref())
        .context("loading engine configuration")?
        .search;
    if let Some(depth) = args.depth {
        config.depth = depth;
    }
    if let Some(ms) = args.time_ms {
        config.time_budget_ms = ms;
    }
    config.quiescence |= args.quiescence;
    config.opening_heuristic |= args.opening;
    EngineConfig {
        search: config.clone(),
    }
    .validate()?;

    let game = match &args.fen {
        Some(fen) => Game::from_fen(fen).with_context(|| format!("parsing FEN {:?}", fen))?,
        None => Game::new(),
    };

    tracing::info!(
        depth = config.depth,
        quiescence = config.quiescence,
        time_budget_ms = config.time_budget_ms,
        "engine configured"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Some(plies) = args.selfplay_plies {
        let mut session = Session::new(game, config, None);
        session.self_play(plies, &mut out)?;
        return Ok(());
    }

    // The human picks a side; the engine takes the other one.
    let engine_side = args.play_as.color().map(Color::opposite);
    let mut session = Session::new(game, config, engine_side);
    session.run(io::stdin().lock(), &mut out)?;
    Ok(())
}
