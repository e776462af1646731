use std::io;

use anyhow::Context;
use clap::Parser;
use sweeper_core::{CellCount, Coord, Difficulty, GameConfig};
use web_time::{SystemTime, UNIX_EPOCH};

use app::{App, OutputMode};

mod app;
mod command;
mod render;

#[derive(Parser, Debug)]
#[command(version, about = "Minesweeper in the terminal", long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Board preset: easy, medium or hard
    #[arg(short, long, default_value_t = Difficulty::Easy)]
    difficulty: Difficulty,

    /// Override the preset's row count
    #[arg(long)]
    rows: Option<Coord>,

    /// Override the preset's column count
    #[arg(long)]
    cols: Option<Coord>,

    /// Override the preset's mine count
    #[arg(long)]
    mines: Option<CellCount>,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// Print one JSON event per line instead of drawing the board
    #[arg(long)]
    json: bool,
}

impl Args {
    fn game_config(&self) -> sweeper_core::Result<GameConfig> {
        let preset = self.difficulty.config();
        GameConfig::new(
            (
                self.rows.unwrap_or(preset.rows()),
                self.cols.unwrap_or(preset.cols()),
            ),
            self.mines.unwrap_or(preset.mines),
        )
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let config = args.game_config().context("Could not set up the board")?;
    let seed = args.seed.unwrap_or_else(clock_seed);
    log::debug!("seed: {}", seed);

    let mode = if args.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };
    let mut app = App::new(config, seed, mode)?;
    app.run(io::stdin().lock(), io::stdout().lock())
}
