use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use serde::Serialize;
use sweeper_core::*;

use crate::command::{self, Command, USAGE};
use crate::render;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    Json,
}

/// One JSON line per event in `OutputMode::Json`.
#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Event<'a> {
    NewGame {
        config: GameConfig,
        seed: u64,
    },
    Reveal {
        result: &'a RevealResult,
        elapsed_seconds: Seconds,
    },
    Flag {
        result: &'a FlagResult,
        elapsed_seconds: Seconds,
    },
    Error {
        message: String,
    },
}

/// Terminal caller: owns the current session and the tick source feeding it.
pub struct App<T: Ticker = InstantTicker> {
    config: GameConfig,
    seed: u64,
    session: GameSession,
    ticker: T,
    mode: OutputMode,
}

impl App<InstantTicker> {
    pub fn new(config: GameConfig, seed: u64, mode: OutputMode) -> Result<Self> {
        let session = GameSession::new_game(config, seed)?;
        Ok(Self::with_session(session, seed, InstantTicker::new(), mode))
    }
}

impl<T: Ticker> App<T> {
    pub fn with_session(session: GameSession, seed: u64, ticker: T, mode: OutputMode) -> Self {
        Self {
            config: session.config(),
            seed,
            session,
            ticker,
            mode,
        }
    }

    pub fn run(&mut self, input: impl BufRead, mut output: impl Write) -> Result<()> {
        if self.mode == OutputMode::Text {
            writeln!(output, "{USAGE}")?;
        }
        self.announce_new_game(&mut output)?;

        for line in input.lines() {
            let line = line.context("Failed to read command")?;
            match command::parse_line(&line) {
                Ok(None) => continue,
                Ok(Some(Command::Quit)) => break,
                Ok(Some(command)) => self.handle(command, &mut output)?,
                Err(err) => self.report(&mut output, format!("{err}; {USAGE}"))?,
            }
            output.flush().context("Failed to write output")?;
        }
        Ok(())
    }

    fn handle(&mut self, command: Command, output: &mut impl Write) -> Result<()> {
        // ticks that arrived before this move still count toward the running game
        self.session.sync_clock(&mut self.ticker);

        match command {
            Command::Reveal(coords) => match self.session.reveal(coords) {
                Ok(result) => {
                    self.ticker.apply(result.clock);
                    log::debug!(
                        "reveal {:?}: {:?}, {} changed",
                        coords,
                        result.outcome,
                        result.changed.len()
                    );
                    if !self.needs_redraw(result.outcome.has_update()) {
                        return Ok(());
                    }
                    self.emit(output, Event::Reveal {
                        result: &result,
                        elapsed_seconds: self.session.elapsed_seconds(),
                    })
                }
                Err(err) => self.report(output, err.to_string()),
            },
            Command::Flag(coords) => match self.session.toggle_flag(coords) {
                Ok(result) => {
                    log::debug!("flag {:?}: {:?}", coords, result.outcome);
                    if !self.needs_redraw(result.outcome.has_update()) {
                        return Ok(());
                    }
                    self.emit(output, Event::Flag {
                        result: &result,
                        elapsed_seconds: self.session.elapsed_seconds(),
                    })
                }
                Err(err) => self.report(output, err.to_string()),
            },
            Command::NewGame => {
                self.seed = self.seed.wrapping_add(1);
                self.session = GameSession::new_game(self.config, self.seed)?;
                self.ticker.apply(ClockSignal::Stop);
                self.announce_new_game(output)
            }
            Command::Help => {
                writeln!(output, "{USAGE}")?;
                Ok(())
            }
            Command::Quit => Ok(()),
        }
    }

    /// Text mode skips the redraw when a move changed nothing; JSON mode reports every move.
    fn needs_redraw(&self, has_update: bool) -> bool {
        has_update || self.mode == OutputMode::Json
    }

    fn announce_new_game(&self, output: &mut impl Write) -> Result<()> {
        log::info!("New game {:?} with seed {}", self.config, self.seed);
        self.emit(output, Event::NewGame {
            config: self.config,
            seed: self.seed,
        })
    }

    fn report(&self, output: &mut impl Write, message: String) -> Result<()> {
        log::warn!("{message}");
        self.emit(output, Event::Error { message })
    }

    /// Text mode redraws the whole board after every event.
    fn emit(&self, output: &mut impl Write, event: Event<'_>) -> Result<()> {
        match self.mode {
            OutputMode::Json => {
                serde_json::to_writer(&mut *output, &event).context("Failed to encode event")?;
                writeln!(output)?;
            }
            OutputMode::Text => {
                if let Event::Error { message } = &event {
                    writeln!(output, "error: {message}")?;
                } else {
                    write!(output, "{}", render::render_board(&self.session))?;
                }
            }
        }
        Ok(())
    }
}
