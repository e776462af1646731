use sweeper_core::{Coord, Coord2};
use thiserror::Error;

pub const USAGE: &str = "commands: r ROW COL (reveal), f ROW COL (flag), n (new game), q (quit)";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Reveal(Coord2),
    Flag(Coord2),
    NewGame,
    Quit,
    Help,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseCommandError {
    #[error("unknown command `{0}`")]
    Unknown(String),
    #[error("`{0}` expects a row and a column")]
    MissingCoords(String),
    #[error("`{0}` is not a valid coordinate")]
    BadCoord(String),
    #[error("too many arguments")]
    TrailingInput,
}

/// Parses one input line, `None` for blank lines.
pub fn parse_line(line: &str) -> Result<Option<Command>, ParseCommandError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "r" | "reveal" => Command::Reveal(parse_coords(verb, &mut words)?),
        "f" | "flag" => Command::Flag(parse_coords(verb, &mut words)?),
        "n" | "new" => Command::NewGame,
        "q" | "quit" | "exit" => Command::Quit,
        "h" | "help" | "?" => Command::Help,
        _ => return Err(ParseCommandError::Unknown(verb.to_string())),
    };

    if words.next().is_some() {
        return Err(ParseCommandError::TrailingInput);
    }
    Ok(Some(command))
}

fn parse_coords<'a>(
    verb: &str,
    words: &mut impl Iterator<Item = &'a str>,
) -> Result<Coord2, ParseCommandError> {
    let mut next = || {
        let word = words
            .next()
            .ok_or_else(|| ParseCommandError::MissingCoords(verb.to_string()))?;
        word.parse::<Coord>()
            .map_err(|_| ParseCommandError::BadCoord(word.to_string()))
    };
    let row = next()?;
    let col = next()?;
    Ok((row, col))
}
