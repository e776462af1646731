use thiserror::Error;

use crate::{CellCount, Coord};

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid configuration: {rows}x{cols} board cannot hold {mines} mines")]
    InvalidConfiguration {
        rows: Coord,
        cols: Coord,
        mines: CellCount,
    },
    #[error("Coordinates ({row}, {col}) are outside the board")]
    OutOfBounds { row: Coord, col: Coord },
}

pub type Result<T> = core::result::Result<T, GameError>;
