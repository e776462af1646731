use serde::{Deserialize, Serialize};

use crate::Coord;

/// Canonical player-visible state of one cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    Hidden,
    Revealed,
    Flagged,
}

impl CellState {
    pub const fn is_hidden(self) -> bool {
        matches!(self, Self::Hidden)
    }

    pub const fn is_revealed(self) -> bool {
        matches!(self, Self::Revealed)
    }
}

impl Default for CellState {
    fn default() -> Self {
        Self::Hidden
    }
}

/// What a caller may know about one cell.
///
/// `is_mine` is only disclosed for revealed cells, `adjacent_mines` only for revealed safe cells.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellView {
    pub row: Coord,
    pub col: Coord,
    pub state: CellState,
    pub is_mine: Option<bool>,
    pub adjacent_mines: Option<u8>,
}

impl CellView {
    pub const fn is_mine(&self) -> bool {
        matches!(self.is_mine, Some(true))
    }
}
