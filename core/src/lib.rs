#![no_std]

extern crate alloc;

use core::fmt;
use core::ops::Index;
use core::str::FromStr;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use clock::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use tile::*;
pub use types::*;

mod clock;
mod engine;
mod error;
mod generator;
mod tile;
mod types;

/// Validated board dimensions and mine count.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    /// Accepts a board only when it has at least one cell, at least one mine, and at least one safe cell.
    pub fn new((rows, cols): Coord2, mines: CellCount) -> Result<Self> {
        let total = mult(rows, cols);
        if rows == 0 || cols == 0 || mines == 0 || mines >= total {
            return Err(GameError::InvalidConfiguration { rows, cols, mines });
        }
        Ok(Self::new_unchecked((rows, cols), mines))
    }

    pub const fn rows(&self) -> Coord {
        self.size.0
    }

    pub const fn cols(&self) -> Coord {
        self.size.1
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    pub const fn safe_cells(&self) -> CellCount {
        self.total_cells() - self.mines
    }
}

/// Named board presets offered to players.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Self::Easy, Self::Medium, Self::Hard];

    pub const fn config(self) -> GameConfig {
        match self {
            Self::Easy => GameConfig::new_unchecked((9, 9), 10),
            Self::Medium => GameConfig::new_unchecked((14, 14), 40),
            Self::Hard => GameConfig::new_unchecked((18, 18), 60),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
#[error("Unknown difficulty, expected one of: easy, medium, hard")]
pub struct ParseDifficultyError;

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|difficulty| difficulty.name().eq_ignore_ascii_case(s.trim()))
            .ok_or(ParseDifficultyError)
    }
}

/// Where the mines are, plus the adjacency counts derived from them once.
///
/// Serialized as the bare mine mask; deserializing goes back through [`MineLayout::from_mine_mask`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Array2<bool>", into = "Array2<bool>")]
pub struct MineLayout {
    mine_mask: Array2<bool>,
    adjacent: Array2<u8>,
    config: GameConfig,
}

impl MineLayout {
    pub fn from_mine_mask(mine_mask: Array2<bool>) -> Result<Self> {
        let (rows, cols) = mine_mask.dim();
        let size: Coord2 = (
            rows.try_into().unwrap_or(Coord::MAX),
            cols.try_into().unwrap_or(Coord::MAX),
        );
        let mines = mine_mask
            .iter()
            .filter(|&&is_mine| is_mine)
            .count()
            .try_into()
            .unwrap_or(CellCount::MAX);

        if usize::from(size.0) != rows || usize::from(size.1) != cols {
            return Err(GameError::InvalidConfiguration {
                rows: size.0,
                cols: size.1,
                mines,
            });
        }
        let config = GameConfig::new(size, mines)?;

        let adjacent = Array2::from_shape_fn(mine_mask.dim(), |(row, col)| {
            // `dim` fits in `Coord`, checked above
            let coords = (row as Coord, col as Coord);
            if mine_mask[coords.to_nd_index()] {
                0
            } else {
                mine_mask
                    .iter_neighbors(coords)
                    .filter(|&pos| mine_mask[pos.to_nd_index()])
                    .count() as u8
            }
        });

        Ok(Self {
            mine_mask,
            adjacent,
            config,
        })
    }

    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());

        for &(row, col) in mine_coords {
            if row >= size.0 || col >= size.1 {
                return Err(GameError::OutOfBounds { row, col });
            }
            mine_mask[(row, col).to_nd_index()] = true;
        }

        Self::from_mine_mask(mine_mask)
    }

    pub fn game_config(&self) -> GameConfig {
        self.config
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::OutOfBounds {
                row: coords.0,
                col: coords.1,
            })
        }
    }

    pub fn size(&self) -> Coord2 {
        self.config.size
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.config.safe_cells()
    }

    pub fn mine_count(&self) -> CellCount {
        self.config.mines
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self[coords]
    }

    /// Number of mines among the up-to-8 neighbors; always 0 for a mine cell.
    pub fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        self.adjacent[coords.to_nd_index()]
    }

    /// All mine coordinates in row-major order.
    pub fn iter_mines(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.mine_mask
            .indexed_iter()
            .filter(|&(_, &is_mine)| is_mine)
            .map(|((row, col), _)| (row as Coord, col as Coord))
    }

    pub(crate) fn iter_orthogonal(&self, coords: Coord2) -> NeighborIter {
        self.mine_mask.iter_orthogonal(coords)
    }
}

impl TryFrom<Array2<bool>> for MineLayout {
    type Error = GameError;

    fn try_from(mine_mask: Array2<bool>) -> Result<Self> {
        Self::from_mine_mask(mine_mask)
    }
}

impl From<MineLayout> for Array2<bool> {
    fn from(layout: MineLayout) -> Self {
        layout.mine_mask
    }
}

impl Index<Coord2> for MineLayout {
    type Output = bool;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.mine_mask[coords.to_nd_index()]
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            Revealed => true,
            HitMine => true,
            Won => true,
        }
    }
}
