use ndarray::Array2;

/// Single coordinate axis used for board rows, columns, and positions.
pub type Coord = u8;

/// Count type used for mine counts, flag counts, and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional coordinates `(row, col)`.
pub type Coord2 = (Coord, Coord);

/// Whole seconds on the game clock.
pub type Seconds = u32;

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

pub trait NeighborIterExt {
    /// The up-to-8 cells around `index`.
    fn iter_neighbors(&self, index: Coord2) -> NeighborIter;

    /// The up-to-4 cells sharing an edge with `index`.
    fn iter_orthogonal(&self, index: Coord2) -> NeighborIter;
}

impl<T> NeighborIterExt for Array2<T> {
    fn iter_neighbors(&self, index: Coord2) -> NeighborIter {
        NeighborIter::moore(index, array_bounds(self))
    }

    fn iter_orthogonal(&self, index: Coord2) -> NeighborIter {
        NeighborIter::orthogonal(index, array_bounds(self))
    }
}

/// Boards never exceed `Coord::MAX` on either axis, `GameConfig` guarantees it.
fn array_bounds<T>(array: &Array2<T>) -> Coord2 {
    let (rows, cols) = array.dim();
    (
        rows.try_into().unwrap_or(Coord::MAX),
        cols.try_into().unwrap_or(Coord::MAX),
    )
}

const MOORE: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

// up, down, left, right
const ORTHOGONAL: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Offsets `coords` by `delta`, `None` when the result leaves `bounds`.
fn step(coords: Coord2, delta: (i8, i8), bounds: Coord2) -> Option<Coord2> {
    let row = coords.0.checked_add_signed(delta.0).filter(|&row| row < bounds.0)?;
    let col = coords.1.checked_add_signed(delta.1).filter(|&col| col < bounds.1)?;
    Some((row, col))
}

#[derive(Debug)]
pub struct NeighborIter {
    center: Coord2,
    bounds: Coord2,
    deltas: &'static [(i8, i8)],
    index: u8,
}

impl NeighborIter {
    pub fn moore(center: Coord2, bounds: Coord2) -> Self {
        Self::new(center, bounds, &MOORE)
    }

    pub fn orthogonal(center: Coord2, bounds: Coord2) -> Self {
        Self::new(center, bounds, &ORTHOGONAL)
    }

    fn new(center: Coord2, bounds: Coord2, deltas: &'static [(i8, i8)]) -> Self {
        Self {
            center,
            bounds,
            deltas,
            index: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let delta = *self.deltas.get(usize::from(self.index))?;
            self.index += 1;

            let next_item = step(self.center, delta, self.bounds);
            if next_item.is_some() {
                return next_item;
            }
        }
    }
}
