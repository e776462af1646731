use super::*;

/// Uniform placement by rejection sampling: draw any cell, retry when it already holds a mine.
///
/// `GameConfig` keeps at least one safe cell, so the expected number of draws stays linear in the mine count.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomMinefieldGenerator {
    seed: u64,
}

impl RandomMinefieldGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl MinefieldGenerator for RandomMinefieldGenerator {
    fn generate(self, config: GameConfig) -> Result<MineLayout> {
        use rand::prelude::*;

        // reject unchecked configs before sampling, a full board would never terminate
        let config = GameConfig::new(config.size, config.mines)?;
        let (rows, cols) = config.size;
        let mut mine_mask: Array2<bool> = Array2::default(config.size.to_nd_index());
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut mines_placed: CellCount = 0;
        let mut draws: u32 = 0;

        while mines_placed < config.mines {
            let coords: Coord2 = (rng.random_range(0..rows), rng.random_range(0..cols));
            draws += 1;
            let cell = &mut mine_mask[coords.to_nd_index()];
            if !*cell {
                *cell = true;
                mines_placed += 1;
            }
        }
        log::debug!(
            "Placed {} mines on {}x{} in {} draws (seed {})",
            mines_placed,
            rows,
            cols,
            draws,
            self.seed
        );

        MineLayout::from_mine_mask(mine_mask)
    }
}
