use alloc::vec;
use alloc::vec::Vec;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - NotStarted -> Active
/// - Active -> Won
/// - Active -> Lost
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    NotStarted,
    Active,
    Won,
    Lost,
}

impl GameStatus {
    pub const fn is_started(self) -> bool {
        !matches!(self, Self::NotStarted)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for GameStatus {
    fn default() -> Self {
        Self::NotStarted
    }
}

/// Everything a caller needs to redraw after a reveal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevealResult {
    pub outcome: RevealOutcome,
    pub changed: Vec<CellView>,
    pub status: GameStatus,
    pub clock: ClockSignal,
}

/// Everything a caller needs to redraw after a flag toggle.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlagResult {
    pub outcome: MarkOutcome,
    pub cell: CellView,
    pub flags_placed: CellCount,
}

/// One game from the first click to win or loss. Start a new session to reset.
#[derive(Clone, Debug, PartialEq)]
pub struct GameSession {
    mine_layout: MineLayout,
    board: Array2<CellState>,
    revealed_count: CellCount,
    flags_placed: CellCount,
    elapsed_seconds: Seconds,
    status: GameStatus,
    triggered_mine: Option<Coord2>,
}

impl GameSession {
    pub fn new(mine_layout: MineLayout) -> Self {
        let size = mine_layout.size();
        Self {
            mine_layout,
            board: Array2::default(size.to_nd_index()),
            revealed_count: 0,
            flags_placed: 0,
            elapsed_seconds: 0,
            status: Default::default(),
            triggered_mine: None,
        }
    }

    /// Validates `config` and places its mines at random, reproducibly for a given `seed`.
    pub fn new_game(config: GameConfig, seed: u64) -> Result<Self> {
        Self::with_generator(config, RandomMinefieldGenerator::new(seed))
    }

    pub fn with_generator(config: GameConfig, generator: impl MinefieldGenerator) -> Result<Self> {
        let layout = generator.generate(config)?;
        log::debug!("New {}x{} game with {} mines", config.size.0, config.size.1, config.mines);
        Ok(Self::new(layout))
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    pub fn config(&self) -> GameConfig {
        self.mine_layout.game_config()
    }

    pub fn size(&self) -> Coord2 {
        self.mine_layout.size()
    }

    pub fn total_mines(&self) -> CellCount {
        self.mine_layout.mine_count()
    }

    pub fn flags_placed(&self) -> CellCount {
        self.flags_placed
    }

    /// Negative once more flags than mines are placed.
    pub fn mines_left(&self) -> isize {
        (self.mine_layout.mine_count() as isize) - (self.flags_placed as isize)
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count
    }

    pub fn elapsed_seconds(&self) -> Seconds {
        self.elapsed_seconds
    }

    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    pub fn cell_at(&self, coords: Coord2) -> Result<CellState> {
        let coords = self.mine_layout.validate_coords(coords)?;
        Ok(self.board[coords.to_nd_index()])
    }

    pub fn view_at(&self, coords: Coord2) -> Result<CellView> {
        let coords = self.mine_layout.validate_coords(coords)?;
        Ok(self.view(coords))
    }

    /// The whole board in row-major order.
    pub fn views(&self) -> Vec<CellView> {
        let (rows, cols) = self.size();
        (0..rows)
            .flat_map(|row| (0..cols).map(move |col| (row, col)))
            .map(|coords| self.view(coords))
            .collect()
    }

    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealResult> {
        use RevealOutcome::*;

        let coords = self.mine_layout.validate_coords(coords)?;

        if self.status.is_finished() || !self.board[coords.to_nd_index()].is_hidden() {
            return Ok(self.reveal_result(NoChange, Vec::new(), ClockSignal::Unchanged));
        }

        let first_move = !self.status.is_started();
        self.mark_started();

        let mut changed = Vec::new();
        let outcome = if self.mine_layout[coords] {
            self.board[coords.to_nd_index()] = CellState::Revealed;
            changed.push(self.view(coords));
            self.triggered_mine = Some(coords);
            self.reveal_mines(&mut changed);
            self.end_game(false);
            HitMine
        } else {
            self.flood_fill(coords, &mut changed);
            if self.revealed_count == self.mine_layout.safe_cell_count() {
                self.end_game(true);
                Won
            } else {
                Revealed
            }
        };

        let clock = if self.status.is_finished() {
            ClockSignal::Stop
        } else if first_move {
            ClockSignal::Start
        } else {
            ClockSignal::Unchanged
        };
        Ok(self.reveal_result(outcome, changed, clock))
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<FlagResult> {
        use CellState::*;
        use MarkOutcome::*;

        let coords = self.mine_layout.validate_coords(coords)?;

        let outcome = if self.status.is_finished() {
            NoChange
        } else {
            match self.board[coords.to_nd_index()] {
                Hidden => {
                    self.board[coords.to_nd_index()] = Flagged;
                    self.flags_placed += 1;
                    Changed
                }
                Flagged => {
                    self.board[coords.to_nd_index()] = Hidden;
                    self.flags_placed -= 1;
                    Changed
                }
                Revealed => NoChange,
            }
        };

        Ok(FlagResult {
            outcome,
            cell: self.view(coords),
            flags_placed: self.flags_placed,
        })
    }

    /// One second passed; ignored unless the game is active.
    pub fn advance_clock(&mut self) -> Seconds {
        if matches!(self.status, GameStatus::Active) {
            self.elapsed_seconds = self.elapsed_seconds.saturating_add(1);
        }
        self.elapsed_seconds
    }

    /// Drains `ticker` and applies each tick through [`Self::advance_clock`].
    pub fn sync_clock(&mut self, ticker: &mut impl Ticker) -> Seconds {
        for _ in 0..ticker.take_ticks() {
            self.advance_clock();
        }
        self.elapsed_seconds
    }

    /// Iterative; the hidden check doubles as the visited mark, so each cell is revealed at most once.
    fn flood_fill(&mut self, start: Coord2, changed: &mut Vec<CellView>) {
        let mut to_visit = vec![start];

        while let Some(coords) = to_visit.pop() {
            if !self.board[coords.to_nd_index()].is_hidden() || self.mine_layout[coords] {
                continue;
            }

            self.board[coords.to_nd_index()] = CellState::Revealed;
            self.revealed_count += 1;
            changed.push(self.view(coords));

            let adjacent_mines = self.mine_layout.adjacent_mine_count(coords);
            log::trace!("Revealed {:?}, adjacent mines: {}", coords, adjacent_mines);

            // numbered cells bound the region
            if adjacent_mines == 0 {
                to_visit.extend(
                    self.mine_layout
                        .iter_orthogonal(coords)
                        .filter(|&pos| self.board[pos.to_nd_index()].is_hidden()),
                );
            }
        }
    }

    /// Flagged mines are revealed too, the flag count is left as the player set it.
    fn reveal_mines(&mut self, changed: &mut Vec<CellView>) {
        let mines: Vec<Coord2> = self.mine_layout.iter_mines().collect();
        for coords in mines {
            if !self.board[coords.to_nd_index()].is_revealed() {
                self.board[coords.to_nd_index()] = CellState::Revealed;
                changed.push(self.view(coords));
            }
        }
    }

    fn mark_started(&mut self) {
        if matches!(self.status, GameStatus::NotStarted) {
            log::debug!("Game started");
            self.status = GameStatus::Active;
        }
    }

    fn end_game(&mut self, won: bool) {
        if self.status.is_finished() {
            return;
        }

        self.status = if won {
            GameStatus::Won
        } else {
            GameStatus::Lost
        };
        log::debug!(
            "Game ended: {:?} after {}s, {} cells revealed",
            self.status,
            self.elapsed_seconds,
            self.revealed_count
        );
    }

    fn view(&self, coords: Coord2) -> CellView {
        let state = self.board[coords.to_nd_index()];
        let (is_mine, adjacent_mines) = if state.is_revealed() {
            let is_mine = self.mine_layout[coords];
            let adjacent = (!is_mine).then(|| self.mine_layout.adjacent_mine_count(coords));
            (Some(is_mine), adjacent)
        } else {
            (None, None)
        };

        CellView {
            row: coords.0,
            col: coords.1,
            state,
            is_mine,
            adjacent_mines,
        }
    }

    fn reveal_result(
        &self,
        outcome: RevealOutcome,
        changed: Vec<CellView>,
        clock: ClockSignal,
    ) -> RevealResult {
        RevealResult {
            outcome,
            changed,
            status: self.status,
            clock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(size: Coord2, mines: &[Coord2]) -> GameSession {
        GameSession::new(MineLayout::from_mine_coords(size, mines).unwrap())
    }

    fn state(session: &GameSession, coords: Coord2) -> CellState {
        session.cell_at(coords).unwrap()
    }

    #[test]
    fn new_game_rejects_invalid_configuration() {
        for (size, mines) in [((0, 9), 1), ((9, 0), 1), ((3, 3), 0), ((3, 3), 9), ((2, 2), 10)] {
            assert_eq!(
                GameSession::new_game(GameConfig::new_unchecked(size, mines), 0),
                Err(GameError::InvalidConfiguration {
                    rows: size.0,
                    cols: size.1,
                    mines
                })
            );
        }
    }

    #[test]
    fn new_game_starts_hidden_and_idle() {
        let session = GameSession::new_game(Difficulty::Easy.config(), 5).unwrap();

        assert_eq!(session.status(), GameStatus::NotStarted);
        assert_eq!(session.flags_placed(), 0);
        assert_eq!(session.elapsed_seconds(), 0);
        assert_eq!(session.total_mines(), 10);
        assert!(session.views().iter().all(|view| view.state == CellState::Hidden
            && view.is_mine.is_none()
            && view.adjacent_mines.is_none()));
    }

    #[test]
    fn first_reveal_on_default_board_activates() {
        let config = GameConfig::new((9, 9), 10).unwrap();
        let mut session = GameSession::new_game(config, 1234).unwrap();

        let result = session.reveal((4, 4)).unwrap();

        assert_ne!(result.status, GameStatus::NotStarted);
        assert!(!result.changed.is_empty());
        assert!(result.outcome.has_update());
        if result.status == GameStatus::Active {
            assert_eq!(result.clock, ClockSignal::Start);
        } else {
            assert_eq!(result.clock, ClockSignal::Stop);
        }
    }

    #[test]
    fn single_safe_cell_wins_immediately() {
        let mut session = session((1, 2), &[(0, 0)]);

        let result = session.reveal((0, 1)).unwrap();

        assert_eq!(result.outcome, RevealOutcome::Won);
        assert_eq!(result.status, GameStatus::Won);
        assert_eq!(result.clock, ClockSignal::Stop);
        assert_eq!(state(&session, (0, 0)), CellState::Hidden);
        assert_eq!(
            result.changed,
            [CellView {
                row: 0,
                col: 1,
                state: CellState::Revealed,
                is_mine: Some(false),
                adjacent_mines: Some(1),
            }]
        );
    }

    #[test]
    fn win_triggers_on_last_safe_reveal() {
        let mut session = session((3, 3), &[(0, 0)]);

        for coords in [(0, 1), (1, 0), (1, 1)] {
            let result = session.reveal(coords).unwrap();
            assert_eq!(result.outcome, RevealOutcome::Revealed);
            assert_eq!(result.status, GameStatus::Active);
            assert_eq!(result.changed.len(), 1);
        }
        assert_eq!(session.revealed_count(), 3);

        let result = session.reveal((2, 2)).unwrap();
        assert_eq!(result.outcome, RevealOutcome::Won);
        assert_eq!(result.changed.len(), 5);
        assert_eq!(session.revealed_count(), 8);
        assert_eq!(state(&session, (0, 0)), CellState::Hidden);
    }

    #[test]
    fn numbered_cells_win_one_by_one() {
        let mut session = session((1, 3), &[(0, 1)]);

        assert_eq!(session.reveal((0, 0)).unwrap().status, GameStatus::Active);
        assert_eq!(session.reveal((0, 2)).unwrap().status, GameStatus::Won);
    }

    #[test]
    fn flood_fill_wraps_around_numbered_cells() {
        let mut session = session((3, 3), &[(0, 2)]);

        let result = session.reveal((0, 0)).unwrap();

        assert_eq!(result.outcome, RevealOutcome::Won);
        assert_eq!(result.changed.len(), 8);
        assert_eq!(session.view_at((1, 1)).unwrap().adjacent_mines, Some(1));
        assert_eq!(session.view_at((2, 2)).unwrap().adjacent_mines, Some(0));
        assert_eq!(state(&session, (0, 2)), CellState::Hidden);
    }

    #[test]
    fn flood_fill_does_not_spread_diagonally() {
        let mut session = session((4, 4), &[(0, 2), (2, 0)]);

        let result = session.reveal((0, 0)).unwrap();

        assert_eq!(result.outcome, RevealOutcome::Revealed);
        let mut opened: Vec<_> = result.changed.iter().map(|view| (view.row, view.col)).collect();
        opened.sort();
        assert_eq!(opened, [(0, 0), (0, 1), (1, 0)]);
        assert_eq!(session.view_at((0, 1)).unwrap().adjacent_mines, Some(1));
        assert_eq!(state(&session, (1, 1)), CellState::Hidden);
    }

    #[test]
    fn flags_stop_the_flood() {
        let mut session = session((1, 5), &[(0, 0)]);
        session.toggle_flag((0, 3)).unwrap();

        let result = session.reveal((0, 4)).unwrap();

        assert_eq!(result.changed.len(), 1);
        assert_eq!(state(&session, (0, 3)), CellState::Flagged);
        assert_eq!(state(&session, (0, 2)), CellState::Hidden);
        assert_eq!(result.status, GameStatus::Active);
    }

    #[test]
    fn hitting_a_mine_reveals_every_mine_only() {
        let mut session = session((3, 3), &[(0, 0), (2, 2)]);
        session.reveal((1, 1)).unwrap();
        session.toggle_flag((2, 2)).unwrap();

        let result = session.reveal((0, 0)).unwrap();

        assert_eq!(result.outcome, RevealOutcome::HitMine);
        assert_eq!(result.status, GameStatus::Lost);
        assert_eq!(result.clock, ClockSignal::Stop);
        assert_eq!(session.triggered_mine(), Some((0, 0)));
        assert_eq!(result.changed.len(), 2);
        assert!(result.changed.iter().all(CellView::is_mine));
        assert_eq!(state(&session, (2, 2)), CellState::Revealed);
        assert_eq!(state(&session, (1, 1)), CellState::Revealed);
        for coords in [(0, 1), (0, 2), (1, 0), (1, 2), (2, 0), (2, 1)] {
            assert_eq!(state(&session, coords), CellState::Hidden);
        }
        assert_eq!(session.flags_placed(), 1);
    }

    #[test]
    fn moves_after_game_end_are_no_ops() {
        let mut session = session((2, 2), &[(0, 0)]);
        session.reveal((0, 0)).unwrap();
        let before = session.clone();

        let result = session.reveal((1, 1)).unwrap();
        assert_eq!(result.outcome, RevealOutcome::NoChange);
        assert!(result.changed.is_empty());
        assert_eq!(result.status, GameStatus::Lost);

        let flag = session.toggle_flag((1, 1)).unwrap();
        assert_eq!(flag.outcome, MarkOutcome::NoChange);
        assert_eq!(flag.cell.state, CellState::Hidden);

        assert_eq!(session, before);
    }

    #[test]
    fn revealing_revealed_or_flagged_cell_is_no_op() {
        let mut session = session((1, 4), &[(0, 2)]);
        session.reveal((0, 0)).unwrap();
        session.toggle_flag((0, 2)).unwrap();

        let again = session.reveal((0, 0)).unwrap();
        assert_eq!(again.outcome, RevealOutcome::NoChange);
        assert_eq!(again.clock, ClockSignal::Unchanged);

        let flagged = session.reveal((0, 2)).unwrap();
        assert_eq!(flagged.outcome, RevealOutcome::NoChange);
        assert_eq!(session.status(), GameStatus::Active);
    }

    #[test]
    fn flag_round_trip_restores_state() {
        let mut session = session((3, 3), &[(1, 1)]);

        let flagged = session.toggle_flag((0, 0)).unwrap();
        assert_eq!(flagged.outcome, MarkOutcome::Changed);
        assert_eq!(flagged.cell.state, CellState::Flagged);
        assert_eq!(flagged.flags_placed, 1);

        let cleared = session.toggle_flag((0, 0)).unwrap();
        assert_eq!(cleared.cell.state, CellState::Hidden);
        assert_eq!(cleared.flags_placed, 0);
        assert_eq!(session.status(), GameStatus::NotStarted);
    }

    #[test]
    fn flags_are_not_capped_by_mine_count() {
        let mut session = session((3, 3), &[(1, 1)]);

        for coords in [(0, 0), (0, 1), (0, 2), (1, 0), (1, 2)] {
            session.toggle_flag(coords).unwrap();
        }

        assert_eq!(session.flags_placed(), 5);
        assert_eq!(session.mines_left(), -4);
    }

    #[test]
    fn cannot_flag_revealed_cell() {
        let mut session = session((1, 4), &[(0, 2)]);
        session.reveal((0, 0)).unwrap();
        assert_eq!(session.status(), GameStatus::Active);

        let result = session.toggle_flag((0, 0)).unwrap();

        assert_eq!(result.outcome, MarkOutcome::NoChange);
        assert_eq!(result.flags_placed, 0);
        assert_eq!(result.cell.adjacent_mines, Some(0));
    }

    #[test]
    fn out_of_bounds_is_an_error() {
        let mut session = session((2, 3), &[(0, 0)]);

        assert_eq!(
            session.reveal((2, 0)),
            Err(GameError::OutOfBounds { row: 2, col: 0 })
        );
        assert_eq!(
            session.toggle_flag((0, 3)),
            Err(GameError::OutOfBounds { row: 0, col: 3 })
        );
        assert!(session.view_at((5, 5)).is_err());
        assert_eq!(session.status(), GameStatus::NotStarted);
    }

    #[test]
    fn clock_runs_only_while_active() {
        let mut session = session((1, 3), &[(0, 1)]);
        let mut ticker = ManualTicker::new();

        assert_eq!(session.advance_clock(), 0);

        let result = session.reveal((0, 0)).unwrap();
        ticker.apply(result.clock);
        ticker.advance(3);
        assert_eq!(session.sync_clock(&mut ticker), 3);
        assert_eq!(session.advance_clock(), 4);

        let result = session.reveal((0, 2)).unwrap();
        assert_eq!(result.status, GameStatus::Won);
        ticker.apply(result.clock);
        ticker.advance(10);
        assert_eq!(session.sync_clock(&mut ticker), 4);
        assert_eq!(session.advance_clock(), 4);
    }

    #[test]
    fn late_ticks_after_loss_are_dropped() {
        let mut session = session((2, 2), &[(1, 1)]);
        let mut ticker = ManualTicker::new();
        ticker.apply(session.reveal((0, 0)).unwrap().clock);
        ticker.advance(2);

        // the ticker fires after the losing move but before the caller stops it
        session.reveal((1, 1)).unwrap();
        assert_eq!(session.sync_clock(&mut ticker), 0);
        assert_eq!(session.elapsed_seconds(), 0);
    }

    #[test]
    fn views_serialize_for_callers() {
        let mut session = session((1, 2), &[(0, 0)]);
        let result = session.reveal((0, 1)).unwrap();

        let json = serde_json::to_string(&result.changed[0]).unwrap();

        assert_eq!(
            json,
            r#"{"row":0,"col":1,"state":"Revealed","is_mine":false,"adjacent_mines":1}"#
        );
    }
}
