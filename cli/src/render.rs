use sweeper_core::{CellState, CellView, GameSession, GameStatus, format_elapsed};

pub const WIN_MESSAGE: &str = "You've cleared the board.";
pub const LOSS_MESSAGE: &str = "Sorry, try again.";

pub fn cell_char(view: &CellView) -> char {
    match (view.state, view.is_mine, view.adjacent_mines) {
        (CellState::Hidden, _, _) => '#',
        (CellState::Flagged, _, _) => 'F',
        (CellState::Revealed, Some(true), _) => '*',
        (CellState::Revealed, _, Some(0) | None) => '.',
        (CellState::Revealed, _, Some(count)) => char::from(b'0' + count),
    }
}

pub fn status_line(session: &GameSession) -> String {
    format!(
        "Bombs:{}  Flags:{}  {}",
        session.total_mines(),
        session.flags_placed(),
        format_elapsed(session.elapsed_seconds())
    )
}

/// Header, column ruler (last digit of each index), then one line per row.
pub fn render_board(session: &GameSession) -> String {
    let (_, cols) = session.size();
    let mut out = status_line(session);
    out.push('\n');

    out.push_str("    ");
    for col in 0..cols {
        out.push_str(&format!("{} ", col % 10));
    }
    out.push('\n');

    for view in &session.views() {
        if view.col == 0 {
            out.push_str(&format!("{:>3} ", view.row));
        }
        out.push(cell_char(view));
        out.push(if view.col + 1 == cols { '\n' } else { ' ' });
    }

    match session.status() {
        GameStatus::Won => {
            out.push_str(WIN_MESSAGE);
            out.push('\n');
        }
        GameStatus::Lost => {
            out.push_str(LOSS_MESSAGE);
            out.push('\n');
        }
        GameStatus::NotStarted | GameStatus::Active => {}
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweeper_core::MineLayout;

    fn session(size: (u8, u8), mines: &[(u8, u8)]) -> GameSession {
        GameSession::new(MineLayout::from_mine_coords(size, mines).unwrap())
    }

    #[test]
    fn fresh_board_is_all_hidden() {
        let session = session((2, 3), &[(0, 0)]);

        assert_eq!(
            render_board(&session),
            "Bombs:1  Flags:0  00:00\n    0 1 2 \n  0 # # #\n  1 # # #\n"
        );
    }

    #[test]
    fn shows_numbers_flags_and_win_message() {
        let mut session = session((1, 4), &[(0, 3)]);
        session.toggle_flag((0, 3)).unwrap();
        session.reveal((0, 0)).unwrap();

        assert_eq!(
            render_board(&session),
            "Bombs:1  Flags:1  00:00\n    0 1 2 3 \n  0 . . 1 F\nYou've cleared the board.\n"
        );
    }

    #[test]
    fn shows_all_mines_after_loss() {
        let mut session = session((1, 3), &[(0, 0), (0, 2)]);
        session.reveal((0, 2)).unwrap();

        let board = render_board(&session);

        assert!(board.contains("  0 * # *\n"));
        assert!(board.ends_with(&format!("{LOSS_MESSAGE}\n")));
    }
}
