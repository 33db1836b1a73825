// Rust-upgrade (https://github.com/rust-lang/rust/issues/46379):
//   remove `#[allow(dead_code)]` before public functions.

use chess_session::board::{Board, TurnInput};
use chess_session::coord::{Col, Coord, Row};
use chess_session::grid::Grid;
use chess_session::piece::{PieceOnBoard, piece_from_ascii};
use chess_session::role::Force;
use chess_session::util::as_single_char;
use enum_map::enum_map;
use itertools::Itertools;


pub trait AutoTurnInput {
    fn to_turn_input(self) -> TurnInput;
}

impl AutoTurnInput for &str {
    fn to_turn_input(self) -> TurnInput { TurnInput::Algebraic(self.to_owned()) }
}

impl AutoTurnInput for TurnInput {
    fn to_turn_input(self) -> TurnInput { self }
}

#[macro_export]
macro_rules! drag_move {
    ($from:ident -> $to:ident) => {
        chess_session::board::TurnInput::DragDrop {
            from: stringify!($from).to_owned(),
            to: stringify!($to).to_owned(),
            promotion: None,
        }
    };
    ($from:ident -> $to:ident = $promotion:ident) => {
        chess_session::board::TurnInput::DragDrop {
            from: stringify!($from).to_owned(),
            to: stringify!($to).to_owned(),
            promotion: Some(stringify!($promotion).to_owned()),
        }
    };
}

#[allow(dead_code)]
pub fn algebraic_turn(algebraic: &str) -> TurnInput { TurnInput::Algebraic(algebraic.to_owned()) }

// Parses a board drawn row by row from the 8th rank down, "." for an empty square. Castling is
// not allowed on the resulting board.
#[allow(dead_code)]
pub fn parse_board(active_force: Force, board_str: &str) -> Result<Board, String> {
    let rows = board_str
        .split('\n')
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(|line| line.split_ascii_whitespace().collect_vec())
        .collect_vec();
    assert_eq!(rows.len(), 8);
    assert!(rows.iter().all(|row| row.len() == 8));
    let mut grid = Grid::new();
    for (row_idx, row) in rows.iter().rev().enumerate() {
        for (col_idx, piece_str) in row.iter().enumerate() {
            let piece_char =
                as_single_char(piece_str).ok_or_else(|| format!("Invalid piece: {}", piece_str))?;
            let coord =
                Coord::new(Row::from_zero_based(row_idx as u8), Col::from_zero_based(col_idx as u8));
            grid[coord] = if piece_char == '.' {
                None
            } else {
                let (kind, force) = piece_from_ascii(piece_char)
                    .ok_or_else(|| format!("Invalid piece: {}", piece_char))?;
                Some(PieceOnBoard::new(kind, force))
            };
        }
    }
    let castling_rights = enum_map! { _ => enum_map! { _ => false } };
    Ok(Board::new_from_parts(grid, active_force, castling_rights, None, 0, 1))
}


#[cfg(test)]
mod tests {
    use chess_session::fen::board_to_fen;
    use chess_session::test_util::replay_chess_log;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_board_opening() {
        let board_str = "
            r n b q k b n r
            p p p . p p p p
            . . . . . . . .
            . . . p . . . .
            . . . . P . . .
            . . . . . . . .
            P P P P . P P P
            R N B Q K B N R
        ";
        let board = parse_board(Force::White, board_str).unwrap();
        let mut expected = Board::new();
        replay_chess_log(&mut expected, "1.e4 d5").unwrap();
        assert_eq!(board.grid(), expected.grid());
        assert_eq!(
            board_to_fen(&board),
            "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w - - 0 1"
        );
    }
}
