// Improvement potential: Accept Shredder-FEN / X-FEN castling notation ("HAha").

use enum_map::enum_map;
use itertools::Itertools;
use strum::IntoEnumIterator;

use crate::board::{Board, CastlingRights};
use crate::coord::{Col, Coord, NUM_COLS, NUM_ROWS, Row};
use crate::grid::Grid;
use crate::piece::{CastleDirection, PieceKind, PieceOnBoard, piece_from_ascii, piece_to_ascii};
use crate::role::Force;
use crate::util::as_single_char;


pub const CLASSIC_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

fn force_to_fen(force: Force) -> char {
    match force {
        Force::White => 'w',
        Force::Black => 'b',
    }
}
fn force_from_fen(s: &str) -> Result<Force, String> {
    let ch = as_single_char(s).ok_or_else(|| format!("invalid force: {}", s))?;
    match ch {
        'w' => Ok(Force::White),
        'b' => Ok(Force::Black),
        _ => Err(format!("invalid force: {}", ch)),
    }
}

fn castling_to_fen(force: Force, dir: CastleDirection) -> char {
    let kind = match dir {
        CastleDirection::ASide => PieceKind::Queen,
        CastleDirection::HSide => PieceKind::King,
    };
    piece_to_ascii(kind, force)
}

fn castling_rights_to_fen(castling_rights: &CastlingRights) -> String {
    let mut s = String::new();
    for force in Force::iter() {
        for dir in CastleDirection::iter().rev() {
            if castling_rights[force][dir] {
                s.push(castling_to_fen(force, dir));
            }
        }
    }
    if s.is_empty() { "-".to_owned() } else { s }
}
fn castling_rights_from_fen(s: &str) -> Result<CastlingRights, String> {
    let mut castling_rights = enum_map! { _ => enum_map! { _ => false } };
    if s == "-" {
        return Ok(castling_rights);
    }
    for ch in s.chars() {
        let (force, dir) = Force::iter()
            .cartesian_product(CastleDirection::iter())
            .find(|&(force, dir)| castling_to_fen(force, dir) == ch)
            .ok_or_else(|| format!("invalid castling rights: {}", s))?;
        castling_rights[force][dir] = true;
    }
    Ok(castling_rights)
}

fn en_passant_target_to_fen(en_passant_target: Option<Coord>) -> String {
    match en_passant_target {
        None => "-".to_owned(),
        Some(pos) => pos.to_algebraic(),
    }
}
fn en_passant_target_from_fen(s: &str) -> Result<Option<Coord>, String> {
    if s == "-" {
        Ok(None)
    } else {
        let pos =
            Coord::from_algebraic(s).ok_or_else(|| format!("invalid en passant target: {}", s))?;
        Ok(Some(pos))
    }
}

fn grid_to_fen(grid: &Grid) -> String {
    Row::all()
        .rev()
        .map(|row| {
            let mut row_notation = String::new();
            let mut empty_col_count: u8 = 0;
            for col in Col::all() {
                if let Some(piece) = grid[Coord::new(row, col)] {
                    if empty_col_count > 0 {
                        row_notation.push_str(&empty_col_count.to_string());
                        empty_col_count = 0;
                    }
                    row_notation.push(piece_to_ascii(piece.kind, piece.force));
                } else {
                    empty_col_count += 1;
                }
            }
            if empty_col_count > 0 {
                row_notation.push_str(&empty_col_count.to_string());
            }
            row_notation
        })
        .join("/")
}

fn grid_from_fen(grid_notation: &str) -> Result<Grid, String> {
    let mut grid = Grid::new();
    let rows = grid_notation.split('/').collect_vec();
    if rows.len() != NUM_ROWS as usize {
        return Err(format!("invalid FEN: has {} rows, expected {}", rows.len(), NUM_ROWS));
    }
    for (row_idx, row_notation) in rows.iter().rev().enumerate() {
        let row = Row::from_zero_based(row_idx as u8);
        let mut col: u8 = 0;
        for ch in row_notation.chars() {
            if let Some(n) = ch.to_digit(10) {
                if n == 0 || col as u32 + n > NUM_COLS as u32 {
                    return Err(format!("invalid FEN: bad row {}", row_notation));
                }
                col += n as u8;
            } else if let Some((kind, force)) = piece_from_ascii(ch) {
                if col >= NUM_COLS {
                    return Err(format!("invalid FEN: row {} is too long", row.to_algebraic()));
                }
                grid[Coord::new(row, Col::from_zero_based(col))] =
                    Some(PieceOnBoard::new(kind, force));
                col += 1;
            } else {
                return Err(format!("invalid FEN: unknown piece: {}", ch));
            }
        }
        if col != NUM_COLS {
            return Err(format!(
                "invalid FEN: row {} has {} columns, expected {}",
                row.to_algebraic(),
                col,
                NUM_COLS
            ));
        }
    }
    Ok(grid)
}

pub fn board_to_fen(board: &Board) -> String {
    format!(
        "{} {} {} {} {} {}",
        grid_to_fen(board.grid()),
        force_to_fen(board.active_force()),
        castling_rights_to_fen(board.castling_rights()),
        en_passant_target_to_fen(board.en_passant_target()),
        board.half_turn_clock(),
        board.full_turn_index()
    )
}

// Parses a position in standard FEN. Rejects positions that could not be played from: missing
// or extra kings, or the side that has just moved standing in check.
pub fn fen_to_board(fen: &str) -> Result<Board, String> {
    let (
        grid_notation,
        active_force_notation,
        castling_notation,
        en_passant_target_notation,
        half_turn_clock,
        full_turn_index,
    ) = fen
        .split_whitespace()
        .collect_tuple()
        .ok_or_else(|| format!("invalid FEN: {fen}"))?;

    let grid = grid_from_fen(grid_notation)?;
    for force in Force::iter() {
        let num_kings = grid
            .pieces()
            .filter(|(_, piece)| piece.kind == PieceKind::King && piece.force == force)
            .count();
        if num_kings != 1 {
            return Err(format!("invalid FEN: {:?} has {} kings", force, num_kings));
        }
    }
    let active_force = force_from_fen(active_force_notation)?;
    let castling_rights = castling_rights_from_fen(castling_notation)?;
    let en_passant_target = en_passant_target_from_fen(en_passant_target_notation)?;
    let half_turn_clock = half_turn_clock
        .parse::<u32>()
        .map_err(|_| format!("invalid half-turn clock: {}", half_turn_clock))?;
    let full_turn_index = full_turn_index
        .parse::<u32>()
        .map_err(|_| format!("invalid full turn index: {}", full_turn_index))?;

    let opponent_view = Board::new_from_parts(
        grid.clone(),
        active_force.opponent(),
        castling_rights,
        None,
        half_turn_clock,
        full_turn_index,
    );
    if opponent_view.is_check() {
        return Err("invalid FEN: the side not to move is in check".to_owned());
    }
    Ok(Board::new_from_parts(
        grid,
        active_force,
        castling_rights,
        en_passant_target,
        half_turn_clock,
        full_turn_index,
    ))
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_util::replay_chess_log;

    #[test]
    fn starting_position() {
        assert_eq!(board_to_fen(&Board::new()), CLASSIC_START_FEN);
        assert_eq!(fen_to_board(CLASSIC_START_FEN).unwrap(), Board::new());
    }

    #[test]
    fn position_after_turns() {
        let mut board = Board::new();
        replay_chess_log(&mut board, "1.e4 c5 2.Nf3").unwrap();
        let fen = board_to_fen(&board);
        assert_eq!(fen, "rnbqkbnr/pp1ppppp/8/2p5/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2");
        assert_eq!(fen_to_board(&fen).unwrap(), board);
    }

    #[test]
    fn en_passant_target() {
        let mut board = Board::new();
        replay_chess_log(&mut board, "1.d4").unwrap();
        assert_eq!(
            board_to_fen(&board),
            "rnbqkbnr/pppppppp/8/8/3P4/8/PPP1PPPP/RNBQKBNR b KQkq d3 0 1"
        );
    }

    #[test]
    fn partial_castling_rights() {
        let board = fen_to_board("r3k2r/8/8/8/8/8/8/R3K2R w Kq - 0 1").unwrap();
        let rights = board.castling_rights();
        assert!(rights[Force::White][CastleDirection::HSide]);
        assert!(!rights[Force::White][CastleDirection::ASide]);
        assert!(!rights[Force::Black][CastleDirection::HSide]);
        assert!(rights[Force::Black][CastleDirection::ASide]);
        assert_eq!(board_to_fen(&board), "r3k2r/8/8/8/8/8/8/R3K2R w Kq - 0 1");
    }

    #[test]
    fn malformed() {
        assert!(fen_to_board("").is_err());
        assert!(fen_to_board("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP w KQkq - 0 1").is_err());
        assert!(fen_to_board("rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").is_err());
        assert!(fen_to_board("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1").is_err());
        assert!(fen_to_board("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkx - 0 1").is_err());
        assert!(fen_to_board("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - x 1").is_err());
    }

    #[test]
    fn impossible_positions() {
        // No black king.
        assert!(fen_to_board("8/8/8/8/8/8/8/4K3 w - - 0 1").is_err());
        // Black to move while White is in check.
        assert!(fen_to_board("4k3/8/8/8/8/8/8/r3K3 b - - 0 1").is_err());
    }
}
