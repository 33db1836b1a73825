// Improvement potential. Chess draws: fifty-move rule, threefold repetition, dead position.
//   Only the half-turn clock is tracked (for FEN); nothing ends the game on it.

use enum_map::{EnumMap, enum_map};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::algebraic::{AlgebraicMove, AlgebraicTurn};
use crate::coord::{Col, Coord, SubjectiveRow};
use crate::grid::Grid;
use crate::piece::{CastleDirection, PieceKind, PieceOnBoard};
use crate::role::Force;
use crate::util::sort_two;


pub type CastlingRights = EnumMap<Force, EnumMap<CastleDirection, bool>>;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Turn {
    Move(TurnMove),
    Castle(CastleDirection),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TurnMove {
    pub from: Coord,
    pub to: Coord,
    pub promote_to: Option<PieceKind>,
}

// A turn as it arrives over the wire. Coordinates are kept as strings: a malformed turn is
// an ordinary invalid turn, not a protocol error.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TurnInput {
    // Drag-and-drop move, e.g. {"from": "e7", "to": "e8", "promotion": "q"}.
    // Promotion is ignored unless a pawn reaches the last row; a missing promotion means queen.
    DragDrop {
        from: String,
        to: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        promotion: Option<String>,
    },
    // Standard algebraic notation, e.g. "Nf3", "exd5", "O-O", "e8=Q".
    Algebraic(String),
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Capture {
    pub kind: PieceKind,
    // Original owner of the captured piece.
    pub force: Force,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TurnError {
    InvalidNotation,
    AmbiguousNotation,
    CaptureNotationRequiresCapture,
    PieceMissing,
    WrongTurnOrder,
    ImpossibleTrajectory,
    PathBlocked,
    UnprotectedKing,
    CastlingPieceHasMoved,
    BadPromotion,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum BoardStatus {
    Active,
    Checkmate { winner: Force },
    Stalemate,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum ProtoReachability {
    Ok,
    OkIfCapturing,
    OkIfNonCapturing,
    Blocked,
    Impossible,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Reachability {
    Ok,
    Blocked,
    Impossible,
}

impl Reachability {
    fn ok(self) -> bool { self == Reachability::Ok }
}

#[derive(Clone, Debug)]
struct TurnOutcome {
    new_grid: Grid,
    capture: Option<Capture>,
    en_passant_target: Option<Coord>,
    resets_half_turn_clock: bool,
}


fn direction_forward(force: Force) -> i8 {
    match force {
        Force::White => 1,
        Force::Black => -1,
    }
}

fn should_promote(force: Force, piece_kind: PieceKind, to: Coord) -> bool {
    piece_kind == PieceKind::Pawn && to.row == SubjectiveRow::last().to_row(force)
}

fn rook_home(force: Force, dir: CastleDirection) -> Coord {
    let row = SubjectiveRow::first().to_row(force);
    match dir {
        CastleDirection::ASide => Coord::new(row, Col::A),
        CastleDirection::HSide => Coord::new(row, Col::H),
    }
}

fn king_home(force: Force) -> Coord { Coord::new(SubjectiveRow::first().to_row(force), Col::E) }

fn classic_grid() -> Grid {
    use PieceKind::*;
    let back_row = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];
    let mut grid = Grid::new();
    for force in Force::iter() {
        let first_row = SubjectiveRow::first().to_row(force);
        let pawn_row = SubjectiveRow::from_one_based(2).to_row(force);
        for (col, kind) in Col::all().zip(back_row) {
            grid[Coord::new(first_row, col)] = Some(PieceOnBoard::new(kind, force));
            grid[Coord::new(pawn_row, col)] = Some(PieceOnBoard::new(Pawn, force));
        }
    }
    grid
}

// Returns the square of the piece that would be captured by moving from `from` to `to`.
// Differs from `to` only for en passant.
fn get_capture(
    grid: &Grid, from: Coord, to: Coord, en_passant_target: Option<Coord>,
) -> Option<Coord> {
    let piece = grid[from]?;
    if let Some(target_piece) = grid[to] {
        if target_piece.force == piece.force { None } else { Some(to) }
    } else if piece.kind == PieceKind::Pawn
        && Some(to) == en_passant_target
        && (to.col - from.col).abs() == 1
    {
        Some(Coord::new(from.row, to.col))
    } else {
        None
    }
}

fn is_attacked(grid: &Grid, pos: Coord, by: Force) -> bool {
    grid.pieces()
        .any(|(from, piece)| piece.force == by && reachability(grid, from, pos, true).ok())
}

fn is_check(grid: &Grid, force: Force) -> bool {
    match grid.find_king(force) {
        Some(king_pos) => is_attacked(grid, king_pos, force.opponent()),
        None => false,
    }
}

fn reachability(grid: &Grid, from: Coord, to: Coord, capturing: bool) -> Reachability {
    use ProtoReachability::*;
    match proto_reachability(grid, from, to) {
        Ok => Reachability::Ok,
        OkIfCapturing => {
            if capturing { Reachability::Ok } else { Reachability::Blocked }
        }
        OkIfNonCapturing => {
            if !capturing { Reachability::Ok } else { Reachability::Blocked }
        }
        Blocked => Reachability::Blocked,
        Impossible => Reachability::Impossible,
    }
}

// Tests that the piece can move in such a way and that the path is free.
// Does not support castling.
fn proto_reachability(grid: &Grid, from: Coord, to: Coord) -> ProtoReachability {
    use ProtoReachability::*;
    let proto = proto_reachability_modulo_destination_square(grid, from, to);
    match proto {
        Blocked | Impossible => proto,
        Ok | OkIfCapturing | OkIfNonCapturing => {
            if let (Some(piece), Some(moving)) = (grid[to], grid[from]) {
                if piece.force == moving.force {
                    return Blocked;
                }
            }
            proto
        }
    }
}

fn proto_reachability_modulo_destination_square(
    grid: &Grid, from: Coord, to: Coord,
) -> ProtoReachability {
    use ProtoReachability::*;
    if to == from {
        return Impossible;
    }
    let Some(piece) = grid[from] else {
        return Impossible;
    };

    let (d_row, d_col) = to - from;
    let is_straight_move = d_row == 0 || d_col == 0;
    let is_diagonal_move = d_row.abs() == d_col.abs();
    // Tests that squares between `from` (exclusive) and `to` (exclusive) are free.
    let has_linear_passage = || {
        assert!(is_straight_move || is_diagonal_move);
        let direction = (d_row.signum(), d_col.signum());
        let mut pos = from;
        loop {
            match pos.offset(direction) {
                Some(next) if next == to => return true,
                Some(next) if grid[next].is_some() => return false,
                Some(next) => pos = next,
                None => return false,
            }
        }
    };
    let simple_linear_passage = || {
        if has_linear_passage() { Ok } else { Blocked }
    };

    match piece.kind {
        PieceKind::Pawn => {
            let dir_forward = direction_forward(piece.force);
            let second_row = SubjectiveRow::from_one_based(2).to_row(piece.force);
            let valid_capturing_move = d_col.abs() == 1 && d_row == dir_forward;
            let valid_non_capturing_move = d_col == 0
                && (d_row == dir_forward || (from.row == second_row && d_row == dir_forward * 2));
            match (valid_capturing_move, valid_non_capturing_move) {
                (true, true) => panic!("A pawn move cannot be both capturing and non-capturing"),
                (true, false) => OkIfCapturing,
                (false, true) => {
                    if has_linear_passage() { OkIfNonCapturing } else { Blocked }
                }
                (false, false) => Impossible,
            }
        }
        PieceKind::Knight => {
            if sort_two((d_row.abs(), d_col.abs())) == (1, 2) { Ok } else { Impossible }
        }
        PieceKind::Bishop => {
            if is_diagonal_move { simple_linear_passage() } else { Impossible }
        }
        PieceKind::Rook => {
            if is_straight_move { simple_linear_passage() } else { Impossible }
        }
        PieceKind::Queen => {
            if is_straight_move || is_diagonal_move { simple_linear_passage() } else { Impossible }
        }
        PieceKind::King => {
            if d_row.abs() <= 1 && d_col.abs() <= 1 { Ok } else { Impossible }
        }
    }
}

// Keeps the most informative error when several pieces could have made a turn.
fn prefer_error(current: Option<TurnError>, new: TurnError) -> Option<TurnError> {
    match current {
        None | Some(TurnError::ImpossibleTrajectory) => Some(new),
        Some(err) => Some(err),
    }
}


#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Board {
    grid: Grid,
    active_force: Force,
    castling_rights: CastlingRights,
    en_passant_target: Option<Coord>,
    half_turn_clock: u32,
    full_turn_index: u32,
}

impl Board {
    pub fn new() -> Self {
        Board {
            grid: classic_grid(),
            active_force: Force::White,
            castling_rights: enum_map! { _ => enum_map! { _ => true } },
            en_passant_target: None,
            half_turn_clock: 0,
            full_turn_index: 1,
        }
    }

    pub fn new_from_parts(
        grid: Grid, active_force: Force, castling_rights: CastlingRights,
        en_passant_target: Option<Coord>, half_turn_clock: u32, full_turn_index: u32,
    ) -> Self {
        Board {
            grid,
            active_force,
            castling_rights,
            en_passant_target,
            half_turn_clock,
            full_turn_index,
        }
    }

    pub fn grid(&self) -> &Grid { &self.grid }
    pub fn active_force(&self) -> Force { self.active_force }
    pub fn castling_rights(&self) -> &CastlingRights { &self.castling_rights }
    pub fn en_passant_target(&self) -> Option<Coord> { self.en_passant_target }
    pub fn half_turn_clock(&self) -> u32 { self.half_turn_clock }
    pub fn full_turn_index(&self) -> u32 { self.full_turn_index }
    pub fn is_check(&self) -> bool { is_check(&self.grid, self.active_force) }

    pub fn status(&self) -> BoardStatus {
        if self.has_legal_turns() {
            BoardStatus::Active
        } else if self.is_check() {
            BoardStatus::Checkmate { winner: self.active_force.opponent() }
        } else {
            BoardStatus::Stalemate
        }
    }

    // Parses and applies a turn. The board is left intact if the turn is invalid.
    pub fn try_turn_input(&mut self, input: &TurnInput) -> Result<Option<Capture>, TurnError> {
        let turn = self.parse_turn_input(input)?;
        self.try_turn(turn)
    }

    pub fn try_turn(&mut self, turn: Turn) -> Result<Option<Capture>, TurnError> {
        // Turn application is split into two phases:
        //   - First, check turn validity and determine the outcome (does not change
        //     board state, can fail if the turn is invalid).
        //   - Second, apply the outcome (changes board state, cannot fail).
        let outcome = self.turn_outcome(turn)?;
        Ok(self.apply_turn(turn, outcome))
    }

    pub fn parse_turn_input(&self, input: &TurnInput) -> Result<Turn, TurnError> {
        match input {
            TurnInput::DragDrop { from, to, promotion } => {
                let from = Coord::from_algebraic(from).ok_or(TurnError::InvalidNotation)?;
                let to = Coord::from_algebraic(to).ok_or(TurnError::InvalidNotation)?;
                let piece = self.grid[from].ok_or(TurnError::PieceMissing)?;
                if piece.force != self.active_force {
                    return Err(TurnError::WrongTurnOrder);
                }
                if piece.kind == PieceKind::King && from == king_home(piece.force) {
                    if let Some(dir) = castle_direction_for_king_drag(piece.force, to) {
                        return Ok(Turn::Castle(dir));
                    }
                }
                let promote_to = if should_promote(piece.force, piece.kind, to) {
                    match promotion {
                        None => Some(PieceKind::Queen),
                        Some(p) => {
                            Some(PieceKind::from_promotion_str(p).ok_or(TurnError::BadPromotion)?)
                        }
                    }
                } else {
                    None
                };
                Ok(Turn::Move(TurnMove { from, to, promote_to }))
            }
            TurnInput::Algebraic(notation) => {
                match AlgebraicTurn::parse(notation).ok_or(TurnError::InvalidNotation)? {
                    AlgebraicTurn::Castle(dir) => Ok(Turn::Castle(dir)),
                    AlgebraicTurn::Move(mv) => self.algebraic_move_to_turn(&mv),
                }
            }
        }
    }

    fn algebraic_move_to_turn(&self, mv: &AlgebraicMove) -> Result<Turn, TurnError> {
        let force = self.active_force;
        if mv.promote_to.is_some() != should_promote(force, mv.piece_kind, mv.to) {
            return Err(TurnError::BadPromotion);
        }
        let mut turn = None;
        let mut error = None;
        for (from, piece) in self.grid.pieces() {
            if piece.force != force
                || piece.kind != mv.piece_kind
                || mv.from_row.is_some_and(|row| row != from.row)
                || mv.from_col.is_some_and(|col| col != from.col)
            {
                continue;
            }
            let candidate = Turn::Move(TurnMove { from, to: mv.to, promote_to: mv.promote_to });
            match self.turn_outcome(candidate) {
                Ok(outcome) => {
                    if mv.capturing && outcome.capture.is_none() {
                        return Err(TurnError::CaptureNotationRequiresCapture);
                    }
                    if turn.is_some() {
                        return Err(TurnError::AmbiguousNotation);
                    }
                    turn = Some(candidate);
                }
                Err(err) => error = prefer_error(error, err),
            }
        }
        turn.ok_or(error.unwrap_or(TurnError::PieceMissing))
    }

    fn turn_outcome(&self, turn: Turn) -> Result<TurnOutcome, TurnError> {
        let outcome = match turn {
            Turn::Move(mv) => self.move_outcome(mv)?,
            Turn::Castle(dir) => self.castle_outcome(dir)?,
        };
        if is_check(&outcome.new_grid, self.active_force) {
            return Err(TurnError::UnprotectedKing);
        }
        Ok(outcome)
    }

    fn move_outcome(&self, mv: TurnMove) -> Result<TurnOutcome, TurnError> {
        let force = self.active_force;
        let piece = self.grid[mv.from].ok_or(TurnError::PieceMissing)?;
        if piece.force != force {
            return Err(TurnError::WrongTurnOrder);
        }
        let capture_pos = get_capture(&self.grid, mv.from, mv.to, self.en_passant_target);
        match reachability(&self.grid, mv.from, mv.to, capture_pos.is_some()) {
            Reachability::Ok => {}
            Reachability::Blocked => return Err(TurnError::PathBlocked),
            Reachability::Impossible => return Err(TurnError::ImpossibleTrajectory),
        }

        let mut new_grid = self.grid.clone();
        new_grid[mv.from] = None;
        let capture = match capture_pos {
            Some(pos) => {
                // Can only be missing if the en passant target was inconsistent with the grid.
                let captured = new_grid[pos].take().ok_or(TurnError::ImpossibleTrajectory)?;
                Some(Capture { kind: captured.kind, force: captured.force })
            }
            None => None,
        };
        new_grid[mv.to] = Some(if should_promote(force, piece.kind, mv.to) {
            match mv.promote_to {
                Some(kind) if kind.can_promote_to() => PieceOnBoard::new(kind, force),
                _ => return Err(TurnError::BadPromotion),
            }
        } else {
            if mv.promote_to.is_some() {
                return Err(TurnError::BadPromotion);
            }
            piece
        });

        let is_pawn = piece.kind == PieceKind::Pawn;
        let en_passant_target = if is_pawn && (mv.to.row - mv.from.row).abs() == 2 {
            mv.from.offset((direction_forward(force), 0))
        } else {
            None
        };
        Ok(TurnOutcome {
            new_grid,
            capture,
            en_passant_target,
            resets_half_turn_clock: is_pawn || capture.is_some(),
        })
    }

    fn castle_outcome(&self, dir: CastleDirection) -> Result<TurnOutcome, TurnError> {
        let force = self.active_force;
        if !self.castling_rights[force][dir] {
            return Err(TurnError::CastlingPieceHasMoved);
        }
        let king_from = king_home(force);
        let rook_from = rook_home(force, dir);
        let king = PieceOnBoard::new(PieceKind::King, force);
        let rook = PieceOnBoard::new(PieceKind::Rook, force);
        // Castling rights from a FEN are not guaranteed to match the grid.
        if self.grid[king_from] != Some(king) || self.grid[rook_from] != Some(rook) {
            return Err(TurnError::CastlingPieceHasMoved);
        }
        let row = king_from.row;
        let (king_to, rook_to) = match dir {
            CastleDirection::ASide => (Coord::new(row, Col::C), Coord::new(row, Col::D)),
            CastleDirection::HSide => (Coord::new(row, Col::G), Coord::new(row, Col::F)),
        };

        let (min_col, max_col) = sort_two((king_from.col, rook_from.col));
        for col in Col::all().filter(|&col| col > min_col && col < max_col) {
            if self.grid[Coord::new(row, col)].is_some() {
                return Err(TurnError::PathBlocked);
            }
        }
        // King cannot start in, pass through or end up in a checked square.
        let (min_col, max_col) = sort_two((king_from.col, king_to.col));
        for col in Col::all().filter(|&col| col >= min_col && col <= max_col) {
            if is_attacked(&self.grid, Coord::new(row, col), force.opponent()) {
                return Err(TurnError::UnprotectedKing);
            }
        }

        let mut new_grid = self.grid.clone();
        new_grid[king_from] = None;
        new_grid[rook_from] = None;
        new_grid[king_to] = Some(king);
        new_grid[rook_to] = Some(rook);
        Ok(TurnOutcome {
            new_grid,
            capture: None,
            en_passant_target: None,
            resets_half_turn_clock: false,
        })
    }

    fn apply_turn(&mut self, turn: Turn, outcome: TurnOutcome) -> Option<Capture> {
        let force = self.active_force;
        match turn {
            Turn::Castle(_) => {
                self.castling_rights[force] = enum_map! { _ => false };
            }
            Turn::Move(mv) => {
                if self.grid[mv.from].is_some_and(|piece| piece.kind == PieceKind::King) {
                    self.castling_rights[force] = enum_map! { _ => false };
                }
                // A rook leaving its corner or being captured there.
                self.revoke_castling_through(mv.from);
                self.revoke_castling_through(mv.to);
            }
        }
        self.grid = outcome.new_grid;
        self.en_passant_target = outcome.en_passant_target;
        if outcome.resets_half_turn_clock {
            self.half_turn_clock = 0;
        } else {
            self.half_turn_clock += 1;
        }
        if force == Force::Black {
            self.full_turn_index += 1;
        }
        self.active_force = force.opponent();
        outcome.capture
    }

    fn revoke_castling_through(&mut self, pos: Coord) {
        for force in Force::iter() {
            for dir in CastleDirection::iter() {
                if rook_home(force, dir) == pos {
                    self.castling_rights[force][dir] = false;
                }
            }
        }
    }

    // Does not generate castles: castling is only legal when stepping the king towards the
    // rook is legal too.
    fn has_legal_turns(&self) -> bool {
        let force = self.active_force;
        self.grid.pieces().filter(|(_, piece)| piece.force == force).any(|(from, piece)| {
            Coord::all().any(|to| {
                let promote_to = should_promote(force, piece.kind, to).then_some(PieceKind::Queen);
                self.turn_outcome(Turn::Move(TurnMove { from, to, promote_to })).is_ok()
            })
        })
    }
}

fn castle_direction_for_king_drag(force: Force, to: Coord) -> Option<CastleDirection> {
    if to.row != SubjectiveRow::first().to_row(force) {
        return None;
    }
    if to.col == Col::G {
        Some(CastleDirection::HSide)
    } else if to.col == Col::C {
        Some(CastleDirection::ASide)
    } else {
        None
    }
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::fen::{board_to_fen, fen_to_board};
    use crate::test_util::{drag, replay_chess_log};

    fn sq(s: &str) -> Coord { Coord::from_algebraic(s).unwrap() }

    fn algebraic(s: &str) -> TurnInput { TurnInput::Algebraic(s.to_owned()) }

    #[test]
    fn opening_moves() {
        let mut board = Board::new();
        assert_eq!(board.try_turn_input(&drag("e2", "e4")), Ok(None));
        assert_eq!(board.active_force(), Force::Black);
        assert_eq!(board.en_passant_target(), Some(sq("e3")));
        assert_eq!(board.try_turn_input(&algebraic("Nf6")), Ok(None));
        assert_eq!(board.en_passant_target(), None);
        assert_eq!(board.active_force(), Force::White);
        assert_eq!(board.full_turn_index(), 2);
        assert_eq!(board.half_turn_clock(), 1);
    }

    #[test]
    fn wrong_side_cannot_move() {
        let mut board = Board::new();
        assert_eq!(board.try_turn_input(&drag("e7", "e5")), Err(TurnError::WrongTurnOrder));
        assert_eq!(board, Board::new());
    }

    #[test]
    fn invalid_turns_leave_board_intact() {
        let mut board = Board::new();
        assert_eq!(board.try_turn_input(&drag("e2", "e5")), Err(TurnError::ImpossibleTrajectory));
        assert_eq!(board.try_turn_input(&drag("a1", "a3")), Err(TurnError::PathBlocked));
        assert_eq!(board.try_turn_input(&drag("e3", "e4")), Err(TurnError::PieceMissing));
        assert_eq!(board.try_turn_input(&drag("z9", "e4")), Err(TurnError::InvalidNotation));
        assert_eq!(board.try_turn_input(&algebraic("Qh5")), Err(TurnError::PathBlocked));
        assert_eq!(board.try_turn_input(&algebraic("nonsense")), Err(TurnError::InvalidNotation));
        assert_eq!(board, Board::new());
    }

    #[test]
    fn capture_reports_captured_piece() {
        let mut board = Board::new();
        replay_chess_log(&mut board, "1.e4 d5").unwrap();
        let capture = board.try_turn_input(&algebraic("exd5")).unwrap();
        assert_eq!(capture, Some(Capture { kind: PieceKind::Pawn, force: Force::Black }));
        assert_eq!(board.half_turn_clock(), 0);
    }

    #[test]
    fn capture_notation_requires_capture() {
        let mut board = Board::new();
        assert_eq!(
            board.try_turn_input(&algebraic("Nxf3")),
            Err(TurnError::CaptureNotationRequiresCapture)
        );
    }

    #[test]
    fn en_passant() {
        let mut board = Board::new();
        replay_chess_log(&mut board, "1.e4 a6 2.e5 d5").unwrap();
        let capture = board.try_turn_input(&algebraic("exd6")).unwrap();
        assert_eq!(capture, Some(Capture { kind: PieceKind::Pawn, force: Force::Black }));
        assert_eq!(board.grid()[sq("d5")], None);
        assert_eq!(board.grid()[sq("d6")], Some(PieceOnBoard::new(PieceKind::Pawn, Force::White)));
    }

    #[test]
    fn en_passant_expires() {
        let mut board = Board::new();
        replay_chess_log(&mut board, "1.e4 a6 2.e5 d5 3.Nf3 h6").unwrap();
        assert_eq!(board.try_turn_input(&algebraic("exd6")), Err(TurnError::PathBlocked));
    }

    #[test]
    fn pinned_piece_cannot_move() {
        let mut board = fen_to_board("4k3/4r3/8/8/8/8/4B3/4K3 w - - 0 1").unwrap();
        assert_eq!(board.try_turn_input(&drag("e2", "d3")), Err(TurnError::UnprotectedKing));
    }

    #[test]
    fn castling() {
        let mut board = Board::new();
        replay_chess_log(&mut board, "1.e4 e5 2.Nf3 Nf6 3.Bc4 Bc5").unwrap();
        board.try_turn_input(&algebraic("O-O")).unwrap();
        assert_eq!(board.grid()[sq("g1")], Some(PieceOnBoard::new(PieceKind::King, Force::White)));
        assert_eq!(board.grid()[sq("f1")], Some(PieceOnBoard::new(PieceKind::Rook, Force::White)));
        assert!(!board.castling_rights()[Force::White][CastleDirection::ASide]);
        assert!(board.castling_rights()[Force::Black][CastleDirection::HSide]);
        // Black castles by dragging the king.
        board.try_turn_input(&drag("e8", "g8")).unwrap();
        assert_eq!(
            board_to_fen(&board),
            "rnbq1rk1/pppp1ppp/5n2/2b1p3/2B1P3/5N2/PPPP1PPP/RNBQ1RK1 w - - 6 5"
        );
    }

    #[test]
    fn cannot_castle_through_check() {
        let mut board = fen_to_board("4k3/8/8/8/8/8/5r2/4K2R w K - 0 1").unwrap();
        assert_eq!(board.try_turn_input(&algebraic("O-O")), Err(TurnError::UnprotectedKing));
    }

    #[test]
    fn cannot_castle_after_rook_moved() {
        let mut board = fen_to_board("4k3/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
        replay_chess_log(&mut board, "1.Rh2 Kd8 2.Rh1 Ke8").unwrap();
        assert_eq!(board.try_turn_input(&algebraic("O-O")), Err(TurnError::CastlingPieceHasMoved));
    }

    #[test]
    fn cannot_castle_through_pieces() {
        let mut board = Board::new();
        assert_eq!(board.try_turn_input(&algebraic("O-O-O")), Err(TurnError::PathBlocked));
    }

    #[test]
    fn promotion_defaults_to_queen_on_drag() {
        let mut board = fen_to_board("8/4P1k1/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        board
            .try_turn_input(&TurnInput::DragDrop {
                from: "e7".to_owned(),
                to: "e8".to_owned(),
                promotion: None,
            })
            .unwrap();
        assert_eq!(board.grid()[sq("e8")], Some(PieceOnBoard::new(PieceKind::Queen, Force::White)));
    }

    #[test]
    fn promotion_is_ignored_for_regular_moves() {
        let mut board = Board::new();
        let turn = TurnInput::DragDrop {
            from: "e2".to_owned(),
            to: "e4".to_owned(),
            promotion: Some("q".to_owned()),
        };
        assert_eq!(board.try_turn_input(&turn), Ok(None));
    }

    #[test]
    fn underpromotion_by_notation() {
        let mut board = fen_to_board("8/4P1k1/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(board.try_turn_input(&algebraic("e8")), Err(TurnError::BadPromotion));
        board.try_turn_input(&algebraic("e8=N")).unwrap();
        assert_eq!(board.grid()[sq("e8")], Some(PieceOnBoard::new(PieceKind::Knight, Force::White)));
    }

    #[test]
    fn ambiguous_notation() {
        let mut board = fen_to_board("4k3/8/8/8/8/8/4K3/R6R w - - 0 1").unwrap();
        assert_eq!(board.try_turn_input(&algebraic("Rd1")), Err(TurnError::AmbiguousNotation));
        board.try_turn_input(&algebraic("Rad1")).unwrap();
        assert_eq!(board.grid()[sq("d1")], Some(PieceOnBoard::new(PieceKind::Rook, Force::White)));
    }

    #[test]
    fn pinned_piece_does_not_make_notation_ambiguous() {
        // The knight on c3 is pinned, so "Ne2" can only mean the knight on g1.
        let mut board = fen_to_board("4k3/8/8/b7/8/2N5/8/4K1N1 w - - 0 1").unwrap();
        board.try_turn_input(&algebraic("Ne2")).unwrap();
        assert_eq!(board.grid()[sq("g1")], None);
    }

    #[test]
    fn checkmate() {
        let mut board = Board::new();
        assert_eq!(board.status(), BoardStatus::Active);
        replay_chess_log(&mut board, "1.f3 e5 2.g4 Qh4#").unwrap();
        assert!(board.is_check());
        assert_eq!(board.status(), BoardStatus::Checkmate { winner: Force::Black });
        assert_eq!(board.try_turn_input(&algebraic("a3")), Err(TurnError::UnprotectedKing));
    }

    #[test]
    fn stalemate() {
        let board = fen_to_board("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(!board.is_check());
        assert_eq!(board.status(), BoardStatus::Stalemate);
    }

    #[test]
    fn turn_input_wire_format() {
        let drag: TurnInput =
            serde_json::from_str(r#"{"from":"e2","to":"e4","promotion":"q"}"#).unwrap();
        assert_eq!(drag, TurnInput::DragDrop {
            from: "e2".to_owned(),
            to: "e4".to_owned(),
            promotion: Some("q".to_owned()),
        });
        let drag: TurnInput = serde_json::from_str(r#"{"from":"g1","to":"f3"}"#).unwrap();
        assert!(matches!(drag, TurnInput::DragDrop { promotion: None, .. }));
        let notation: TurnInput = serde_json::from_str(r#""Nf3""#).unwrap();
        assert_eq!(notation, algebraic("Nf3"));
    }
}
