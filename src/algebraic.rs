use lazy_static::lazy_static;
use regex_lite::Regex;

use crate::coord::{Col, Coord, Row, col_from_algebraic_str, row_from_algebraic_str};
use crate::piece::{CastleDirection, PieceKind};


#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AlgebraicMove {
    pub piece_kind: PieceKind,
    pub from_col: Option<Col>,
    pub from_row: Option<Row>,
    pub capturing: bool,
    pub to: Coord,
    pub promote_to: Option<PieceKind>,
}

// Parsed algebraic notation. Conversion between `AlgebraicTurn` and string can be done without
// a board. Conversion between `AlgebraicTurn` and `Turn` requries a board.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum AlgebraicTurn {
    Move(AlgebraicMove),
    Castle(CastleDirection),
}

lazy_static! {
    static ref MOVE_RE: Regex = Regex::new(
        r"^([PNBRQK])?([a-h])?([1-8])?([x:])?([a-h][1-8])(?:[=/]?([PNBRQK]))?([+#]?)$"
    ).unwrap();
    static ref A_CASTLING_RE: Regex = Regex::new("^(0-0-0|O-O-O)[+#]?$").unwrap();
    static ref H_CASTLING_RE: Regex = Regex::new("^(0-0|O-O)[+#]?$").unwrap();
}

impl AlgebraicTurn {
    pub fn parse(notation: &str) -> Option<Self> {
        let notation = notation.trim();
        if let Some(cap) = MOVE_RE.captures(notation) {
            let piece_kind = match cap.get(1) {
                None => PieceKind::Pawn,
                Some(m) => PieceKind::from_algebraic(m.as_str())?,
            };
            let from_col = match cap.get(2) {
                None => None,
                Some(m) => Some(col_from_algebraic_str(m.as_str())?),
            };
            let from_row = match cap.get(3) {
                None => None,
                Some(m) => Some(row_from_algebraic_str(m.as_str())?),
            };
            let capturing = cap.get(4).is_some();
            let to = Coord::from_algebraic(cap.get(5)?.as_str())?;
            let promote_to = match cap.get(6) {
                None => None,
                Some(m) => Some(PieceKind::from_algebraic(m.as_str())?),
            };
            Some(AlgebraicTurn::Move(AlgebraicMove {
                piece_kind,
                from_col,
                from_row,
                capturing,
                to,
                promote_to,
            }))
        } else if A_CASTLING_RE.is_match(notation) {
            Some(AlgebraicTurn::Castle(CastleDirection::ASide))
        } else if H_CASTLING_RE.is_match(notation) {
            Some(AlgebraicTurn::Castle(CastleDirection::HSide))
        } else {
            None
        }
    }
}
