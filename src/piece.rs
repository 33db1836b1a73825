use derive_new::new;
use enum_map::Enum;
use serde::{Deserialize, Serialize};
use strum::EnumIter;

use crate::role::Force;
use crate::util::as_single_char;


#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Enum, EnumIter, Serialize, Deserialize)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, new, Serialize, Deserialize)]
pub struct PieceOnBoard {
    pub kind: PieceKind,
    pub force: Force,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Enum, EnumIter, Serialize, Deserialize)]
pub enum CastleDirection {
    ASide, // a.k.a. queen side
    HSide, // a.k.a. king side
}

impl PieceKind {
    // Should not be used to construct moves in algebraic notation, because it returns a
    // non-empty name for a pawn.
    pub fn to_full_algebraic(self) -> char {
        match self {
            PieceKind::Pawn => 'P',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::Queen => 'Q',
            PieceKind::King => 'K',
        }
    }

    pub fn from_algebraic_char(notation: char) -> Option<Self> {
        match notation {
            'P' => Some(PieceKind::Pawn),
            'N' => Some(PieceKind::Knight),
            'B' => Some(PieceKind::Bishop),
            'R' => Some(PieceKind::Rook),
            'Q' => Some(PieceKind::Queen),
            'K' => Some(PieceKind::King),
            _ => None,
        }
    }

    pub fn from_algebraic(notation: &str) -> Option<Self> {
        as_single_char(notation).and_then(Self::from_algebraic_char)
    }

    // Promotion targets come from drag-and-drop clients in lowercase ("q"), so accept both.
    pub fn from_promotion_str(notation: &str) -> Option<Self> {
        as_single_char(notation).and_then(|ch| Self::from_algebraic_char(ch.to_ascii_uppercase()))
    }

    pub fn can_promote_to(self) -> bool {
        use PieceKind::*;
        match self {
            Pawn | King => false,
            Knight | Bishop | Rook | Queen => true,
        }
    }
}

pub fn piece_to_ascii(kind: PieceKind, force: Force) -> char {
    let s = kind.to_full_algebraic();
    match force {
        Force::White => s.to_ascii_uppercase(),
        Force::Black => s.to_ascii_lowercase(),
    }
}

pub fn piece_from_ascii(ch: char) -> Option<(PieceKind, Force)> {
    let kind = PieceKind::from_algebraic_char(ch.to_ascii_uppercase())?;
    let force = if ch.is_ascii_uppercase() { Force::White } else { Force::Black };
    Some((kind, force))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_roundtrip_keeps_force() {
        assert_eq!(piece_to_ascii(PieceKind::Knight, Force::White), 'N');
        assert_eq!(piece_to_ascii(PieceKind::Knight, Force::Black), 'n');
        assert_eq!(piece_from_ascii('q'), Some((PieceKind::Queen, Force::Black)));
        assert_eq!(piece_from_ascii('K'), Some((PieceKind::King, Force::White)));
        assert_eq!(piece_from_ascii('x'), None);
    }

    #[test]
    fn promotion_notation() {
        assert_eq!(PieceKind::from_promotion_str("q"), Some(PieceKind::Queen));
        assert_eq!(PieceKind::from_promotion_str("N"), Some(PieceKind::Knight));
        assert_eq!(PieceKind::from_promotion_str("qq"), None);
        assert!(!PieceKind::King.can_promote_to());
    }
}
