use std::fmt;

use crate::board::{Board, Capture, TurnError, TurnInput};
use crate::fen::board_to_fen;
use crate::piece::PieceKind;
use crate::role::Force;


// Result of a successful validation: the position after the turn and the captured unit, if any.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AcceptedTurn<P> {
    pub position: P,
    pub capture: Option<Capture>,
}

// Game rules as seen by the session. The session never looks inside a position: it only asks
// whether a turn is legal, whose turn it is and how much a captured unit is worth.
//
// `validate` must be pure: the input position is left untouched whatever the outcome, and
// malformed actions are reported as errors rather than panics.
pub trait RulesOracle {
    type Position: Clone;
    type Action: Clone + fmt::Debug;
    type Error: fmt::Debug;

    fn starting_position(&self) -> Self::Position;
    fn validate(
        &self, position: &Self::Position, action: &Self::Action,
    ) -> Result<AcceptedTurn<Self::Position>, Self::Error>;
    fn side_to_move(&self, position: &Self::Position) -> Force;
    fn unit_value(&self, kind: PieceKind) -> u32;
    // Canonical encoding sent to clients.
    fn position_to_string(&self, position: &Self::Position) -> String;
}


#[derive(Clone, Debug)]
pub struct ChessRulesOracle {
    starting_position: Board,
}

impl ChessRulesOracle {
    pub fn new() -> Self { Self::with_starting_position(Board::new()) }
    pub fn with_starting_position(starting_position: Board) -> Self {
        ChessRulesOracle { starting_position }
    }
}

impl Default for ChessRulesOracle {
    fn default() -> Self { Self::new() }
}

impl RulesOracle for ChessRulesOracle {
    type Position = Board;
    type Action = TurnInput;
    type Error = TurnError;

    fn starting_position(&self) -> Board { self.starting_position.clone() }

    fn validate(
        &self, position: &Board, action: &TurnInput,
    ) -> Result<AcceptedTurn<Board>, TurnError> {
        let mut position = position.clone();
        let capture = position.try_turn_input(action)?;
        Ok(AcceptedTurn { position, capture })
    }

    fn side_to_move(&self, position: &Board) -> Force { position.active_force() }

    fn unit_value(&self, kind: PieceKind) -> u32 {
        match kind {
            PieceKind::Pawn => 1,
            PieceKind::Knight => 3,
            PieceKind::Bishop => 3,
            PieceKind::Rook => 5,
            PieceKind::Queen => 9,
            // Never captured.
            PieceKind::King => 0,
        }
    }

    fn position_to_string(&self, position: &Board) -> String { board_to_fen(position) }
}
