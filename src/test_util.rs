// Test utilities shared between unit tests and the "tests" folder.

use lazy_static::lazy_static;
use regex_lite::Regex;

use crate::board::{Board, TurnError, TurnInput};


lazy_static! {
    static ref TURN_NUMBER_RE: Regex = Regex::new(r"^(?:[0-9]+\.)?(.*)$").unwrap();
}

pub fn drag(from: &str, to: &str) -> TurnInput {
    TurnInput::DragDrop {
        from: from.to_owned(),
        to: to.to_owned(),
        promotion: None,
    }
}

// Applies a log like "1.e4 e5 2.Nf3". Turn numbers are optional and not verified.
// Improvement potential: Allow whitespace after turn number.
pub fn replay_chess_log(board: &mut Board, log: &str) -> Result<(), TurnError> {
    for word in log.split_whitespace() {
        let turn_notation = match TURN_NUMBER_RE.captures(word).and_then(|cap| cap.get(1)) {
            Some(m) => m.as_str(),
            None => word,
        };
        board.try_turn_input(&TurnInput::Algebraic(turn_notation.to_owned()))?;
    }
    Ok(())
}
