use crate::board::Capture;
use crate::role::Force;
use crate::rules_oracle::{AcceptedTurn, RulesOracle};
use crate::scores::Scores;


// Authoritative state of the one game hosted by the server.
//
// Invariants:
//   - `turn` always equals `oracle.side_to_move(position)`;
//   - `scores` is always consistent with `oracle.unit_value`.
// Both hold because the state only changes through `apply_accepted`.
#[derive(Clone, Debug)]
pub struct SessionState<P> {
    position: P,
    turn: Force,
    scores: Scores,
}

impl<P: Clone> SessionState<P> {
    pub fn new<O: RulesOracle<Position = P>>(oracle: &O) -> Self {
        let position = oracle.starting_position();
        let turn = oracle.side_to_move(&position);
        SessionState { position, turn, scores: Scores::new() }
    }

    pub fn position(&self) -> &P { &self.position }
    pub fn turn(&self) -> Force { self.turn }
    pub fn scores(&self) -> &Scores { &self.scores }

    // Commits a turn validated by the oracle on behalf of `mover`. The capture, if any, is
    // credited to the mover.
    pub fn apply_accepted<O: RulesOracle<Position = P>>(
        &mut self, oracle: &O, mover: Force, accepted: AcceptedTurn<P>,
    ) -> Option<Capture> {
        let AcceptedTurn { position, capture } = accepted;
        if let Some(capture) = capture {
            self.scores.record_capture(mover, capture, oracle.unit_value(capture.kind));
        }
        self.turn = oracle.side_to_move(&position);
        self.position = position;
        capture
    }
}
