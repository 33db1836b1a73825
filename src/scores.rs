use enum_map::EnumMap;
use serde::{Deserialize, Serialize};

use crate::board::Capture;
use crate::piece::PieceKind;
use crate::role::Force;


// Material won by each side. `captures[f]` lists the units taken by `f` in chronological order;
// each entry keeps the original owner of the captured unit.
#[derive(Clone, PartialEq, Eq, Default, Debug, Serialize, Deserialize)]
pub struct Scores {
    pub score: EnumMap<Force, u32>,
    pub captures: EnumMap<Force, Vec<Capture>>,
}

impl Scores {
    pub fn new() -> Self { Self::default() }

    pub fn record_capture(&mut self, capturer: Force, capture: Capture, value: u32) {
        self.score[capturer] += value;
        self.captures[capturer].push(capture);
    }

    // Checks that every score equals the total value of the units captured by that side.
    pub fn is_consistent(&self, unit_value: impl Fn(PieceKind) -> u32) -> bool {
        self.score.iter().all(|(force, &score)| {
            score == self.captures[force].iter().map(|c| unit_value(c.kind)).sum::<u32>()
        })
    }
}
