use enum_map::Enum;
use serde::{Deserialize, Serialize};
use strum::EnumIter;


// One side of the board. The two sides double as the two privileged participant roles: the
// first player to connect plays White, the second plays Black.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Enum, EnumIter, Serialize, Deserialize,
)]
pub enum Force {
    White,
    Black,
}

impl Force {
    pub fn opponent(self) -> Force {
        match self {
            Force::White => Force::Black,
            Force::Black => Force::White,
        }
    }
}

// What a connection is allowed to do in the session.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Participant {
    Player(Force),
    // Receives all broadcasts, cannot make turns.
    Observer,
}

impl Participant {
    pub fn as_player(self) -> Option<Force> {
        match self {
            Participant::Player(force) => Some(force),
            Participant::Observer => None,
        }
    }
}
