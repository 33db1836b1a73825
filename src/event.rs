use serde::{Deserialize, Serialize};

use crate::board::TurnInput;
use crate::role::Force;
use crate::scores::Scores;


#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum ServerEvent {
    // Sent to a connection right after it is established.
    RoleAssigned {
        force: Force,
    },
    ObserverAssigned,
    // Broadcast after a legal turn, followed by `PositionUpdated` and, if something was captured,
    // by `ScoresUpdated`.
    TurnAccepted {
        turn_input: TurnInput,
    },
    PositionUpdated {
        fen: String,
    },
    ScoresUpdated {
        scores: Scores,
    },
    // Sent only to the client that attempted the turn.
    TurnRejected {
        turn_input: TurnInput,
    },
    Pong,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum ClientEvent {
    MakeTurn { turn_input: TurnInput },
    // Asks the server to resend the position and the scores.
    RequestState,
    Ping,
}
