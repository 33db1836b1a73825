#![forbid(unsafe_code)]
#![cfg_attr(feature = "strict", deny(warnings))]

pub mod algebraic;
pub mod board;
pub mod coord;
pub mod event;
pub mod fen;
pub mod grid;
pub mod piece;
pub mod registry;
pub mod role;
pub mod rules_oracle;
pub mod scores;
pub mod server;
pub mod session;
pub mod test_util;
pub mod util;
