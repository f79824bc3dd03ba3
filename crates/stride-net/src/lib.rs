//! Stride Net - Client prediction for the movement modifier
//!
//! Captures per-tick saved moves carrying the sprint/ADS intent bits, combines
//! compatible moves, replays unacknowledged moves after a server correction and
//! defines the messages exchanged with the authority.

mod message;
mod prediction;
mod saved_move;
mod server;

pub use message::{decode, encode, ClientMessage, NetError, ServerMove, ServerResponse};
pub use prediction::ClientPredictionData;
pub use saved_move::{MoveInput, SavedMove};
pub use server::ServerMoveHandler;
