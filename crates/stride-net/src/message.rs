//! Messages exchanged between a predicting client and the authority

use glam::Vec3;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use stride_movement::{CompressedFlags, ServerGaitRequest};

use crate::saved_move::{MoveInput, SavedMove};

/// Errors that can occur while encoding or decoding a message.
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode message: {0}")]
    Decode(#[source] serde_json::Error),
}

/// A client move as sent to the authority
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServerMove {
    pub timestamp: f32,
    pub delta_time: f32,
    pub input: Vec3,
    pub flags: CompressedFlags,
    /// Where the client ended up after the move
    pub client_location: Vec3,
}

impl ServerMove {
    /// Packet for a saved move, flags compressed
    pub fn from_saved(saved: &SavedMove) -> Self {
        Self {
            timestamp: saved.timestamp(),
            delta_time: saved.delta_time(),
            input: saved.input(),
            flags: saved.compressed_flags(),
            client_location: saved.end_location(),
        }
    }

    /// Rebuild the saved move this packet was made from
    pub fn to_saved(&self) -> SavedMove {
        SavedMove::from_flags(
            MoveInput {
                timestamp: self.timestamp,
                delta_time: self.delta_time,
                input: self.input,
                ..Default::default()
            },
            self.flags,
        )
        .post_update(self.client_location)
    }
}

/// Client-to-authority messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClientMessage {
    Move(ServerMove),
    SetAllowedGait(ServerGaitRequest),
}

/// Authority-to-client responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ServerResponse {
    /// Move accepted as predicted
    Ack { timestamp: f32 },
    /// Move rejected; the client must take this state and replay newer moves
    Adjust {
        timestamp: f32,
        location: Vec3,
        velocity: Vec3,
    },
}

impl ServerResponse {
    /// Timestamp of the move this answers
    pub fn timestamp(&self) -> f32 {
        match self {
            Self::Ack { timestamp } | Self::Adjust { timestamp, .. } => *timestamp,
        }
    }
}

/// Serialize a message for the wire
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, NetError> {
    serde_json::to_vec(message).map_err(NetError::Encode)
}

/// Deserialize a message from the wire
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, NetError> {
    serde_json::from_slice(bytes).map_err(NetError::Decode)
}
