//! Authority-side handling of client moves

use stride_movement::{GroundIntegrator, MovementModifier, MovementOwner};
use tracing::debug;

use crate::message::{ClientMessage, ServerMove, ServerResponse};

/// Re-simulates client moves on the authority and decides whether to correct
#[derive(Debug, Clone)]
pub struct ServerMoveHandler {
    pub modifier: MovementModifier,
    pub integrator: GroundIntegrator,
    /// Squared distance a client may drift before it is corrected
    pub max_position_error_squared: f32,
    last_timestamp: Option<f32>,
}

impl ServerMoveHandler {
    pub fn new(modifier: MovementModifier, integrator: GroundIntegrator) -> Self {
        Self {
            modifier,
            integrator,
            max_position_error_squared: 3.0,
            last_timestamp: None,
        }
    }

    /// Handle one client message; moves always produce a response unless stale
    pub fn handle(
        &mut self,
        message: &ClientMessage,
        owner: &dyn MovementOwner,
    ) -> Option<ServerResponse> {
        match message {
            ClientMessage::SetAllowedGait(request) => {
                self.modifier.server_set_allowed_gait(*request);
                None
            }
            ClientMessage::Move(server_move) => self.server_move(server_move, owner),
        }
    }

    fn server_move(
        &mut self,
        server_move: &ServerMove,
        owner: &dyn MovementOwner,
    ) -> Option<ServerResponse> {
        if self
            .last_timestamp
            .is_some_and(|last| server_move.timestamp <= last)
        {
            debug!("Ignoring stale move at {}", server_move.timestamp);
            return None;
        }
        self.last_timestamp = Some(server_move.timestamp);

        self.modifier.update_from_compressed_flags(server_move.flags);
        self.integrator.step(
            &self.modifier,
            Some(owner),
            server_move.input,
            server_move.delta_time,
        );
        self.modifier.on_movement_updated();

        let error = self
            .integrator
            .position
            .distance_squared(server_move.client_location);
        if error > self.max_position_error_squared {
            debug!(
                "Correcting client at {}: error {:.2}",
                server_move.timestamp,
                error.sqrt()
            );
            return Some(ServerResponse::Adjust {
                timestamp: server_move.timestamp,
                location: self.integrator.position,
                velocity: self.integrator.velocity,
            });
        }

        Some(ServerResponse::Ack {
            timestamp: server_move.timestamp,
        })
    }
}
