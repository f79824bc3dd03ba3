//! Client-side prediction bookkeeping

use std::collections::VecDeque;

use glam::Vec3;
use stride_movement::{CompressedFlags, GroundIntegrator, MovementModifier, MovementOwner};
use tracing::{debug, warn};

use crate::message::ServerMove;
use crate::saved_move::{MoveInput, SavedMove};

/// Saved and pending moves of a predicting client
#[derive(Debug, Clone)]
pub struct ClientPredictionData {
    /// Corrections up to this distance are smoothed in full
    pub max_smooth_net_update_dist: f32,
    /// Corrections beyond this distance snap without smoothing
    pub no_smooth_net_update_dist: f32,
    /// Combined moves must stay below this delta time
    pub max_move_delta_time: f32,
    /// Oldest unacknowledged moves are dropped past this count
    pub max_saved_moves: usize,
    pending_move: Option<SavedMove>,
    saved_moves: VecDeque<SavedMove>,
}

impl Default for ClientPredictionData {
    fn default() -> Self {
        Self {
            max_smooth_net_update_dist: 92.0,
            no_smooth_net_update_dist: 140.0,
            max_move_delta_time: 0.125,
            max_saved_moves: 96,
            pending_move: None,
            saved_moves: VecDeque::new(),
        }
    }
}

impl ClientPredictionData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prediction data with custom combine and history limits
    pub fn with_limits(max_move_delta_time: f32, max_saved_moves: usize) -> Self {
        Self {
            max_move_delta_time,
            max_saved_moves,
            ..Self::default()
        }
    }

    /// Predict one tick of `base` input and queue the resulting move
    ///
    /// When the move combines with the pending one, `integrator` is rewound to
    /// where the pending move started and the merged move is simulated as a
    /// single step, exactly as the authority will run it.
    pub fn predict(
        &mut self,
        modifier: &mut MovementModifier,
        integrator: &mut GroundIntegrator,
        owner: Option<&dyn MovementOwner>,
        base: MoveInput,
    ) -> Option<ServerMove> {
        let captured = SavedMove::capture(modifier, base)
            .starting_from(integrator.position, integrator.velocity);
        let saved = self.combine_pending(captured);

        integrator.position = saved.start_location();
        integrator.velocity = saved.start_velocity();
        integrator.step(&*modifier, owner, saved.input(), saved.delta_time());
        modifier.on_movement_updated();

        self.enqueue(saved.post_update(integrator.position))
    }

    /// Merge `new_move` into the pending move when allowed
    ///
    /// The returned move is not yet simulated. The pending slot is left empty
    /// when a merge happened.
    pub fn combine_pending(&mut self, new_move: SavedMove) -> SavedMove {
        match self.pending_move.take() {
            Some(pending) if pending.can_combine_with(&new_move, self.max_move_delta_time) => {
                pending.combine_with(&new_move)
            }
            pending => {
                self.pending_move = pending;
                new_move
            }
        }
    }

    /// Queue a simulated move as the new pending move
    ///
    /// A previous pending move is saved and returned as the packet to send.
    pub fn enqueue(&mut self, simulated: SavedMove) -> Option<ServerMove> {
        let sent = self.pending_move.take().map(|pending| self.save(pending));
        self.pending_move = Some(simulated);
        sent
    }

    /// Send the pending move now
    pub fn flush(&mut self) -> Option<ServerMove> {
        let pending = self.pending_move.take()?;
        Some(self.save(pending))
    }

    fn save(&mut self, saved: SavedMove) -> ServerMove {
        if self.saved_moves.len() >= self.max_saved_moves {
            warn!(
                "Saved move buffer full ({}), dropping oldest move",
                self.max_saved_moves
            );
            self.saved_moves.pop_front();
        }
        self.saved_moves.push_back(saved);
        ServerMove::from_saved(&saved)
    }

    /// Move still waiting for a chance to combine
    pub fn pending_move(&self) -> Option<&SavedMove> {
        self.pending_move.as_ref()
    }

    /// Moves sent but not yet acknowledged, oldest first
    pub fn saved_moves(&self) -> impl Iterator<Item = &SavedMove> {
        self.saved_moves.iter()
    }

    /// Drop every saved move up to and including `timestamp`
    pub fn acknowledge(&mut self, timestamp: f32) {
        self.saved_moves.retain(|m| m.timestamp() > timestamp);
    }

    /// Re-simulate unacknowledged moves after a correction
    ///
    /// Each move's intent is restored into the modifier before `step` runs it.
    /// The live intent is put back afterwards. Returns the number of moves replayed.
    pub fn replay<F>(&self, modifier: &mut MovementModifier, mut step: F) -> usize
    where
        F: FnMut(&mut MovementModifier, &SavedMove),
    {
        let live_intent = modifier.intent();
        let mut count = 0;
        for saved in self.saved_moves.iter().chain(self.pending_move.iter()) {
            modifier.update_from_compressed_flags(saved.compressed_flags());
            step(modifier, saved);
            count += 1;
        }
        modifier.update_from_compressed_flags(CompressedFlags::default().with_intent(live_intent));
        debug!("Replayed {} moves", count);
        count
    }

    /// Visual offset to smooth a correction from `old_location` to `new_location`
    pub fn smoothing_offset(&self, old_location: Vec3, new_location: Vec3) -> Vec3 {
        let offset = old_location - new_location;
        let distance = offset.length();
        if distance > self.no_smooth_net_update_dist {
            Vec3::ZERO
        } else if distance > self.max_smooth_net_update_dist {
            offset.clamp_length_max(self.max_smooth_net_update_dist)
        } else {
            offset
        }
    }
}
