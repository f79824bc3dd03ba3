//! Stride - headless movement prediction harness
//!
//! Runs a predicting client and its authority side by side over a simulated
//! lossless link with fixed latency. The client sprints, aims and changes gait
//! from a script; the authority re-simulates every move and corrects the client
//! when they disagree. A debug overlay traces the world around the character.

mod settings;

use std::collections::VecDeque;
use std::path::PathBuf;

use anyhow::{Context, Result};
use glam::Vec3;
use serde::de::DeserializeOwned;
use serde::Serialize;
use stride_core::{Color, EntityId, GameTime};
use stride_debug::{
    draw_capsule_trace_single, draw_line_trace_single, DebugDraw, DebugOverlay, DebugSession,
    DebugTarget, DrawBuffer, DrawLifetime, DrawTraceType, TraceDrawStyle,
};
use stride_movement::{
    GaitChange, GroundIntegrator, MovementModifier, MovementOwner, NetRole, STUN_TAG,
};
use stride_net::{
    decode, encode, ClientMessage, ClientPredictionData, MoveInput, ServerMoveHandler,
    ServerResponse,
};
use stride_physics::{CharacterController, ColliderHandle, PhysicsWorld, QueryFilter};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use settings::{ScriptAction, SimSettings};

/// The character as one side of the connection sees it
struct Pawn {
    role: NetRole,
    locally_controlled: bool,
    move_speed: f32,
    stunned: bool,
}

impl MovementOwner for Pawn {
    fn is_alive(&self) -> bool {
        true
    }

    fn has_matching_tag(&self, tag: &str) -> bool {
        self.stunned && tag == STUN_TAG
    }

    fn move_speed(&self) -> f32 {
        self.move_speed
    }

    fn is_locally_controlled(&self) -> bool {
        self.locally_controlled
    }

    fn net_role(&self) -> NetRole {
        self.role
    }
}

/// Visible body of the local character
struct Avatar {
    id: EntityId,
    mesh: String,
    tinted: bool,
    center: Vec3,
    velocity: Vec3,
    half_height: f32,
    radius: f32,
}

impl DebugTarget for Avatar {
    fn visible_mesh(&self) -> String {
        self.mesh.clone()
    }

    fn set_visible_mesh(&mut self, mesh: &str) {
        info!("Avatar mesh set to {}", mesh);
        self.mesh = mesh.to_string();
    }

    fn reset_colors(&mut self) {
        self.tinted = false;
    }

    fn update_layer_colors(&mut self) {
        self.tinted = true;
    }

    fn draw_debug_shapes(&self, draw: &mut dyn DebugDraw) {
        let color = if self.tinted { Color::BLUE } else { Color::WHITE };
        draw.draw_capsule(
            self.center,
            self.half_height,
            self.radius,
            glam::Quat::IDENTITY,
            color,
            DrawLifetime::OneFrame,
        );
        draw.draw_line(
            self.center,
            self.center + self.velocity * 0.25,
            Color::GREEN,
            DrawLifetime::OneFrame,
        );
    }
}

/// One direction of the connection; every message arrives `latency` ticks later
struct Link {
    latency: u32,
    in_flight: VecDeque<(u32, Vec<u8>)>,
}

impl Link {
    fn new(latency: u32) -> Self {
        Self {
            latency,
            in_flight: VecDeque::new(),
        }
    }

    fn send<T: Serialize>(&mut self, tick: u32, message: &T) -> Result<()> {
        let bytes = encode(message).context("Failed to send message")?;
        self.in_flight.push_back((tick + self.latency, bytes));
        Ok(())
    }

    fn receive<T: DeserializeOwned>(&mut self, tick: u32) -> Result<Vec<T>> {
        let mut delivered = Vec::new();
        while self.in_flight.front().is_some_and(|(due, _)| *due <= tick) {
            if let Some((_, bytes)) = self.in_flight.pop_front() {
                delivered.push(decode(&bytes).context("Failed to receive message")?);
            }
        }
        Ok(delivered)
    }

    fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }
}

#[derive(Debug, Default)]
struct Stats {
    moves_sent: u32,
    acks: u32,
    corrections: u32,
    replayed: usize,
}

/// Fraction of the smoothing offset removed per second
const SMOOTHING_DECAY_RATE: f32 = 8.0;

/// Shrink a correction's smoothing offset over `dt`
fn decay_smoothing(offset: Vec3, dt: f32) -> Vec3 {
    let remaining = offset * (1.0 - dt * SMOOTHING_DECAY_RATE).max(0.0);
    if remaining.length_squared() < 1e-4 {
        Vec3::ZERO
    } else {
        remaining
    }
}

struct Simulation {
    settings: SimSettings,
    input: Vec3,
    tick: u32,
    // Predicting client
    client_pawn: Pawn,
    client: MovementModifier,
    predicted: GroundIntegrator,
    prediction: ClientPredictionData,
    /// Visual offset left over from the last correction
    smoothing: Vec3,
    // Authority
    server_pawn: Pawn,
    server: ServerMoveHandler,
    stunned_until: Option<u32>,
    uplink: Link,
    downlink: Link,
    // World and debugging
    world: PhysicsWorld,
    controller: CharacterController,
    capsule: ColliderHandle,
    avatar: Avatar,
    session: DebugSession,
    overlay: DebugOverlay,
    draw: DrawBuffer,
    stats: Stats,
}

impl Simulation {
    fn new(settings: SimSettings) -> Self {
        let input = Vec3::from(settings.run.input).normalize_or_zero();

        let mut client = MovementModifier::new();
        client.set_movement_settings(settings.movement.clone());
        let mut authority = MovementModifier::new();
        authority.set_movement_settings(settings.movement.clone());
        let mut server = ServerMoveHandler::new(authority, GroundIntegrator::new());
        server.max_position_error_squared = settings.net.max_position_error_squared;

        let prediction = ClientPredictionData::with_limits(
            settings.net.max_move_delta_time,
            settings.net.max_saved_moves,
        );

        let mut world = PhysicsWorld::new();
        world.create_ground(0.0);
        if let Some(distance) = settings.debug.wall_distance {
            let center = input * distance + Vec3::Y * 150.0;
            world.create_static_box(Vec3::new(20.0, 150.0, 400.0), center);
        }
        let mut controller = CharacterController::new();
        let capsule = controller.spawn(&mut world, Vec3::ZERO);

        let mut overlay = DebugOverlay::new(settings.run.standalone);
        if let Some(enabled) = settings.debug.enabled {
            overlay.enabled = enabled;
        }
        let mut session = DebugSession {
            debug_view: false,
            show_traces: settings.debug.show_traces,
            show_debug_shapes: settings.debug.show_debug_shapes,
            show_layer_colors: settings.debug.show_layer_colors,
        };
        let mut avatar = Avatar {
            id: EntityId::new(),
            mesh: String::from("mannequin"),
            tinted: false,
            center: controller.center_position(),
            velocity: Vec3::ZERO,
            half_height: controller.config.half_height,
            radius: controller.config.radius,
        };
        overlay.begin_play(Some(avatar.id), vec![avatar.id, EntityId::new()]);
        if settings.debug.debug_view {
            overlay.toggle_debug_view(&mut session);
        }
        if settings.debug.debug_mesh {
            overlay.toggle_debug_mesh(&mut avatar);
        }

        Self {
            input,
            tick: 0,
            client_pawn: Pawn {
                role: NetRole::AutonomousProxy,
                locally_controlled: true,
                move_speed: settings.net.owner_move_speed,
                stunned: false,
            },
            client,
            predicted: GroundIntegrator::new(),
            prediction,
            smoothing: Vec3::ZERO,
            server_pawn: Pawn {
                role: NetRole::Authority,
                locally_controlled: false,
                move_speed: settings.net.owner_move_speed,
                stunned: false,
            },
            server,
            stunned_until: None,
            uplink: Link::new(settings.net.latency_ticks),
            downlink: Link::new(settings.net.latency_ticks),
            world,
            controller,
            capsule,
            avatar,
            session,
            overlay,
            draw: DrawBuffer::new(),
            stats: Stats::default(),
            settings,
        }
    }

    /// Run one fixed movement tick on both sides
    fn tick(&mut self, dt: f32) -> Result<()> {
        self.tick += 1;
        self.apply_script()?;

        let base = MoveInput {
            timestamp: self.tick as f32 * dt,
            delta_time: dt,
            input: self.input,
            wants_to_crouch: self.client_pawn.is_crouching(),
            ..Default::default()
        };
        if let Some(server_move) = self.prediction.predict(
            &mut self.client,
            &mut self.predicted,
            Some(&self.client_pawn),
            base,
        ) {
            self.uplink.send(self.tick, &ClientMessage::Move(server_move))?;
            self.stats.moves_sent += 1;
        }

        self.exchange()?;
        self.update_avatar(dt);
        self.draw_debug();
        Ok(())
    }

    fn apply_script(&mut self) -> Result<()> {
        let tick = self.tick;
        let actions: Vec<ScriptAction> = self
            .settings
            .script
            .iter()
            .filter(|event| event.tick == tick)
            .map(|event| event.action)
            .collect();

        for action in actions {
            info!("Tick {}: {:?}", tick, action);
            match action {
                ScriptAction::StartSprinting => self.client.start_sprinting(),
                ScriptAction::StopSprinting => self.client.stop_sprinting(),
                ScriptAction::StartAimDownSights => self.client.start_aim_down_sights(),
                ScriptAction::StopAimDownSights => self.client.stop_aim_down_sights(),
                ScriptAction::SetGait(gait) => {
                    match self.client.set_allowed_gait(gait, &self.client_pawn) {
                        GaitChange::Forward(request) => {
                            self.uplink
                                .send(tick, &ClientMessage::SetAllowedGait(request))?;
                        }
                        change => debug!("Gait change {:?}", change),
                    }
                }
                ScriptAction::Stun { ticks } => self.stunned_until = Some(tick + ticks),
            }
        }
        Ok(())
    }

    /// Deliver whatever is due on both links
    fn exchange(&mut self) -> Result<()> {
        self.server_pawn.stunned = self.stunned_until.is_some_and(|until| self.tick < until);
        for message in self.uplink.receive::<ClientMessage>(self.tick)? {
            if let Some(response) = self.server.handle(&message, &self.server_pawn) {
                self.downlink.send(self.tick, &response)?;
            }
        }

        for response in self.downlink.receive::<ServerResponse>(self.tick)? {
            self.reconcile(response);
        }
        Ok(())
    }

    fn reconcile(&mut self, response: ServerResponse) {
        match response {
            ServerResponse::Ack { timestamp } => {
                self.prediction.acknowledge(timestamp);
                self.stats.acks += 1;
            }
            ServerResponse::Adjust {
                timestamp,
                location,
                velocity,
            } => {
                self.prediction.acknowledge(timestamp);
                let mispredicted = self.predicted.position;
                self.predicted.position = location;
                self.predicted.velocity = velocity;

                let predicted = &mut self.predicted;
                let pawn = &self.client_pawn;
                let replayed = self.prediction.replay(&mut self.client, |modifier, saved| {
                    predicted.step(&*modifier, Some(pawn), saved.input(), saved.delta_time());
                });

                let offset = self
                    .prediction
                    .smoothing_offset(mispredicted, self.predicted.position);
                if offset == Vec3::ZERO {
                    // Too far to smooth, snap the visible capsule
                    self.controller
                        .set_position(&mut self.world, self.predicted.position);
                }
                self.smoothing = offset;
                info!(
                    "Corrected at {:.3}s: replayed {} moves, error {:.1}, smoothing {:.1}",
                    timestamp,
                    replayed,
                    mispredicted.distance(self.predicted.position),
                    offset.length()
                );
                self.stats.corrections += 1;
                self.stats.replayed += replayed;
            }
        }
    }

    /// Move the visible capsule after the prediction, stopping at walls
    ///
    /// A correction's smoothing offset keeps the mesh near where it was drawn
    /// and shrinks every tick.
    fn update_avatar(&mut self, dt: f32) {
        let target = self.predicted.position;
        let velocity = (target - self.controller.position) / dt;
        let reached = self.controller.apply_velocity(&mut self.world, velocity, dt);
        if reached.distance_squared(target) > 1.0 {
            debug!("Avatar blocked at {:?}, prediction at {:?}", reached, target);
        }

        self.smoothing = decay_smoothing(self.smoothing, dt);
        self.avatar.center = self.controller.center_position() + self.smoothing;
        self.avatar.velocity = self.predicted.velocity;
    }

    fn draw_debug(&mut self) {
        if self.session.show_traces {
            let filter = QueryFilter::default().exclude_collider(self.capsule);
            let style = TraceDrawStyle {
                draw_type: DrawTraceType::ForOneFrame,
                ..Default::default()
            };
            let center = self.avatar.center;

            let below = center - Vec3::Y * (self.avatar.half_height + 50.0);
            let ground = self.world.line_trace(center, below, filter);
            draw_line_trace_single(&mut self.draw, center, below, &ground, &style);

            let ahead = center + self.input * self.settings.debug.lookahead_distance;
            let shape = self.controller.shape();
            let sweep = self.world.sweep_trace(center, ahead, shape, filter);
            draw_capsule_trace_single(&mut self.draw, center, ahead, shape, &sweep, &style);
            if sweep.blocking_hit {
                debug!("Obstacle ahead at {:?}", sweep.impact_point);
            }
        }

        self.overlay.tick(&self.session, &mut self.avatar, &mut self.draw);
    }

    /// Hand the frame's primitives to a renderer, then age them
    fn present(&mut self, dt: f32) {
        debug!("Presenting {} debug primitives", self.draw.len());
        self.draw.tick(dt);
    }

    /// Send the last pending move and let both links go quiet
    fn finish(&mut self) -> Result<()> {
        if let Some(server_move) = self.prediction.flush() {
            self.uplink.send(self.tick, &ClientMessage::Move(server_move))?;
            self.stats.moves_sent += 1;
        }
        while !self.uplink.is_empty() || !self.downlink.is_empty() {
            self.tick += 1;
            self.exchange()?;
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Starting Stride movement harness...");

    let path = std::env::args().nth(1).map(PathBuf::from);
    let settings = SimSettings::load(path.as_deref());
    let frames = settings.run.frames;
    let frame_time = settings.run.frame_time;
    let slomo_frame = settings.run.slomo_frame;

    let mut time = GameTime::new(settings.time.clone());
    let mut sim = Simulation::new(settings);

    for frame in 0..frames {
        if slomo_frame == Some(frame) {
            sim.overlay.toggle_slomo(&mut time);
            info!("Slow motion {}", if sim.overlay.is_slomo() { "on" } else { "off" });
        }
        if frame > 0 && frame % 100 == 0 {
            if let Some(focused) = sim.overlay.next_focused_character() {
                info!("Debug focus on {:?}", focused.0);
            }
        }

        time.update(frame_time);
        for _ in 0..time.fixed_steps() {
            sim.tick(time.config.fixed_timestep)?;
        }
        sim.present(time.real_delta_time);
    }

    sim.finish()?;
    sim.overlay.end_play(&mut sim.session);

    if sim.prediction.saved_moves().next().is_some() {
        warn!("Finished with unacknowledged moves");
    }
    info!(
        "Done after {} ticks ({:.2}s simulated over {} frames): client at {:?} ({:.0} u/s), authority at {:?}",
        sim.tick,
        time.total_time,
        time.frame_count,
        sim.predicted.position,
        sim.predicted.velocity.length(),
        sim.server.integrator.position
    );
    info!(
        "{} moves sent, {} acknowledged, {} corrections, {} moves replayed",
        sim.stats.moves_sent, sim.stats.acks, sim.stats.corrections, sim.stats.replayed
    );
    Ok(())
}
