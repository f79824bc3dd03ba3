//! Per-character debug overlay

use stride_core::time::SLOMO_DILATION;
use stride_core::{EntityId, GameTime};
use tracing::debug;

use crate::draw::DebugDraw;
use crate::session::DebugSession;

/// Character-side hooks the overlay drives
pub trait DebugTarget {
    /// Name of the mesh currently shown
    fn visible_mesh(&self) -> String;

    fn set_visible_mesh(&mut self, mesh: &str);

    /// Restore the character's original material colors
    fn reset_colors(&mut self);

    /// Tint the character by animation layer
    fn update_layer_colors(&mut self);

    fn draw_debug_shapes(&self, draw: &mut dyn DebugDraw);
}

/// Debug overlay attached to one character
///
/// Keeps a list of every character in play so a debug HUD can cycle which
/// one it inspects, and owns the slow motion toggle.
#[derive(Debug, Clone)]
pub struct DebugOverlay {
    /// Off in shipping builds; a disabled overlay never ticks
    pub enabled: bool,
    /// Whether time dilation may be changed, true outside networked play
    pub standalone: bool,
    /// Mesh swapped in by [`DebugOverlay::toggle_debug_mesh`]
    pub debug_mesh: String,
    owner: Option<EntityId>,
    characters: Vec<EntityId>,
    focused_index: Option<usize>,
    slomo: bool,
    debug_mesh_visible: bool,
    default_mesh: Option<String>,
    layer_colors_shown: bool,
    needs_color_reset: bool,
}

impl DebugOverlay {
    pub fn new(standalone: bool) -> Self {
        Self {
            enabled: cfg!(debug_assertions),
            standalone,
            debug_mesh: String::from("debug_mannequin"),
            owner: None,
            characters: Vec::new(),
            focused_index: None,
            slomo: false,
            debug_mesh_visible: false,
            default_mesh: None,
            layer_colors_shown: false,
            needs_color_reset: false,
        }
    }

    /// Start watching `characters`, focusing on `owner` when it is among them
    pub fn begin_play(&mut self, owner: Option<EntityId>, characters: Vec<EntityId>) {
        self.owner = owner;
        self.needs_color_reset = owner.is_some();
        self.characters = characters;
        self.focused_index = if self.characters.is_empty() {
            None
        } else {
            Some(
                owner
                    .and_then(|id| self.characters.iter().position(|c| *c == id))
                    .unwrap_or(0),
            )
        };
    }

    /// Locally controlled character, if any
    pub fn owner(&self) -> Option<EntityId> {
        self.owner
    }

    /// Characters that can take debug focus
    pub fn characters(&self) -> &[EntityId] {
        &self.characters
    }

    pub fn focused_index(&self) -> Option<usize> {
        self.focused_index
    }

    /// Character the debug view follows
    pub fn focused_character(&self) -> Option<EntityId> {
        self.focused_index.and_then(|index| self.characters.get(index).copied())
    }

    /// Move focus forward, wrapping at the end
    pub fn next_focused_character(&mut self) -> Option<EntityId> {
        self.cycle_focus(1)
    }

    /// Move focus backward, wrapping at the start
    pub fn previous_focused_character(&mut self) -> Option<EntityId> {
        self.cycle_focus(-1)
    }

    fn cycle_focus(&mut self, step: isize) -> Option<EntityId> {
        let count = self.characters.len();
        let Some(index) = self.focused_index.filter(|_| count > 0) else {
            self.focused_index = None;
            return None;
        };
        let next = (index as isize + step).rem_euclid(count as isize) as usize;
        self.focused_index = Some(next);
        self.focused_character()
    }

    /// Whether slow motion was requested
    pub fn is_slomo(&self) -> bool {
        self.slomo
    }

    /// Flip slow motion; time dilation only changes when running standalone
    pub fn toggle_slomo(&mut self, time: &mut GameTime) {
        self.slomo = !self.slomo;
        if self.standalone {
            let dilation = if self.slomo { SLOMO_DILATION } else { 1.0 };
            time.set_time_dilation(dilation);
            debug!("Time dilation set to {}", dilation);
        }
    }

    /// Flip the session's debug view; returns the new state
    pub fn toggle_debug_view(&self, session: &mut DebugSession) -> bool {
        session.debug_view = !session.debug_view;
        debug!("Debug view {}", if session.debug_view { "on" } else { "off" });
        session.debug_view
    }

    /// Whether the debug mesh replaced the default one
    pub fn is_debug_mesh_visible(&self) -> bool {
        self.debug_mesh_visible
    }

    /// Swap between the character's own mesh and the debug mesh
    pub fn toggle_debug_mesh(&mut self, target: &mut dyn DebugTarget) {
        if self.debug_mesh_visible {
            if let Some(mesh) = self.default_mesh.take() {
                target.set_visible_mesh(&mesh);
            }
        } else {
            self.default_mesh = Some(target.visible_mesh());
            target.set_visible_mesh(&self.debug_mesh);
        }
        self.debug_mesh_visible = !self.debug_mesh_visible;
    }

    /// Per-frame update: layer colors, then debug shapes
    pub fn tick(
        &mut self,
        session: &DebugSession,
        target: &mut dyn DebugTarget,
        draw: &mut dyn DebugDraw,
    ) {
        if !self.enabled || self.owner.is_none() {
            return;
        }

        if self.needs_color_reset {
            self.needs_color_reset = false;
            target.reset_colors();
        }

        if session.show_layer_colors {
            self.layer_colors_shown = true;
            target.update_layer_colors();
        } else if self.layer_colors_shown {
            self.layer_colors_shown = false;
            self.needs_color_reset = true;
        }

        if session.show_debug_shapes {
            target.draw_debug_shapes(draw);
        }
    }

    /// Leave play; session flags do not outlive the overlay
    pub fn end_play(&mut self, session: &mut DebugSession) {
        session.reset();
        self.owner = None;
        self.characters.clear();
        self.focused_index = None;
    }
}

impl Default for DebugOverlay {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::{DebugPrimitive, DrawBuffer, DrawLifetime};
    use glam::{Quat, Vec3};
    use stride_core::{Color, TimeConfig};

    #[derive(Default)]
    struct Dummy {
        mesh: String,
        resets: u32,
        colorings: u32,
    }

    impl DebugTarget for Dummy {
        fn visible_mesh(&self) -> String {
            self.mesh.clone()
        }

        fn set_visible_mesh(&mut self, mesh: &str) {
            self.mesh = mesh.to_string();
        }

        fn reset_colors(&mut self) {
            self.resets += 1;
        }

        fn update_layer_colors(&mut self) {
            self.colorings += 1;
        }

        fn draw_debug_shapes(&self, draw: &mut dyn DebugDraw) {
            draw.draw_capsule(
                Vec3::ZERO,
                90.0,
                40.0,
                Quat::IDENTITY,
                Color::BLUE,
                DrawLifetime::OneFrame,
            );
        }
    }

    fn overlay() -> DebugOverlay {
        DebugOverlay {
            enabled: true,
            ..DebugOverlay::new(true)
        }
    }

    fn ids(count: usize) -> Vec<EntityId> {
        (0..count).map(|_| EntityId::new()).collect()
    }

    #[test]
    fn test_begin_play_focuses_owner() {
        let characters = ids(3);
        let mut overlay = overlay();
        overlay.begin_play(Some(characters[2]), characters.clone());
        assert_eq!(overlay.focused_index(), Some(2));
        assert_eq!(overlay.focused_character(), Some(characters[2]));
    }

    #[test]
    fn test_begin_play_falls_back_to_first() {
        let mut overlay = overlay();
        overlay.begin_play(Some(EntityId::new()), ids(2));
        assert_eq!(overlay.focused_index(), Some(0));

        overlay.begin_play(None, Vec::new());
        assert_eq!(overlay.focused_index(), None);
    }

    #[test]
    fn test_focus_wraps_both_ways() {
        let characters = ids(3);
        let mut overlay = overlay();
        overlay.begin_play(Some(characters[0]), characters.clone());

        assert_eq!(overlay.previous_focused_character(), Some(characters[2]));
        assert_eq!(overlay.next_focused_character(), Some(characters[0]));
        assert_eq!(overlay.next_focused_character(), Some(characters[1]));
        assert_eq!(overlay.next_focused_character(), Some(characters[2]));
        assert_eq!(overlay.next_focused_character(), Some(characters[0]));
    }

    #[test]
    fn test_focus_cleared_without_characters() {
        let mut overlay = overlay();
        overlay.begin_play(Some(EntityId::new()), Vec::new());
        assert_eq!(overlay.next_focused_character(), None);
        assert_eq!(overlay.previous_focused_character(), None);
        assert_eq!(overlay.focused_character(), None);
    }

    #[test]
    fn test_slomo_only_when_standalone() {
        let mut time = GameTime::new(TimeConfig::default());
        let mut standalone = overlay();
        standalone.toggle_slomo(&mut time);
        assert!(standalone.is_slomo());
        assert_eq!(time.time_dilation(), SLOMO_DILATION);
        standalone.toggle_slomo(&mut time);
        assert_eq!(time.time_dilation(), 1.0);

        let mut networked = DebugOverlay {
            standalone: false,
            ..overlay()
        };
        networked.toggle_slomo(&mut time);
        assert!(networked.is_slomo());
        assert_eq!(time.time_dilation(), 1.0);
    }

    #[test]
    fn test_debug_mesh_swaps_back() {
        let mut target = Dummy {
            mesh: "hero".to_string(),
            ..Default::default()
        };
        let mut overlay = overlay();
        overlay.toggle_debug_mesh(&mut target);
        assert!(overlay.is_debug_mesh_visible());
        assert_eq!(target.mesh, "debug_mannequin");

        overlay.toggle_debug_mesh(&mut target);
        assert!(!overlay.is_debug_mesh_visible());
        assert_eq!(target.mesh, "hero");
    }

    #[test]
    fn test_tick_resets_colors_once_after_layers_off() {
        let mut session = DebugSession::new();
        let mut target = Dummy::default();
        let mut draw = DrawBuffer::new();
        let mut overlay = overlay();
        overlay.begin_play(Some(EntityId::new()), Vec::new());

        overlay.tick(&session, &mut target, &mut draw);
        assert_eq!(target.resets, 1);

        session.toggle_layer_colors();
        overlay.tick(&session, &mut target, &mut draw);
        overlay.tick(&session, &mut target, &mut draw);
        assert_eq!(target.colorings, 2);

        session.toggle_layer_colors();
        for _ in 0..4 {
            overlay.tick(&session, &mut target, &mut draw);
        }
        assert_eq!(target.resets, 2);
        assert_eq!(target.colorings, 2);
    }

    #[test]
    fn test_tick_draws_shapes_when_enabled() {
        let mut session = DebugSession::new();
        let mut target = Dummy::default();
        let mut draw = DrawBuffer::new();
        let mut overlay = overlay();
        overlay.begin_play(Some(EntityId::new()), Vec::new());

        overlay.tick(&session, &mut target, &mut draw);
        assert!(draw.is_empty());

        session.toggle_debug_shapes();
        overlay.tick(&session, &mut target, &mut draw);
        assert!(matches!(
            draw.commands()[0].primitive,
            DebugPrimitive::Capsule { .. }
        ));
    }

    #[test]
    fn test_disabled_overlay_does_nothing() {
        let session = DebugSession {
            show_debug_shapes: true,
            show_layer_colors: true,
            ..Default::default()
        };
        let mut target = Dummy::default();
        let mut draw = DrawBuffer::new();
        let mut overlay = DebugOverlay {
            enabled: false,
            ..DebugOverlay::new(true)
        };
        overlay.begin_play(Some(EntityId::new()), Vec::new());
        overlay.tick(&session, &mut target, &mut draw);

        assert_eq!(target.colorings, 0);
        assert!(draw.is_empty());
    }

    #[test]
    fn test_end_play_resets_session() {
        let mut session = DebugSession::new();
        let mut overlay = overlay();
        overlay.begin_play(Some(EntityId::new()), ids(2));
        overlay.toggle_debug_view(&mut session);
        session.toggle_traces();

        overlay.end_play(&mut session);
        assert_eq!(session, DebugSession::default());
        assert_eq!(overlay.focused_character(), None);
    }
}
