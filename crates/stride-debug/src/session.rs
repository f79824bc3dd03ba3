//! Debug toggles shared by every overlay in a running session

/// Debug flags for one play session
///
/// Overlays read and flip these through a borrowed session, so the flags
/// last exactly as long as the value that owns them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebugSession {
    pub debug_view: bool,
    pub show_traces: bool,
    pub show_debug_shapes: bool,
    pub show_layer_colors: bool,
}

impl DebugSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip trace drawing; returns the new state
    pub fn toggle_traces(&mut self) -> bool {
        self.show_traces = !self.show_traces;
        self.show_traces
    }

    /// Flip per-character debug shapes; returns the new state
    pub fn toggle_debug_shapes(&mut self) -> bool {
        self.show_debug_shapes = !self.show_debug_shapes;
        self.show_debug_shapes
    }

    /// Flip layer coloring; returns the new state
    pub fn toggle_layer_colors(&mut self) -> bool {
        self.show_layer_colors = !self.show_layer_colors;
        self.show_layer_colors
    }

    /// Turn every flag off
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_starts_off() {
        let session = DebugSession::new();
        assert!(!session.debug_view);
        assert!(!session.show_traces);
        assert!(!session.show_debug_shapes);
        assert!(!session.show_layer_colors);
    }

    #[test]
    fn test_toggles_and_reset() {
        let mut session = DebugSession::new();
        assert!(session.toggle_traces());
        assert!(session.toggle_layer_colors());
        assert!(!session.toggle_traces());
        session.toggle_debug_shapes();

        session.reset();
        assert_eq!(session, DebugSession::default());
    }
}
