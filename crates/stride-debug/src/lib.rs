//! Stride Debug - Developer visualization for movement
//!
//! Holds the debug session toggles, the per-character debug overlay that
//! cycles focus and drives slow motion, and helpers that draw collision
//! traces onto any [`DebugDraw`] sink. Everything here is compiled out of
//! shipping use by leaving [`DebugOverlay::enabled`] off.

mod draw;
mod overlay;
mod session;

pub use draw::{
    draw_capsule_trace_single, draw_line_trace_single, draw_sphere_trace_single, DebugDraw,
    DebugPrimitive, DrawBuffer, DrawCommand, DrawLifetime, DrawTraceType, TraceDrawStyle,
    IMPACT_POINT_SIZE,
};
pub use overlay::{DebugOverlay, DebugTarget};
pub use session::DebugSession;
