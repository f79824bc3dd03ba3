//! Trace visualization over an abstract draw sink

use glam::{Quat, Vec3};
use stride_core::Color;
use stride_physics::{CollisionShape, TraceHit};

/// Size of the point marking an impact
pub const IMPACT_POINT_SIZE: f32 = 16.0;

/// How long a drawn primitive stays on screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawLifetime {
    OneFrame,
    /// Seconds
    Duration(f32),
    Persistent,
}

/// How a trace should be drawn, if at all
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DrawTraceType {
    #[default]
    None,
    ForOneFrame,
    ForDuration,
    Persistent,
}

impl DrawTraceType {
    /// Lifetime for primitives drawn with this type; `None` draws nothing
    pub fn lifetime(self, draw_time: f32) -> Option<DrawLifetime> {
        match self {
            Self::None => None,
            Self::ForOneFrame => Some(DrawLifetime::OneFrame),
            Self::ForDuration => Some(DrawLifetime::Duration(draw_time)),
            Self::Persistent => Some(DrawLifetime::Persistent),
        }
    }
}

/// Colors and lifetime used by the trace helpers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceDrawStyle {
    pub draw_type: DrawTraceType,
    /// Color up to the blocking hit, or of the whole trace on a miss
    pub trace_color: Color,
    /// Color past the blocking hit
    pub trace_hit_color: Color,
    /// Seconds, used with [`DrawTraceType::ForDuration`]
    pub draw_time: f32,
}

impl Default for TraceDrawStyle {
    fn default() -> Self {
        Self {
            draw_type: DrawTraceType::ForOneFrame,
            trace_color: Color::RED,
            trace_hit_color: Color::GREEN,
            draw_time: 5.0,
        }
    }
}

/// Something debug primitives can be drawn onto
pub trait DebugDraw {
    fn draw_line(&mut self, start: Vec3, end: Vec3, color: Color, lifetime: DrawLifetime);

    fn draw_point(&mut self, position: Vec3, size: f32, color: Color, lifetime: DrawLifetime);

    fn draw_capsule(
        &mut self,
        center: Vec3,
        half_height: f32,
        radius: f32,
        rotation: Quat,
        color: Color,
        lifetime: DrawLifetime,
    );
}

/// Draw a line trace in the trace color up to the hit and the hit color past it
pub fn draw_line_trace_single(
    draw: &mut dyn DebugDraw,
    start: Vec3,
    end: Vec3,
    hit: &TraceHit,
    style: &TraceDrawStyle,
) {
    let Some(lifetime) = style.draw_type.lifetime(style.draw_time) else {
        return;
    };

    if hit.blocking_hit {
        draw.draw_line(start, hit.impact_point, style.trace_color, lifetime);
        draw.draw_line(hit.impact_point, end, style.trace_hit_color, lifetime);
        draw.draw_point(
            hit.impact_point,
            IMPACT_POINT_SIZE,
            style.trace_color,
            lifetime,
        );
    } else {
        draw.draw_line(start, end, style.trace_color, lifetime);
    }
}

/// Draw a capsule sweep with capsules at the start, the hit location and the end
pub fn draw_capsule_trace_single(
    draw: &mut dyn DebugDraw,
    start: Vec3,
    end: Vec3,
    shape: CollisionShape,
    hit: &TraceHit,
    style: &TraceDrawStyle,
) {
    let Some(lifetime) = style.draw_type.lifetime(style.draw_time) else {
        return;
    };

    if hit.blocking_hit {
        draw_upright_capsule(draw, start, shape, style.trace_color, lifetime);
        draw_upright_capsule(draw, hit.location, shape, style.trace_color, lifetime);
        draw.draw_line(start, hit.location, style.trace_color, lifetime);
        draw.draw_point(
            hit.impact_point,
            IMPACT_POINT_SIZE,
            style.trace_color,
            lifetime,
        );

        draw_upright_capsule(draw, end, shape, style.trace_hit_color, lifetime);
        draw.draw_line(hit.location, end, style.trace_hit_color, lifetime);
    } else {
        draw_upright_capsule(draw, start, shape, style.trace_color, lifetime);
        draw_upright_capsule(draw, end, shape, style.trace_color, lifetime);
        draw.draw_line(start, end, style.trace_color, lifetime);
    }
}

fn draw_upright_capsule(
    draw: &mut dyn DebugDraw,
    center: Vec3,
    shape: CollisionShape,
    color: Color,
    lifetime: DrawLifetime,
) {
    draw.draw_capsule(
        center,
        shape.capsule_half_height(),
        shape.sphere_radius(),
        Quat::IDENTITY,
        color,
        lifetime,
    );
}

/// Draw a sphere sweep with spheres at the start, the hit location and the end
pub fn draw_sphere_trace_single(
    draw: &mut dyn DebugDraw,
    start: Vec3,
    end: Vec3,
    shape: CollisionShape,
    hit: &TraceHit,
    style: &TraceDrawStyle,
) {
    let Some(lifetime) = style.draw_type.lifetime(style.draw_time) else {
        return;
    };
    let radius = shape.sphere_radius();

    if hit.blocking_hit {
        draw_swept_sphere(
            draw,
            start,
            hit.location,
            radius,
            style.trace_color,
            lifetime,
        );
        draw_swept_sphere(
            draw,
            hit.location,
            end,
            radius,
            style.trace_hit_color,
            lifetime,
        );
        draw.draw_point(
            hit.impact_point,
            IMPACT_POINT_SIZE,
            style.trace_color,
            lifetime,
        );
    } else {
        draw_swept_sphere(draw, start, end, radius, style.trace_color, lifetime);
    }
}

/// A sphere swept from `start` to `end`, drawn as one capsule along the path
fn draw_swept_sphere(
    draw: &mut dyn DebugDraw,
    start: Vec3,
    end: Vec3,
    radius: f32,
    color: Color,
    lifetime: DrawLifetime,
) {
    let trace = end - start;
    let center = start + trace * 0.5;
    let half_height = trace.length() * 0.5 + radius;
    let rotation = match trace.try_normalize() {
        Some(direction) => Quat::from_rotation_arc(Vec3::Y, direction),
        None => Quat::IDENTITY,
    };
    draw.draw_capsule(center, half_height, radius, rotation, color, lifetime);
}

/// Shape of a recorded debug primitive
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DebugPrimitive {
    Line {
        start: Vec3,
        end: Vec3,
    },
    Point {
        position: Vec3,
        size: f32,
    },
    Capsule {
        center: Vec3,
        half_height: f32,
        radius: f32,
        rotation: Quat,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub primitive: DebugPrimitive,
    /// sRGB-encoded color
    pub rgba: [u8; 4],
    pub lifetime: DrawLifetime,
    age: f32,
}

/// Records primitives for a renderer and expires them as time passes
#[derive(Debug, Clone, Default)]
pub struct DrawBuffer {
    commands: Vec<DrawCommand>,
}

impl DrawBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live commands in submission order
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of live commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether nothing is left to draw
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Advance by `dt` seconds after a frame has been presented
    ///
    /// One-frame primitives are dropped, timed ones age out and persistent
    /// ones stay until [`DrawBuffer::clear`].
    pub fn tick(&mut self, dt: f32) {
        self.commands.retain_mut(|command| match command.lifetime {
            DrawLifetime::OneFrame => false,
            DrawLifetime::Duration(duration) => {
                command.age += dt;
                command.age < duration
            }
            DrawLifetime::Persistent => true,
        });
    }

    /// Drop every command, including persistent ones
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    fn push(&mut self, primitive: DebugPrimitive, color: Color, lifetime: DrawLifetime) {
        self.commands.push(DrawCommand {
            primitive,
            rgba: color.to_rgba8(true),
            lifetime,
            age: 0.0,
        });
    }
}

impl DebugDraw for DrawBuffer {
    fn draw_line(&mut self, start: Vec3, end: Vec3, color: Color, lifetime: DrawLifetime) {
        self.push(DebugPrimitive::Line { start, end }, color, lifetime);
    }

    fn draw_point(&mut self, position: Vec3, size: f32, color: Color, lifetime: DrawLifetime) {
        self.push(DebugPrimitive::Point { position, size }, color, lifetime);
    }

    fn draw_capsule(
        &mut self,
        center: Vec3,
        half_height: f32,
        radius: f32,
        rotation: Quat,
        color: Color,
        lifetime: DrawLifetime,
    ) {
        self.push(
            DebugPrimitive::Capsule {
                center,
                half_height,
                radius,
                rotation,
            },
            color,
            lifetime,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const GREEN: [u8; 4] = [0, 255, 0, 255];

    fn blocking_hit(location: Vec3, impact_point: Vec3) -> TraceHit {
        TraceHit {
            blocking_hit: true,
            location,
            impact_point,
            time: 0.5,
            collider: None,
        }
    }

    fn capsules(buffer: &DrawBuffer) -> Vec<&DrawCommand> {
        buffer
            .commands()
            .iter()
            .filter(|c| matches!(c.primitive, DebugPrimitive::Capsule { .. }))
            .collect()
    }

    #[test]
    fn test_trace_type_lifetime() {
        assert_eq!(DrawTraceType::None.lifetime(2.0), None);
        assert_eq!(
            DrawTraceType::ForOneFrame.lifetime(2.0),
            Some(DrawLifetime::OneFrame)
        );
        assert_eq!(
            DrawTraceType::ForDuration.lifetime(2.0),
            Some(DrawLifetime::Duration(2.0))
        );
        assert_eq!(
            DrawTraceType::Persistent.lifetime(2.0),
            Some(DrawLifetime::Persistent)
        );
    }

    #[test]
    fn test_none_draws_nothing() {
        let mut buffer = DrawBuffer::new();
        let style = TraceDrawStyle {
            draw_type: DrawTraceType::None,
            ..Default::default()
        };
        let hit = blocking_hit(Vec3::X, Vec3::X);
        draw_line_trace_single(&mut buffer, Vec3::ZERO, Vec3::X * 2.0, &hit, &style);
        draw_sphere_trace_single(
            &mut buffer,
            Vec3::ZERO,
            Vec3::X * 2.0,
            CollisionShape::Sphere { radius: 1.0 },
            &hit,
            &style,
        );
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_line_trace_miss_is_one_line() {
        let mut buffer = DrawBuffer::new();
        let end = Vec3::new(100.0, 0.0, 0.0);
        draw_line_trace_single(
            &mut buffer,
            Vec3::ZERO,
            end,
            &TraceHit::miss(end),
            &TraceDrawStyle::default(),
        );

        assert_eq!(buffer.len(), 1);
        let command = &buffer.commands()[0];
        assert_eq!(
            command.primitive,
            DebugPrimitive::Line {
                start: Vec3::ZERO,
                end
            }
        );
        assert_eq!(command.rgba, RED);
    }

    #[test]
    fn test_line_trace_hit_splits_at_impact() {
        let mut buffer = DrawBuffer::new();
        let impact = Vec3::new(40.0, 0.0, 0.0);
        let end = Vec3::new(100.0, 0.0, 0.0);
        draw_line_trace_single(
            &mut buffer,
            Vec3::ZERO,
            end,
            &blocking_hit(impact, impact),
            &TraceDrawStyle::default(),
        );

        let commands = buffer.commands();
        assert_eq!(commands.len(), 3);
        assert_eq!(
            commands[0].primitive,
            DebugPrimitive::Line {
                start: Vec3::ZERO,
                end: impact
            }
        );
        assert_eq!(commands[0].rgba, RED);
        assert_eq!(commands[1].primitive, DebugPrimitive::Line { start: impact, end });
        assert_eq!(commands[1].rgba, GREEN);
        assert_eq!(
            commands[2].primitive,
            DebugPrimitive::Point {
                position: impact,
                size: IMPACT_POINT_SIZE
            }
        );
    }

    #[test]
    fn test_capsule_trace_hit_draws_three_capsules() {
        let mut buffer = DrawBuffer::new();
        let shape = CollisionShape::Capsule {
            half_height: 90.0,
            radius: 40.0,
        };
        let end = Vec3::new(0.0, 0.0, 300.0);
        let hit = blocking_hit(Vec3::new(0.0, 0.0, 120.0), Vec3::new(0.0, 0.0, 160.0));
        draw_capsule_trace_single(
            &mut buffer,
            Vec3::ZERO,
            end,
            shape,
            &hit,
            &TraceDrawStyle::default(),
        );

        let drawn = capsules(&buffer);
        assert_eq!(drawn.len(), 3);
        assert_eq!(buffer.len(), 6);
        assert_eq!(drawn[2].rgba, GREEN);
        assert_eq!(
            drawn[1].primitive,
            DebugPrimitive::Capsule {
                center: hit.location,
                half_height: 90.0,
                radius: 40.0,
                rotation: Quat::IDENTITY
            }
        );
    }

    #[test]
    fn test_capsule_trace_miss() {
        let mut buffer = DrawBuffer::new();
        let end = Vec3::new(0.0, 0.0, 300.0);
        draw_capsule_trace_single(
            &mut buffer,
            Vec3::ZERO,
            end,
            CollisionShape::Capsule {
                half_height: 90.0,
                radius: 40.0,
            },
            &TraceHit::miss(end),
            &TraceDrawStyle::default(),
        );

        assert_eq!(capsules(&buffer).len(), 2);
        assert_eq!(buffer.len(), 3);
        assert!(buffer.commands().iter().all(|c| c.rgba == RED));
    }

    #[test]
    fn test_sphere_trace_is_swept_capsule() {
        let mut buffer = DrawBuffer::new();
        let end = Vec3::new(100.0, 0.0, 0.0);
        draw_sphere_trace_single(
            &mut buffer,
            Vec3::ZERO,
            end,
            CollisionShape::Sphere { radius: 10.0 },
            &TraceHit::miss(end),
            &TraceDrawStyle::default(),
        );

        assert_eq!(buffer.len(), 1);
        let DebugPrimitive::Capsule {
            center,
            half_height,
            radius,
            rotation,
        } = buffer.commands()[0].primitive
        else {
            panic!("expected a capsule");
        };
        assert_eq!(center, Vec3::new(50.0, 0.0, 0.0));
        assert_eq!(half_height, 60.0);
        assert_eq!(radius, 10.0);
        assert!((rotation * Vec3::Y).abs_diff_eq(Vec3::X, 1e-5));
    }

    #[test]
    fn test_sphere_trace_hit() {
        let mut buffer = DrawBuffer::new();
        let hit = blocking_hit(Vec3::new(30.0, 0.0, 0.0), Vec3::new(40.0, 0.0, 0.0));
        draw_sphere_trace_single(
            &mut buffer,
            Vec3::ZERO,
            Vec3::new(100.0, 0.0, 0.0),
            CollisionShape::Sphere { radius: 10.0 },
            &hit,
            &TraceDrawStyle::default(),
        );

        let commands = buffer.commands();
        assert_eq!(commands.len(), 3);
        assert_eq!(commands[0].rgba, RED);
        assert_eq!(commands[1].rgba, GREEN);
        assert_eq!(
            commands[2].primitive,
            DebugPrimitive::Point {
                position: hit.impact_point,
                size: IMPACT_POINT_SIZE
            }
        );
    }

    #[test]
    fn test_zero_length_sweep_is_upright() {
        let mut buffer = DrawBuffer::new();
        draw_swept_sphere(
            &mut buffer,
            Vec3::ONE,
            Vec3::ONE,
            5.0,
            Color::WHITE,
            DrawLifetime::OneFrame,
        );
        assert_eq!(
            buffer.commands()[0].primitive,
            DebugPrimitive::Capsule {
                center: Vec3::ONE,
                half_height: 5.0,
                radius: 5.0,
                rotation: Quat::IDENTITY
            }
        );
    }

    #[test]
    fn test_buffer_expiry() {
        let mut buffer = DrawBuffer::new();
        buffer.draw_line(Vec3::ZERO, Vec3::X, Color::RED, DrawLifetime::OneFrame);
        buffer.draw_line(Vec3::ZERO, Vec3::Y, Color::RED, DrawLifetime::Duration(0.5));
        buffer.draw_point(Vec3::ZERO, 4.0, Color::BLUE, DrawLifetime::Persistent);

        buffer.tick(0.25);
        assert_eq!(buffer.len(), 2);
        buffer.tick(0.25);
        assert_eq!(buffer.len(), 1);
        buffer.tick(100.0);
        assert_eq!(buffer.len(), 1);

        buffer.clear();
        assert!(buffer.is_empty());
    }
}
