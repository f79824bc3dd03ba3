//! Line and shape traces against the collision world

use glam::Vec3;
use rapier3d::parry::query::ShapeCastOptions;
use rapier3d::parry::shape::{Ball, Capsule, Shape};
use rapier3d::prelude::*;

use crate::PhysicsWorld;

/// Shape swept by a trace
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollisionShape {
    Line,
    Sphere { radius: f32 },
    /// Y-aligned capsule
    Capsule { half_height: f32, radius: f32 },
}

impl CollisionShape {
    /// Radius of the rounded part, zero for lines
    pub fn sphere_radius(&self) -> f32 {
        match *self {
            Self::Sphere { radius } | Self::Capsule { radius, .. } => radius,
            Self::Line => 0.0,
        }
    }

    /// Half height including hemispheres; a sphere is its own radius
    pub fn capsule_half_height(&self) -> f32 {
        match *self {
            Self::Capsule { half_height, .. } => half_height,
            Self::Sphere { radius } => radius,
            Self::Line => 0.0,
        }
    }
}

/// Result of a trace
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceHit {
    /// Whether the trace was stopped by a collider
    pub blocking_hit: bool,
    /// Where the traced shape's center came to rest
    pub location: Vec3,
    /// Approximate contact point on the hit surface
    pub impact_point: Vec3,
    /// Fraction of the trace travelled before the hit (1.0 on a miss)
    pub time: f32,
    pub collider: Option<ColliderHandle>,
}

impl TraceHit {
    /// A trace that reached `end` unobstructed
    pub fn miss(end: Vec3) -> Self {
        Self {
            blocking_hit: false,
            location: end,
            impact_point: end,
            time: 1.0,
            collider: None,
        }
    }
}

impl PhysicsWorld {
    /// Trace a line from `start` to `end`
    pub fn line_trace(&self, start: Vec3, end: Vec3, filter: QueryFilter) -> TraceHit {
        let delta = end - start;
        if delta == Vec3::ZERO {
            return TraceHit::miss(end);
        }

        let ray = Ray::new(
            point![start.x, start.y, start.z],
            vector![delta.x, delta.y, delta.z],
        );
        match self.query_pipeline().cast_ray(
            &self.rigid_body_set,
            &self.collider_set,
            &ray,
            1.0,
            true,
            filter,
        ) {
            Some((handle, time)) => {
                let location = start + delta * time;
                TraceHit {
                    blocking_hit: true,
                    location,
                    impact_point: location,
                    time,
                    collider: Some(handle),
                }
            }
            None => TraceHit::miss(end),
        }
    }

    /// Sweep a sphere from `start` to `end`
    pub fn sphere_trace(
        &self,
        start: Vec3,
        end: Vec3,
        radius: f32,
        filter: QueryFilter,
    ) -> TraceHit {
        self.sweep_trace(start, end, CollisionShape::Sphere { radius }, filter)
    }

    /// Sweep an upright capsule from `start` to `end`
    pub fn capsule_trace(
        &self,
        start: Vec3,
        end: Vec3,
        half_height: f32,
        radius: f32,
        filter: QueryFilter,
    ) -> TraceHit {
        self.sweep_trace(
            start,
            end,
            CollisionShape::Capsule {
                half_height,
                radius,
            },
            filter,
        )
    }

    /// Sweep `shape` from `start` to `end`
    pub fn sweep_trace(
        &self,
        start: Vec3,
        end: Vec3,
        shape: CollisionShape,
        filter: QueryFilter,
    ) -> TraceHit {
        let delta = end - start;
        let ball;
        let capsule;
        let swept: &dyn Shape = match shape {
            CollisionShape::Line => return self.line_trace(start, end, filter),
            CollisionShape::Sphere { radius } => {
                ball = Ball::new(radius);
                &ball
            }
            CollisionShape::Capsule {
                half_height,
                radius,
            } => {
                capsule = Capsule::new_y((half_height - radius).max(0.0), radius);
                &capsule
            }
        };

        let shape_pos = Isometry::translation(start.x, start.y, start.z);
        let shape_vel = vector![delta.x, delta.y, delta.z];
        let hit = self.query_pipeline().cast_shape(
            &self.rigid_body_set,
            &self.collider_set,
            &shape_pos,
            &shape_vel,
            swept,
            ShapeCastOptions::with_max_time_of_impact(1.0),
            filter,
        );

        match hit {
            Some((handle, cast)) => {
                let time = cast.time_of_impact;
                let location = start + delta * time;
                let impact_point = location + delta.normalize_or_zero() * shape.sphere_radius();
                TraceHit {
                    blocking_hit: true,
                    location,
                    impact_point,
                    time,
                    collider: Some(handle),
                }
            }
            None => TraceHit::miss(end),
        }
    }
}
