//! Vector response curve keyed by mapped speed

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A single curve key
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    /// Mapped speed this key sits at
    pub time: f32,
    /// x = acceleration, y = braking deceleration, z = ground friction
    pub value: Vec3,
}

/// Piecewise-linear vector curve
///
/// Keys are kept sorted by time. Outside the key range the curve holds the first
/// or last value; an empty curve evaluates to zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<CurveKey>", into = "Vec<CurveKey>")]
pub struct SpeedCurve {
    keys: Vec<CurveKey>,
}

impl SpeedCurve {
    pub fn new(keys: impl IntoIterator<Item = CurveKey>) -> Self {
        let mut keys: Vec<CurveKey> = keys.into_iter().collect();
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys }
    }

    /// Build from `(time, value)` pairs
    pub fn from_points(points: &[(f32, Vec3)]) -> Self {
        Self::new(points.iter().map(|&(time, value)| CurveKey { time, value }))
    }

    /// Keys sorted by time
    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Sample the curve at `time`
    ///
    /// A NaN `time` yields a NaN vector.
    pub fn evaluate(&self, time: f32) -> Vec3 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return Vec3::ZERO;
        };
        if time.is_nan() {
            return Vec3::NAN;
        }

        if time <= first.time || self.keys.len() == 1 {
            return first.value;
        }
        if time >= last.time {
            return last.value;
        }

        // First key strictly after `time`; clamped for keys with NaN times
        let upper = self
            .keys
            .partition_point(|k| k.time <= time)
            .clamp(1, self.keys.len() - 1);
        let a = self.keys[upper - 1];
        let b = self.keys[upper];
        let span = b.time - a.time;
        if span <= 0.0 {
            return b.value;
        }
        a.value.lerp(b.value, (time - a.time) / span)
    }
}

impl From<Vec<CurveKey>> for SpeedCurve {
    fn from(keys: Vec<CurveKey>) -> Self {
        Self::new(keys)
    }
}

impl From<SpeedCurve> for Vec<CurveKey> {
    fn from(curve: SpeedCurve) -> Self {
        curve.keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve() -> SpeedCurve {
        SpeedCurve::from_points(&[
            (3.0, Vec3::new(400.0, 800.0, 2.0)),
            (0.0, Vec3::new(2000.0, 2000.0, 8.0)),
            (1.0, Vec3::new(1000.0, 1000.0, 6.0)),
        ])
    }

    #[test]
    fn test_keys_sorted() {
        let times: Vec<f32> = curve().keys().iter().map(|k| k.time).collect();
        assert_eq!(times, vec![0.0, 1.0, 3.0]);
    }

    #[test]
    fn test_interpolates_between_keys() {
        let value = curve().evaluate(2.0);
        assert!((value.x - 700.0).abs() < 1e-3);
        assert!((value.y - 900.0).abs() < 1e-3);
        assert!((value.z - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_clamps_outside_range() {
        let c = curve();
        assert_eq!(c.evaluate(-1.0), Vec3::new(2000.0, 2000.0, 8.0));
        assert_eq!(c.evaluate(10.0), Vec3::new(400.0, 800.0, 2.0));
        assert_eq!(c.evaluate(1.0), Vec3::new(1000.0, 1000.0, 6.0));
    }

    #[test]
    fn test_empty_curve_is_zero() {
        assert_eq!(SpeedCurve::default().evaluate(1.5), Vec3::ZERO);
    }

    #[test]
    fn test_nan_time_yields_nan() {
        assert!(curve().evaluate(f32::NAN).is_nan());
    }

    #[test]
    fn test_nan_key_times_stay_in_bounds() {
        let c = SpeedCurve::from_points(&[
            (0.0, Vec3::ONE),
            (f32::NAN, Vec3::ZERO),
            (2.0, Vec3::splat(3.0)),
        ]);
        assert_eq!(c.keys().len(), 3);
        let _ = c.evaluate(1.0);
        let _ = c.evaluate(5.0);

        let lone = SpeedCurve::from_points(&[(f32::NAN, Vec3::ONE)]);
        assert_eq!(lone.evaluate(1.0), Vec3::ONE);
    }
}
