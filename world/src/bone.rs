//! Bone projectile: scripted flight along a three-point arc.
//!
//! A bone is not a reactive state machine. Activation fixes a Catmull-Rom
//! spline from the launch position, over a midpoint raised above the line of
//! flight, down to the ground at the thrower's frozen target distance; each
//! tick advances linear progress along that curve until it completes.

use std::time::Duration;

use pantheon_siege_core::{AgentId, WorldPoint};

use crate::pool::Pooled;

pub(crate) const FLIGHT_DURATION: Duration = Duration::from_millis(1_300);
const ARC_RISE: f32 = 30.0;

#[derive(Debug)]
pub(crate) struct Bone {
    pub(crate) id: AgentId,
    pub(crate) position: WorldPoint,
    origin: WorldPoint,
    control: WorldPoint,
    target: WorldPoint,
    elapsed: Duration,
}

impl Pooled for Bone {
    fn id(&self) -> AgentId {
        self.id
    }
}

impl Bone {
    /// Fixes the flight arc from the launch position toward the frozen
    /// horizontal reach, landing on the ground line.
    pub(crate) fn launch(id: AgentId, origin: WorldPoint, reach: f32, ground_y: f32) -> Self {
        Self {
            id,
            position: origin,
            origin,
            control: origin.offset(-reach / 2.0, -ARC_RISE),
            target: WorldPoint::new(origin.x() - reach, ground_y),
            elapsed: Duration::ZERO,
        }
    }

    /// Normalized flight progress in `[0, 1]`.
    pub(crate) fn progress(&self) -> f32 {
        (self.elapsed.as_secs_f32() / FLIGHT_DURATION.as_secs_f32()).min(1.0)
    }

    /// Advances the flight, returning true once the arc completes.
    pub(crate) fn advance(&mut self, dt: Duration) -> bool {
        self.elapsed = self.elapsed.saturating_add(dt);
        let t = self.progress();
        self.position = sample_spline(self.origin, self.control, self.target, t);
        t >= 1.0
    }
}

/// Samples the spline through the three control points at `t` in `[0, 1]`.
///
/// Endpoint tangents are clamped by duplicating the terminal points, matching
/// a spline fitted through exactly three knots.
fn sample_spline(origin: WorldPoint, control: WorldPoint, target: WorldPoint, t: f32) -> WorldPoint {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        segment(origin, origin, control, target, t * 2.0)
    } else {
        segment(origin, control, target, target, (t - 0.5) * 2.0)
    }
}

fn segment(p0: WorldPoint, p1: WorldPoint, p2: WorldPoint, p3: WorldPoint, t: f32) -> WorldPoint {
    WorldPoint::new(
        catmull_rom(p0.x(), p1.x(), p2.x(), p3.x(), t),
        catmull_rom(p0.y(), p1.y(), p2.y(), p3.y(), t),
    )
}

fn catmull_rom(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * ((2.0 * p1)
        + (p2 - p0) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (3.0 * p1 - p0 - 3.0 * p2 + p3) * t3)
}

#[cfg(test)]
mod tests {
    use super::{Bone, FLIGHT_DURATION};
    use pantheon_siege_core::{AgentId, WorldPoint};
    use std::time::Duration;

    #[test]
    fn flight_starts_at_the_launch_position() {
        let origin = WorldPoint::new(200.0, 140.0);
        let bone = Bone::launch(AgentId::new(1), origin, 80.0, 170.0);
        assert_eq!(bone.position, origin);
        assert_eq!(bone.progress(), 0.0);
    }

    #[test]
    fn flight_lands_at_the_frozen_reach_on_the_ground_line() {
        let origin = WorldPoint::new(200.0, 140.0);
        let mut bone = Bone::launch(AgentId::new(1), origin, 80.0, 170.0);

        assert!(bone.advance(FLIGHT_DURATION));
        assert!((bone.position.x() - 120.0).abs() < 1e-3);
        assert!((bone.position.y() - 170.0).abs() < 1e-3);
        assert_eq!(bone.progress(), 1.0);
    }

    #[test]
    fn midpoint_rises_above_the_launch_height() {
        let origin = WorldPoint::new(200.0, 140.0);
        let mut bone = Bone::launch(AgentId::new(1), origin, 80.0, 170.0);

        assert!(!bone.advance(FLIGHT_DURATION / 2));
        assert!(bone.position.y() < origin.y());
    }

    #[test]
    fn leftward_and_rightward_reaches_mirror() {
        let origin = WorldPoint::new(160.0, 140.0);
        let mut left = Bone::launch(AgentId::new(1), origin, 60.0, 170.0);
        let mut right = Bone::launch(AgentId::new(2), origin, -60.0, 170.0);

        assert!(left.advance(FLIGHT_DURATION));
        assert!(right.advance(FLIGHT_DURATION));
        assert!((left.position.x() - 100.0).abs() < 1e-3);
        assert!((right.position.x() - 220.0).abs() < 1e-3);
    }
}
