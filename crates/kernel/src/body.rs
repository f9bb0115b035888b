use glam::Vec2;
use serde::{Deserialize, Serialize};
use squash_common::Color;

use crate::config::SimConfig;

/// Whether a body takes part in integration and can be pushed.
///
/// Never stored: always derived from [`Body::mass`], so the two cannot drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// Has mass; integrated every tick, rendered as a squeezable ellipse.
    Dynamic,
    /// Zero mass; never moves, never deforms, rendered as a filled rect.
    Static,
}

/// Axis along which a contact was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

/// Outcome of a single [`Body::reflect`] call that pushed the body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// Axis of minimum penetration.
    pub axis: Axis,
    /// Penetration depth on that axis before the push.
    pub depth: f32,
    /// `+1.0` or `-1.0`: the direction the body was pushed along `axis`.
    pub direction: f32,
    /// Share of `depth` applied to the body.
    pub factor: f32,
    /// Whether the velocity component on `axis` was inverted.
    pub bounced: bool,
}

impl Contact {
    /// Distance the body was moved.
    pub fn correction(&self) -> f32 {
        self.depth * self.factor
    }
}

/// One simulated axis-aligned box.
///
/// Position is the box center; `half_extents` are the half width and half
/// height of its bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub half_extents: Vec2,
    /// Zero means immovable.
    pub mass: f32,
    /// Visual deformation in `(0, 1]`; 1.0 is undeformed.
    pub squeeze: f32,
    /// Ticks of relaxation left before `squeeze` snaps back to 1.0.
    pub squeeze_timer: u32,
    pub color: Color,
}

impl Body {
    /// A movable body at rest with the given mass.
    pub fn dynamic(position: Vec2, half_extents: Vec2, mass: f32) -> Self {
        debug_assert!(mass > 0.0, "dynamic body needs positive mass");
        Self::with_mass(position, half_extents, mass)
    }

    /// An immovable body (mass 0).
    pub fn fixed(position: Vec2, half_extents: Vec2) -> Self {
        Self::with_mass(position, half_extents, 0.0)
    }

    fn with_mass(position: Vec2, half_extents: Vec2, mass: f32) -> Self {
        debug_assert!(
            half_extents.x > 0.0 && half_extents.y > 0.0,
            "half extents must be positive"
        );
        Self {
            position,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            half_extents,
            mass,
            squeeze: 1.0,
            squeeze_timer: 0,
            color: Color::BLACK,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_acceleration(mut self, acceleration: Vec2) -> Self {
        self.acceleration = acceleration;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn kind(&self) -> BodyKind {
        if self.is_static() {
            BodyKind::Static
        } else {
            BodyKind::Dynamic
        }
    }

    pub fn is_static(&self) -> bool {
        self.mass == 0.0
    }

    pub fn half_width(&self) -> f32 {
        self.half_extents.x
    }

    pub fn half_height(&self) -> f32 {
        self.half_extents.y
    }

    /// Top-left corner of the bounding box.
    pub fn min(&self) -> Vec2 {
        self.position - self.half_extents
    }

    /// Bottom-right corner of the bounding box.
    pub fn max(&self) -> Vec2 {
        self.position + self.half_extents
    }

    /// Strict AABB intersection test. Boxes that only touch do not overlap.
    pub fn overlaps(&self, other: &Body) -> bool {
        let (a, b) = (self, other);
        a.position.x - a.half_extents.x < b.position.x + b.half_extents.x
            && a.position.x + a.half_extents.x > b.position.x - b.half_extents.x
            && a.position.y - a.half_extents.y < b.position.y + b.half_extents.y
            && a.position.y + a.half_extents.y > b.position.y - b.half_extents.y
    }

    /// Penetration depth on each axis. Only meaningful when the boxes overlap.
    pub fn penetration(&self, other: &Body) -> Vec2 {
        let diff = self.position - other.position;
        (self.half_extents + other.half_extents) - diff.abs()
    }

    /// Semi-implicit Euler step plus squeeze relaxation. Static bodies are
    /// left untouched.
    pub fn integrate(&mut self, config: &SimConfig) {
        if self.is_static() {
            return;
        }

        self.velocity += self.acceleration;
        self.position += self.velocity;

        if self.squeeze_timer > 0 {
            self.squeeze_timer -= 1;
            self.squeeze += (1.0 - self.squeeze) * config.squeeze_relax;
        } else {
            self.squeeze = 1.0;
        }
    }

    /// Push `self` out of `other` along the axis of least penetration.
    ///
    /// Only `self` is mutated. A movable obstacle takes `config.pair_split` of
    /// the depth, an immovable one the full depth. The velocity component on
    /// the resolved axis is inverted when it still points into `other`.
    /// Equal depths resolve on Y.
    pub fn reflect(&mut self, other: &Body, config: &SimConfig) -> Option<Contact> {
        if !self.overlaps(other) {
            return None;
        }

        let diff = self.position - other.position;
        let overlap = (self.half_extents + other.half_extents) - diff.abs();
        let dir = Vec2::new(unit_sign(diff.x), unit_sign(diff.y));
        let factor = if other.is_static() {
            1.0
        } else {
            config.pair_split
        };

        let contact = if overlap.x < overlap.y {
            self.position.x += dir.x * overlap.x * factor;
            let bounced = dir.x * self.velocity.x < 0.0;
            if bounced {
                self.velocity.x = -self.velocity.x;
            }
            Contact {
                axis: Axis::X,
                depth: overlap.x,
                direction: dir.x,
                factor,
                bounced,
            }
        } else {
            self.position.y += dir.y * overlap.y * factor;
            let bounced = dir.y * self.velocity.y < 0.0;
            if bounced {
                self.velocity.y = -self.velocity.y;
            }
            Contact {
                axis: Axis::Y,
                depth: overlap.y,
                direction: dir.y,
                factor,
                bounced,
            }
        };

        self.squeeze = config.squeeze_impact;
        self.squeeze_timer = config.squeeze_ticks;
        Some(contact)
    }
}

/// `-1.0` for negative values, `+1.0` otherwise (zero included).
fn unit_sign(v: f32) -> f32 {
    if v < 0.0 { -1.0 } else { 1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ball(x: f32, y: f32, r: f32) -> Body {
        Body::dynamic(Vec2::new(x, y), Vec2::splat(r), 1.0)
    }

    #[test]
    fn kind_follows_mass() {
        assert_eq!(ball(0.0, 0.0, 1.0).kind(), BodyKind::Dynamic);
        let wall = Body::fixed(Vec2::ZERO, Vec2::new(5.0, 1.0));
        assert_eq!(wall.kind(), BodyKind::Static);

        let mut pinned = ball(0.0, 0.0, 1.0);
        pinned.mass = 0.0;
        assert_eq!(pinned.kind(), BodyKind::Static);
    }

    #[test]
    fn overlapping_boxes_detected() {
        let a = ball(0.0, 0.0, 10.0);
        let b = ball(15.0, 5.0, 10.0);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn separated_on_one_axis_is_not_overlap() {
        let a = ball(0.0, 0.0, 10.0);
        let b = ball(5.0, 30.0, 10.0);
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn touching_edges_of_unequal_boxes_do_not_overlap() {
        // a spans x in [-10, 10]; b (half width 4) spans [10, 18].
        let a = ball(0.0, 0.0, 10.0);
        let b = Body::dynamic(Vec2::new(14.0, 3.0), Vec2::new(4.0, 2.0), 1.0);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));

        // Same on the y axis: b spans y in [10, 14].
        let c = Body::dynamic(Vec2::new(3.0, 12.0), Vec2::new(4.0, 2.0), 1.0);
        assert!(!a.overlaps(&c));
        assert!(!c.overlaps(&a));

        // Nudged inside by a hair, both orders report the overlap.
        let d = Body::dynamic(Vec2::new(13.9, 3.0), Vec2::new(4.0, 2.0), 1.0);
        assert!(a.overlaps(&d));
        assert!(d.overlaps(&a));
    }

    #[test]
    fn contained_box_overlaps() {
        let big = ball(0.0, 0.0, 50.0);
        let small = ball(3.0, -4.0, 1.0);
        assert!(big.overlaps(&small));
        assert!(small.overlaps(&big));
    }

    #[test]
    fn integrate_is_semi_implicit() {
        let config = SimConfig::default();
        let mut b = ball(10.0, 10.0, 1.0)
            .with_velocity(Vec2::new(2.0, 1.0))
            .with_acceleration(Vec2::new(0.0, 0.2));
        b.integrate(&config);
        assert_eq!(b.velocity, Vec2::new(2.0, 1.0 + 0.2));
        assert_eq!(b.position, Vec2::new(10.0, 10.0) + Vec2::new(2.0, 1.0 + 0.2));
    }

    #[test]
    fn integrate_skips_static() {
        let config = SimConfig::default();
        let mut wall = Body::fixed(Vec2::new(1.0, 2.0), Vec2::splat(3.0))
            .with_velocity(Vec2::new(5.0, 5.0))
            .with_acceleration(Vec2::new(0.0, 1.0));
        wall.squeeze = 0.5;
        wall.squeeze_timer = 3;
        let before = wall;
        wall.integrate(&config);
        assert_eq!(wall, before);
    }

    #[test]
    fn reflect_without_overlap_is_noop() {
        let config = SimConfig::default();
        let mut a = ball(0.0, 0.0, 1.0).with_velocity(Vec2::new(1.0, 1.0));
        let b = ball(10.0, 10.0, 1.0);
        let before = a;
        assert!(a.reflect(&b, &config).is_none());
        assert_eq!(a, before);
    }

    #[test]
    fn reflect_against_static_pushes_full_depth() {
        let config = SimConfig::default();
        // Overlap x = 20 - 15 = 5, y = 30 - 0 = 30: resolve on x.
        let mut a = ball(0.0, 0.0, 10.0).with_velocity(Vec2::new(3.0, 1.0));
        let wall = Body::fixed(Vec2::new(15.0, 0.0), Vec2::new(10.0, 20.0));

        let contact = a.reflect(&wall, &config).unwrap();
        assert_eq!(contact.axis, Axis::X);
        assert_eq!(contact.depth, 5.0);
        assert_eq!(contact.direction, -1.0);
        assert_eq!(contact.factor, 1.0);
        assert!(contact.bounced);
        assert_eq!(a.position, Vec2::new(-5.0, 0.0));
        assert_eq!(a.velocity, Vec2::new(-3.0, 1.0));
        assert!(!a.overlaps(&wall));
    }

    #[test]
    fn reflect_keeps_velocity_already_leaving() {
        let config = SimConfig::default();
        let mut a = ball(0.0, 0.0, 10.0).with_velocity(Vec2::new(-3.0, 0.0));
        let wall = Body::fixed(Vec2::new(15.0, 0.0), Vec2::new(10.0, 20.0));
        let contact = a.reflect(&wall, &config).unwrap();
        assert!(!contact.bounced);
        assert_eq!(a.velocity, Vec2::new(-3.0, 0.0));
    }

    #[test]
    fn reflect_between_movable_bodies_splits_depth() {
        let config = SimConfig::default();
        let mut a = ball(0.0, 0.0, 10.0);
        let b = ball(0.0, 16.0, 10.0);
        let before = a.penetration(&b).y;
        assert_eq!(before, 4.0);

        let contact = a.reflect(&b, &config).unwrap();
        assert_eq!(contact.axis, Axis::Y);
        assert_eq!(contact.factor, 0.5);
        assert_eq!(contact.correction(), 2.0);
        assert_eq!(a.penetration(&b).y, before - before * 0.5);
    }

    #[test]
    fn both_sides_each_halve_the_remaining_depth() {
        let config = SimConfig::default();
        let mut a = ball(0.0, 0.0, 10.0);
        let mut b = ball(12.0, 0.0, 10.0);
        let initial = a.penetration(&b).x;

        a.reflect(&b, &config).unwrap();
        let after_a = a.penetration(&b).x;
        assert_eq!(after_a, initial - initial * 0.5);

        b.reflect(&a, &config).unwrap();
        let after_b = b.penetration(&a).x;
        assert_eq!(after_b, after_a - after_a * 0.5);
        assert_eq!(a.position.x, -4.0);
        assert_eq!(b.position.x, 14.0);
    }

    #[test]
    fn equal_depths_resolve_on_y() {
        let config = SimConfig::default();
        let mut a = ball(0.0, 0.0, 10.0).with_velocity(Vec2::new(1.0, 1.0));
        let wall = Body::fixed(Vec2::new(15.0, 15.0), Vec2::splat(10.0));
        let p = a.penetration(&wall);
        assert_eq!(p.x, p.y);

        let contact = a.reflect(&wall, &config).unwrap();
        assert_eq!(contact.axis, Axis::Y);
        assert_eq!(a.position, Vec2::new(0.0, -5.0));
        assert_eq!(a.velocity, Vec2::new(1.0, -1.0));
    }

    #[test]
    fn coincident_centers_push_positive() {
        let config = SimConfig::default();
        let mut a = ball(0.0, 0.0, 10.0);
        let wall = Body::fixed(Vec2::ZERO, Vec2::new(20.0, 10.0));
        // x depth 30 > y depth 20: resolve on y, sign of zero is +1.
        let contact = a.reflect(&wall, &config).unwrap();
        assert_eq!(contact.axis, Axis::Y);
        assert_eq!(contact.direction, 1.0);
        assert_eq!(a.position, Vec2::new(0.0, 20.0));
    }

    #[test]
    fn reflect_never_touches_other() {
        let config = SimConfig::default();
        let mut a = ball(0.0, 0.0, 10.0);
        let b = ball(5.0, 5.0, 10.0).with_velocity(Vec2::new(1.0, 0.0));
        let snapshot = b;
        a.reflect(&b, &config);
        assert_eq!(b, snapshot);
    }

    #[test]
    fn reflect_sets_squeeze_from_config() {
        let config = SimConfig {
            squeeze_impact: 0.5,
            squeeze_ticks: 3,
            ..SimConfig::default()
        };
        let mut a = ball(0.0, 0.0, 10.0);
        a.squeeze = 0.93;
        a.squeeze_timer = 1;
        let wall = Body::fixed(Vec2::new(0.0, 15.0), Vec2::splat(10.0));
        a.reflect(&wall, &config).unwrap();
        assert_eq!(a.squeeze, 0.5);
        assert_eq!(a.squeeze_timer, 3);
    }

    #[test]
    fn squeeze_relaxes_then_snaps_to_rest() {
        let config = SimConfig::default();
        let mut a = ball(0.0, 0.0, 1.0);
        a.squeeze = 0.8;
        a.squeeze_timer = 2;

        a.integrate(&config);
        let s1 = 0.8 + (1.0 - 0.8) * 0.2;
        assert_eq!(a.squeeze, s1);
        assert_eq!(a.squeeze_timer, 1);

        a.integrate(&config);
        let s2 = s1 + (1.0 - s1) * 0.2;
        assert_eq!(a.squeeze, s2);
        assert_eq!(a.squeeze_timer, 0);

        a.integrate(&config);
        assert_eq!(a.squeeze, 1.0);
    }
}
