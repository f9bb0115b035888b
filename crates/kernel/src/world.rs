use serde::{Deserialize, Serialize};
use squash_common::BodyId;

use crate::body::{Body, Contact};
use crate::config::SimConfig;
use crate::scene::Scene;

/// A record produced while stepping the world.
///
/// The driver drains these each frame for tracing and the inspector; the
/// world never reads them back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorldEvent {
    /// `body` was pushed out of `other`.
    Resolved {
        tick: u64,
        body: BodyId,
        other: BodyId,
        contact: Contact,
    },
    /// A full step completed.
    Stepped { tick: u64, resolutions: usize },
}

/// Counters for a single [`World::step`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    pub tick: u64,
    /// Ordered pairs `(i, j)` checked in the resolution pass.
    pub pairs_checked: usize,
    /// Pairs that overlapped and were resolved.
    pub resolutions: usize,
}

/// Ordered set of bodies advanced one tick at a time.
///
/// Body order is insertion order and is the order contacts are resolved in,
/// which decides the outcome when a body overlaps several others at once.
#[derive(Debug, Clone, Default)]
pub struct World {
    bodies: Vec<Body>,
    config: SimConfig,
    tick: u64,
    event_log: Vec<WorldEvent>,
}

impl World {
    /// Create an empty world at tick 0.
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn with_bodies(config: SimConfig, bodies: Vec<Body>) -> Self {
        Self {
            bodies,
            config,
            ..Default::default()
        }
    }

    /// Build a world from a scene description.
    pub fn from_scene(scene: &Scene) -> Self {
        Self::with_bodies(scene.config, scene.bodies())
    }

    /// Append a body. Returns its stable id.
    pub fn push(&mut self, body: Body) -> BodyId {
        self.bodies.push(body);
        BodyId(self.bodies.len() - 1)
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.index())
    }

    /// Mutable access for setup and tests. Not used by the step itself.
    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(id.index())
    }

    /// Iterate bodies with their ids, in resolution order.
    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &Body)> {
        self.bodies.iter().enumerate().map(|(i, b)| (BodyId(i), b))
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Number of bodies with non-zero mass.
    pub fn movable_count(&self) -> usize {
        self.bodies.iter().filter(|b| !b.is_static()).count()
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[WorldEvent] {
        &self.event_log
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Advance the simulation by one tick.
    ///
    /// First every movable body is integrated and its squeeze relaxed. Then
    /// each movable body `i` is resolved against every other body `j` in
    /// ascending index order, once. A push is visible to the checks that
    /// follow it in the same pass; there is no iteration to convergence.
    pub fn step(&mut self) -> StepStats {
        self.tick += 1;
        let _span = tracing::trace_span!("world_step", tick = self.tick).entered();

        for body in &mut self.bodies {
            body.integrate(&self.config);
        }

        let mut stats = StepStats {
            tick: self.tick,
            ..Default::default()
        };

        for i in 0..self.bodies.len() {
            if self.bodies[i].is_static() {
                continue;
            }
            for j in 0..self.bodies.len() {
                if i == j {
                    continue;
                }
                stats.pairs_checked += 1;

                // `reflect` only mutates the receiver, so a copy of the
                // obstacle is exact.
                let other = self.bodies[j];
                if let Some(contact) = self.bodies[i].reflect(&other, &self.config) {
                    stats.resolutions += 1;
                    tracing::trace!(
                        body = i,
                        other = j,
                        axis = ?contact.axis,
                        depth = contact.depth,
                        "resolved contact"
                    );
                    self.event_log.push(WorldEvent::Resolved {
                        tick: self.tick,
                        body: BodyId(i),
                        other: BodyId(j),
                        contact,
                    });
                }
            }
        }

        self.event_log.push(WorldEvent::Stepped {
            tick: self.tick,
            resolutions: stats.resolutions,
        });
        tracing::debug!(
            tick = self.tick,
            pairs = stats.pairs_checked,
            resolutions = stats.resolutions,
            "stepped"
        );
        stats
    }

    /// Deterministic FNV-1a hash over the tick and every body's state.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325;
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        mix(&mut h, &self.tick.to_le_bytes());
        for body in &self.bodies {
            for v in [
                body.position,
                body.velocity,
                body.acceleration,
                body.half_extents,
            ] {
                mix(&mut h, &v.x.to_le_bytes());
                mix(&mut h, &v.y.to_le_bytes());
            }
            mix(&mut h, &body.mass.to_le_bytes());
            mix(&mut h, &body.squeeze.to_le_bytes());
            mix(&mut h, &body.squeeze_timer.to_le_bytes());
        }
        h
    }
}
