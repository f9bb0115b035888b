use glam::Vec2;
use squash_common::{BodyId, Color};
use squash_kernel::{BodyKind, World, WorldEvent};
use std::collections::BTreeMap;

/// World inspector for developer tooling.
///
/// Provides read-only queries against the world state for debugging and the
/// development UI.
pub struct WorldInspector;

impl WorldInspector {
    /// Produce a summary of the world state.
    pub fn summary(world: &World) -> WorldSummary {
        let movable = world.bodies().iter().filter(|b| !b.is_static());
        let (mut squeezed, mut kinetic_energy) = (0, 0.0);
        for b in movable {
            if b.squeeze_timer > 0 {
                squeezed += 1;
            }
            kinetic_energy += 0.5 * b.mass * b.velocity.length_squared();
        }
        WorldSummary {
            tick: world.tick(),
            body_count: world.len(),
            movable_count: world.movable_count(),
            squeezed_count: squeezed,
            kinetic_energy,
            pending_events: world.events().len(),
        }
    }

    /// Snapshot of a single body, if the id is valid.
    pub fn inspect_body(world: &World, id: BodyId) -> Option<BodyInfo> {
        world.get(id).map(|b| BodyInfo {
            id,
            kind: b.kind(),
            position: b.position,
            velocity: b.velocity,
            half_extents: b.half_extents,
            mass: b.mass,
            squeeze: b.squeeze,
            squeeze_timer: b.squeeze_timer,
            color: b.color,
        })
    }

    /// All body ids in resolution order.
    pub fn list_bodies(world: &World) -> Vec<BodyId> {
        world.iter().map(|(id, _)| id).collect()
    }

    /// How many times each body was pushed, over the given events.
    pub fn contact_counts(events: &[WorldEvent]) -> BTreeMap<BodyId, usize> {
        let mut counts = BTreeMap::new();
        for event in events {
            if let WorldEvent::Resolved { body, .. } = event {
                *counts.entry(*body).or_insert(0) += 1;
            }
        }
        counts
    }
}

/// Summary of world state for the inspector.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldSummary {
    pub tick: u64,
    pub body_count: usize,
    pub movable_count: usize,
    /// Movable bodies whose squeeze is still relaxing.
    pub squeezed_count: usize,
    /// `Σ ½ m |v|²` over movable bodies.
    pub kinetic_energy: f32,
    pub pending_events: usize,
}

impl std::fmt::Display for WorldSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "World: tick={} bodies={} movable={} squeezed={} ke={:.2} pending_events={}",
            self.tick,
            self.body_count,
            self.movable_count,
            self.squeezed_count,
            self.kinetic_energy,
            self.pending_events
        )
    }
}

/// Detailed info about a single body.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyInfo {
    pub id: BodyId,
    pub kind: BodyKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub half_extents: Vec2,
    pub mass: f32,
    pub squeeze: f32,
    pub squeeze_timer: u32,
    pub color: Color,
}

impl std::fmt::Display for BodyInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Body [{}] {:?} pos=({:.2}, {:.2}) vel=({:.2}, {:.2}) half=({:.1}, {:.1}) mass={:.2} squeeze={:.3} ({} left) color={}",
            self.id,
            self.kind,
            self.position.x,
            self.position.y,
            self.velocity.x,
            self.velocity.y,
            self.half_extents.x,
            self.half_extents.y,
            self.mass,
            self.squeeze,
            self.squeeze_timer,
            self.color,
        )
    }
}
