//! Simulation kernel: axis-aligned boxes under constant acceleration with
//! pairwise push-out collision response and a squeeze-on-impact effect.
//!
//! # Invariants
//! - `mass == 0` is the only marker of an immovable body.
//! - A step integrates every movable body, then resolves each ordered pair
//!   `(movable i, any j != i)` once, in ascending index order.
//! - The step is deterministic: the same scene stepped the same number of
//!   times yields bit-identical state.

pub mod body;
pub mod config;
pub mod scene;
pub mod world;

pub use body::{Axis, Body, BodyKind, Contact};
pub use config::{ConfigError, SimConfig};
pub use scene::{BodySpec, Scene, SceneError};
pub use world::{StepStats, World, WorldEvent};
