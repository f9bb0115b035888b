//! Shared types for the squash workspace.

mod types;

pub use glam::Vec2;
pub use types::{BodyId, Color};
