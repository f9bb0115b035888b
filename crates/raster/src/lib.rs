//! Software rasterizer: a CPU framebuffer, filled pixel primitives, and
//! renderers that turn a [`World`](squash_kernel::World) into pixels or text.
//!
//! # Invariants
//! - Renderers never mutate world state.
//! - Drawing outside the framebuffer is clipped, never an error.

mod framebuffer;
mod renderer;

pub use framebuffer::Framebuffer;
pub use renderer::{BodyShape, DebugTextRenderer, RenderView, Renderer, SoftwareRenderer};
