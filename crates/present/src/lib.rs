//! wgpu presenter for the software framebuffer.
//!
//! Uploads a [`Framebuffer`](squash_raster::Framebuffer) into a texture each
//! frame and draws it with a single fullscreen triangle, letterboxed to keep
//! the framebuffer's aspect ratio.
//!
//! # Invariants
//! - Presenting never mutates world or framebuffer state.
//! - Kernel tick rate is independent of the present rate.

mod gpu;
mod shaders;

pub use gpu::{FramePresenter, GpuContext, PresentError, letterbox};
