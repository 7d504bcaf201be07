//! wgpu render backend for fieldwalk.
//!
//! Draws vertex-colored indexed meshes, one combined transform per draw,
//! with back-face culling and a depth buffer.
//!
//! # Invariants
//! - Renderer never reads or mutates scene state; it only sees matrices.
//! - Clip space depth is `[0, 1]`, reported as `ClipDepth::ZeroToOne`.
//! - Draws are queued by `Renderer::draw` and submitted by `present`.

mod gpu;
mod shaders;

pub use gpu::{MAX_DRAWS_PER_FRAME, WgpuRenderer};
