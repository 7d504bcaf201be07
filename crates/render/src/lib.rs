//! Rendering Adapter: renderer-agnostic draw orchestration.
//!
//! # Invariants
//! - Renderers never mutate the scene; they receive finished matrices.
//! - Draw order per frame is ground, tree trunk, tree canopy, barn, player.
//! - Meshes are uploaded once at startup and referenced by opaque handles.
//!
//! Backends implement [`Renderer`]. [`DebugTextRenderer`] is the headless
//! backend used by the CLI and tests; the GPU backend lives in
//! `fieldwalk-render-wgpu`.

mod context;
mod frame;
mod renderer;

pub use context::{
    DrawCall, Drawable, RenderContext, SceneLayout, SceneMeshes, barn_world, canopy_world,
    ground_world, player_world, trunk_world,
};
pub use frame::{FrameLoop, FrameReport};
pub use renderer::{DebugTextRenderer, DrawRecord, MeshHandle, RenderError, Renderer};
