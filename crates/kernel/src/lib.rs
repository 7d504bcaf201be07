//! Scene Kernel: authoritative scene state, the per-tick simulation step and
//! the trailing camera derived from it.
//!
//! # Invariants
//! - The player stays on the ground plane (y = 0) and inside the field bounds.
//! - A move that would overlap an obstacle is discarded whole; there is no sliding.
//! - Only [`SceneState::step`] mutates the player.

pub mod camera;
pub mod scene;

pub use camera::{CameraFrame, camera_frame};
pub use scene::{PlayerState, SceneState, StepOutcome, collides};
