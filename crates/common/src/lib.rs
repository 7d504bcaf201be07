//! Shared types and configuration used across the fieldwalk crates.
//!
//! # Invariants
//! - Poses and obstacles live on the ground plane; y is a render-time concern.
//! - Every tunable constant of the scene comes from [`SceneConfig`].

pub mod config;
pub mod types;

pub use config::{
    BarnConfig, CameraConfig, ConfigError, DEFAULT_BARN_SIZE, GroundConfig, Palette, PlayerConfig,
    SceneConfig, TreeConfig,
};
pub use types::{Obstacle, Pose, Rgb, heading};
