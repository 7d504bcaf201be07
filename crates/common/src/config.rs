//! Scene configuration.
//!
//! Every section defaults to the stock farmyard scene, so a YAML file only
//! needs to name the values it overrides:
//! ```yaml
//! player:
//!   move_speed: 0.8
//! camera:
//!   trail_distance: 45.0
//! ```

use crate::types::{Obstacle, Rgb};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Width, height and depth of the stock barn.
pub const DEFAULT_BARN_SIZE: Vec3 = Vec3::new(20.0, 15.0, 25.0);

/// Errors from loading or validating a scene configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Complete description of the scene and how it is viewed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub player: PlayerConfig,
    pub ground: GroundConfig,
    pub tree: TreeConfig,
    pub barn: BarnConfig,
    pub camera: CameraConfig,
    pub palette: Palette,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub start: Vec3,
    pub start_yaw: f32,
    pub radius: f32,
    pub height: f32,
    /// World units per tick.
    pub move_speed: f32,
    /// Radians per tick.
    pub turn_speed: f32,
    pub segments: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            start: Vec3::ZERO,
            start_yaw: 0.0,
            radius: 2.0,
            height: 8.0,
            move_speed: 0.4,
            turn_speed: 0.04,
            segments: 16,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundConfig {
    /// Full edge length of the square field, centered at the origin.
    pub size: f32,
}

impl GroundConfig {
    pub fn half_extent(&self) -> f32 {
        self.size / 2.0
    }
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self { size: 500.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    pub position: Vec3,
    pub collision_radius: f32,
    pub trunk_height: f32,
    pub trunk_radius: f32,
    pub trunk_segments: u32,
    pub canopy_radius: f32,
    pub canopy_segments: u32,
}

impl TreeConfig {
    pub fn obstacle(&self) -> Obstacle {
        Obstacle::new(self.position, self.collision_radius)
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(30.0, 0.0, -40.0),
            collision_radius: 10.0,
            trunk_height: 15.0,
            trunk_radius: 2.0,
            trunk_segments: 12,
            canopy_radius: 8.0,
            canopy_segments: 16,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarnConfig {
    pub position: Vec3,
    pub collision_radius: f32,
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl BarnConfig {
    pub fn obstacle(&self) -> Obstacle {
        Obstacle::new(self.position, self.collision_radius)
    }

    pub fn size(&self) -> Vec3 {
        Vec3::new(self.width, self.height, self.depth)
    }
}

impl Default for BarnConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(-40.0, 0.0, -20.0),
            collision_radius: 18.0,
            width: DEFAULT_BARN_SIZE.x,
            height: DEFAULT_BARN_SIZE.y,
            depth: DEFAULT_BARN_SIZE.z,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Horizontal distance kept behind the player.
    pub trail_distance: f32,
    /// Fixed world-space height of the eye.
    pub elevation: f32,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl CameraConfig {
    pub fn fov_radians(&self) -> f32 {
        self.fov_degrees.to_radians()
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            trail_distance: 30.0,
            elevation: 20.0,
            fov_degrees: 60.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

/// Per-object flat colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub sky: Rgb,
    pub ground: Rgb,
    pub trunk: Rgb,
    pub canopy: Rgb,
    pub barn: Rgb,
    pub player: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            sky: Rgb::new(0.529, 0.808, 0.922),
            ground: Rgb::new(0.235, 0.702, 0.443),
            trunk: Rgb::new(0.545, 0.271, 0.075),
            canopy: Rgb::new(0.133, 0.545, 0.133),
            barn: Rgb::new(0.698, 0.133, 0.133),
            player: Rgb::new(0.0, 0.0, 1.0),
        }
    }
}

impl SceneConfig {
    /// Load a config from a YAML file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Obstacles in draw order: tree, then barn.
    pub fn obstacles(&self) -> Vec<Obstacle> {
        vec![self.tree.obstacle(), self.barn.obstacle()]
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.player;
        positive("player.radius", p.radius)?;
        positive("player.height", p.height)?;
        positive("player.move_speed", p.move_speed)?;
        positive("player.turn_speed", p.turn_speed)?;
        positive("ground.size", self.ground.size)?;
        if self.ground.half_extent() <= p.radius {
            return Err(ConfigError::Invalid(format!(
                "ground half-extent {} must exceed player radius {}",
                self.ground.half_extent(),
                p.radius
            )));
        }

        let t = &self.tree;
        non_negative("tree.collision_radius", t.collision_radius)?;
        positive("tree.trunk_height", t.trunk_height)?;
        positive("tree.trunk_radius", t.trunk_radius)?;
        positive("tree.canopy_radius", t.canopy_radius)?;

        let b = &self.barn;
        non_negative("barn.collision_radius", b.collision_radius)?;
        positive("barn.width", b.width)?;
        positive("barn.height", b.height)?;
        positive("barn.depth", b.depth)?;

        let c = &self.camera;
        // A zero trail puts the eye straight above the target, parallel to up.
        positive("camera.trail_distance", c.trail_distance)?;
        if !c.elevation.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "camera.elevation must be finite, got {}",
                c.elevation
            )));
        }
        positive("camera.near", c.near)?;
        if c.near >= c.far {
            return Err(ConfigError::Invalid(format!(
                "camera.near ({}) must be less than camera.far ({})",
                c.near, c.far
            )));
        }
        if !(c.fov_degrees > 0.0 && c.fov_degrees < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "camera.fov_degrees must be in (0, 180), got {}",
                c.fov_degrees
            )));
        }
        Ok(())
    }
}

fn positive(name: &str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")))
    }
}

fn non_negative(name: &str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{name} must not be negative, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        SceneConfig::default().validate().unwrap();
    }

    #[test]
    fn default_obstacles_are_tree_then_barn() {
        let obstacles = SceneConfig::default().obstacles();
        assert_eq!(obstacles.len(), 2);
        assert_eq!(obstacles[0].position, Vec3::new(30.0, 0.0, -40.0));
        assert_eq!(obstacles[0].radius, 10.0);
        assert_eq!(obstacles[1].position, Vec3::new(-40.0, 0.0, -20.0));
        assert_eq!(obstacles[1].radius, 18.0);
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let config = SceneConfig::from_yaml("player:\n  move_speed: 0.8\n").unwrap();
        assert_eq!(config.player.move_speed, 0.8);
        assert_eq!(config.player.radius, 2.0);
        assert_eq!(config.ground.size, 500.0);
    }

    #[test]
    fn empty_document_is_default_scene() {
        let config = SceneConfig::from_yaml("{}").unwrap();
        assert_eq!(config, SceneConfig::default());
    }

    #[test]
    fn yaml_roundtrip_preserves_config() {
        let mut config = SceneConfig::default();
        config.camera.trail_distance = 45.0;
        let yaml = config.to_yaml().unwrap();
        assert_eq!(SceneConfig::from_yaml(&yaml).unwrap(), config);
    }

    #[test]
    fn rejects_near_plane_behind_far() {
        let err = SceneConfig::from_yaml("camera:\n  near: 10.0\n  far: 5.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_zero_trail_distance() {
        let err = SceneConfig::from_yaml("camera:\n  trail_distance: 0.0\n").unwrap_err();
        assert!(err.to_string().contains("camera.trail_distance"));
        let err = SceneConfig::from_yaml("camera:\n  trail_distance: -5.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_non_finite_elevation() {
        let err = SceneConfig::from_yaml("camera:\n  elevation: .nan\n").unwrap_err();
        assert!(err.to_string().contains("camera.elevation"));
    }

    #[test]
    fn barn_default_matches_default_size() {
        assert_eq!(BarnConfig::default().size(), DEFAULT_BARN_SIZE);
    }

    #[test]
    fn rejects_field_smaller_than_player() {
        let err = SceneConfig::from_yaml("ground:\n  size: 3.0\n").unwrap_err();
        assert!(err.to_string().contains("half-extent"));
    }

    #[test]
    fn rejects_negative_obstacle_radius() {
        let err = SceneConfig::from_yaml("barn:\n  collision_radius: -1.0\n").unwrap_err();
        assert!(err.to_string().contains("barn.collision_radius"));
    }

    #[test]
    fn malformed_yaml_is_a_yaml_error() {
        let err = SceneConfig::from_yaml("player: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn load_reads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tree:\n  collision_radius: 12.5").unwrap();
        let config = SceneConfig::load(file.path()).unwrap();
        assert_eq!(config.tree.collision_radius, 12.5);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SceneConfig::load(dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
