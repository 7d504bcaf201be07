use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Placement of an object on the ground plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Base point of the object. `y` stays 0 for anything standing on the ground.
    pub position: Vec3,
    /// Rotation about +Y in radians. Never normalised.
    pub yaw: f32,
}

impl Pose {
    pub fn new(position: Vec3, yaw: f32) -> Self {
        Self { position, yaw }
    }

    /// Unit heading on the ground plane: `(sin(yaw), 0, cos(yaw))`.
    pub fn heading(&self) -> Vec3 {
        heading(self.yaw)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
        }
    }
}

/// Heading vector for a yaw angle. Yaw 0 faces +Z.
pub fn heading(yaw: f32) -> Vec3 {
    Vec3::new(yaw.sin(), 0.0, yaw.cos())
}

/// A static collision circle on the ground plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub position: Vec3,
    pub radius: f32,
}

impl Obstacle {
    pub fn new(position: Vec3, radius: f32) -> Self {
        Self { position, radius }
    }

    /// Distance between `pos` and this obstacle, ignoring height.
    pub fn planar_distance(&self, pos: Vec3) -> f32 {
        let dx = pos.x - self.position.x;
        let dz = pos.z - self.position.z;
        (dx * dx + dz * dz).sqrt()
    }
}

/// Linear RGB color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgb(pub [f32; 3]);

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self([r, g, b])
    }

    pub fn r(&self) -> f32 {
        self.0[0]
    }

    pub fn g(&self) -> f32 {
        self.0[1]
    }

    pub fn b(&self) -> f32 {
        self.0[2]
    }
}
