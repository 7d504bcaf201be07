use crate::scene::PlayerState;
use fieldwalk_common::CameraConfig;
use glam::Vec3;

/// Where the camera sits and what it looks at for one frame. Never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFrame {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

/// Trailing third-person camera for the player's current pose.
///
/// Aims at half the player's height and sits `trail_distance` behind along
/// the heading at a fixed world-space `elevation`. No smoothing: the camera
/// snaps to the pose every frame.
pub fn camera_frame(player: &PlayerState, config: &CameraConfig) -> CameraFrame {
    let heading = player.pose.heading();
    let position = player.pose.position;
    let target = Vec3::new(position.x, player.height / 2.0, position.z);
    let behind = target - heading * config.trail_distance;
    CameraFrame {
        eye: Vec3::new(behind.x, config.elevation, behind.z),
        target,
        up: Vec3::Y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldwalk_common::Pose;

    #[test]
    fn default_pose_camera_trails_behind_on_negative_z() {
        let frame = camera_frame(&PlayerState::default(), &CameraConfig::default());
        assert_eq!(frame.target, Vec3::new(0.0, 4.0, 0.0));
        assert!(frame.eye.abs_diff_eq(Vec3::new(0.0, 20.0, -30.0), 1e-5));
        assert_eq!(frame.up, Vec3::Y);
    }

    #[test]
    fn camera_follows_yaw() {
        let player = PlayerState {
            pose: Pose::new(Vec3::new(10.0, 0.0, 5.0), std::f32::consts::FRAC_PI_2),
            ..PlayerState::default()
        };
        let frame = camera_frame(&player, &CameraConfig::default());
        // Facing +X, so the camera sits 30 units toward -X.
        assert!(frame.eye.abs_diff_eq(Vec3::new(-20.0, 20.0, 5.0), 1e-4));
    }

    #[test]
    fn elevation_is_independent_of_player_height() {
        let tall = PlayerState {
            height: 100.0,
            ..PlayerState::default()
        };
        let frame = camera_frame(&tall, &CameraConfig::default());
        assert_eq!(frame.eye.y, 20.0);
        assert_eq!(frame.target.y, 50.0);
    }

    #[test]
    fn trail_distance_is_horizontal() {
        let player = PlayerState {
            pose: Pose::new(Vec3::new(3.0, 0.0, -7.0), 1.1),
            ..PlayerState::default()
        };
        let config = CameraConfig {
            trail_distance: 45.0,
            ..CameraConfig::default()
        };
        let frame = camera_frame(&player, &config);
        let flat = Vec3::new(frame.eye.x - frame.target.x, 0.0, frame.eye.z - frame.target.z);
        assert!((flat.length() - 45.0).abs() < 1e-3);
    }
}
