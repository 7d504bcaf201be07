use fieldwalk_common::{Obstacle, Pose, SceneConfig};
use fieldwalk_input::HeldActions;
use glam::Vec3;

/// The player-controlled cylinder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerState {
    pub pose: Pose,
    pub radius: f32,
    /// World units per tick.
    pub move_speed: f32,
    /// Radians per tick.
    pub turn_speed: f32,
    pub height: f32,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::from_config(&SceneConfig::default())
    }
}

impl PlayerState {
    pub fn from_config(config: &SceneConfig) -> Self {
        let p = &config.player;
        Self {
            pose: Pose::new(Vec3::new(p.start.x, 0.0, p.start.z), p.start_yaw),
            radius: p.radius,
            move_speed: p.move_speed,
            turn_speed: p.turn_speed,
            height: p.height,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.pose.position
    }

    pub fn yaw(&self) -> f32 {
        self.pose.yaw
    }
}

/// What a single tick did to the player's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// No movement was requested.
    Idle,
    /// The candidate position was committed.
    Moved,
    /// The candidate overlapped an obstacle and was discarded.
    Blocked,
}

/// True iff `pos` with `radius` strictly overlaps any obstacle on the XZ plane.
///
/// Touching (distance equal to the summed radii) is not a collision.
pub fn collides(obstacles: &[Obstacle], pos: Vec3, radius: f32) -> bool {
    obstacles
        .iter()
        .any(|o| o.planar_distance(pos) < radius + o.radius)
}

/// The authoritative world model: player, static obstacles and field extent.
///
/// Owned by the frame loop. Renderers and the camera only read it.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneState {
    player: PlayerState,
    obstacles: Vec<Obstacle>,
    ground_half_extent: f32,
    tick: u64,
}

impl Default for SceneState {
    fn default() -> Self {
        Self::from_config(&SceneConfig::default())
    }
}

impl SceneState {
    /// `ground_half_extent` must exceed the player radius, otherwise the
    /// field clamp has an empty range.
    pub fn new(player: PlayerState, obstacles: Vec<Obstacle>, ground_half_extent: f32) -> Self {
        debug_assert!(
            ground_half_extent > player.radius,
            "field half-extent {ground_half_extent} must exceed player radius {}",
            player.radius
        );
        Self {
            player,
            obstacles,
            ground_half_extent,
            tick: 0,
        }
    }

    /// Build the scene described by `config`. Obstacles are tree, then barn.
    pub fn from_config(config: &SceneConfig) -> Self {
        Self::new(
            PlayerState::from_config(config),
            config.obstacles(),
            config.ground.half_extent(),
        )
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn ground_half_extent(&self) -> f32 {
        self.ground_half_extent
    }

    /// Number of steps taken since construction.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Largest |x| or |z| the player's center may reach.
    pub fn max_coordinate(&self) -> f32 {
        self.ground_half_extent - self.player.radius
    }

    pub fn collides(&self, pos: Vec3, radius: f32) -> bool {
        collides(&self.obstacles, pos, radius)
    }

    /// Advance the player by one tick using the held-action snapshot.
    ///
    /// Yaw changes first, then a full-speed move along the new heading is
    /// clamped to the field and vetoed if it overlaps an obstacle. The ground
    /// and bounds invariants are re-applied whatever happened.
    pub fn step(&mut self, held: HeldActions) -> StepOutcome {
        self.tick += 1;
        let p = &mut self.player;

        p.pose.yaw += held.turn_axis() * p.turn_speed;

        let forward = held.forward_axis();
        let mut outcome = StepOutcome::Idle;
        if forward != 0.0 {
            let delta = p.pose.heading() * forward * p.move_speed;
            let candidate = clamp_to_field(
                Vec3::new(p.pose.position.x + delta.x, 0.0, p.pose.position.z + delta.z),
                self.ground_half_extent - p.radius,
            );

            if collides(&self.obstacles, candidate, p.radius) {
                tracing::debug!(
                    tick = self.tick,
                    x = candidate.x,
                    z = candidate.z,
                    obstacles = self.obstacles.len(),
                    "move blocked by obstacle"
                );
                outcome = StepOutcome::Blocked;
            } else {
                p.pose.position = candidate;
                outcome = StepOutcome::Moved;
            }
        }

        let limit = self.ground_half_extent - p.radius;
        p.pose.position = clamp_to_field(p.pose.position, limit);
        outcome
    }
}

/// Clamp X and Z to `[-limit, limit]` and pin Y to the ground.
fn clamp_to_field(pos: Vec3, limit: f32) -> Vec3 {
    Vec3::new(pos.x.clamp(-limit, limit), 0.0, pos.z.clamp(-limit, limit))
}
