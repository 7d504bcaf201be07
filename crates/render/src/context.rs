use crate::renderer::{MeshHandle, RenderError, Renderer};
use fieldwalk_common::{CameraConfig, Rgb, SceneConfig};
use fieldwalk_kernel::{CameraFrame, PlayerState, SceneState};
use fieldwalk_mesh::{Mesh, make_box, make_cylinder, make_quad, make_sphere};
use fieldwalk_transform::{
    ClipDepth, Matrix4, identity, inverse, look_at, multiply, perspective_for, rotate_x, rotate_y,
    scale, translate,
};
use glam::Vec3;
use std::f32::consts::FRAC_PI_2;

/// The five things drawn every frame, in draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Drawable {
    Ground,
    TreeTrunk,
    TreeCanopy,
    Barn,
    Player,
}

impl Drawable {
    pub const DRAW_ORDER: [Drawable; 5] = [
        Drawable::Ground,
        Drawable::TreeTrunk,
        Drawable::TreeCanopy,
        Drawable::Barn,
        Drawable::Player,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Drawable::Ground => "ground",
            Drawable::TreeTrunk => "tree trunk",
            Drawable::TreeCanopy => "tree canopy",
            Drawable::Barn => "barn",
            Drawable::Player => "player",
        }
    }
}

/// Handles of the uploaded scene meshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneMeshes {
    pub ground: MeshHandle,
    pub trunk: MeshHandle,
    pub canopy: MeshHandle,
    pub barn: MeshHandle,
    pub player: MeshHandle,
}

impl SceneMeshes {
    pub fn get(&self, drawable: Drawable) -> MeshHandle {
        match drawable {
            Drawable::Ground => self.ground,
            Drawable::TreeTrunk => self.trunk,
            Drawable::TreeCanopy => self.canopy,
            Drawable::Barn => self.barn,
            Drawable::Player => self.player,
        }
    }
}

/// Placement of the static props. Only the renderer reads it; collision
/// uses the obstacle list in [`SceneState`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneLayout {
    pub ground_size: f32,
    pub tree_base: Vec3,
    pub trunk_height: f32,
    pub canopy_radius: f32,
    pub barn_base: Vec3,
    pub barn_height: f32,
}

impl SceneLayout {
    pub fn from_config(config: &SceneConfig) -> Self {
        Self {
            ground_size: config.ground.size,
            tree_base: config.tree.position,
            trunk_height: config.tree.trunk_height,
            canopy_radius: config.tree.canopy_radius,
            barn_base: config.barn.position,
            barn_height: config.barn.height,
        }
    }
}

/// Ground quad turned about X and stretched to the field size.
///
/// The quad is authored flat in XZ, so this -90° turn stands it up in the
/// XY plane at z = 0. Kept as the scene has always drawn it.
pub fn ground_world(size: f32) -> Matrix4 {
    scale(rotate_x(identity(), -FRAC_PI_2), size, 1.0, size)
}

/// Trunk cylinder stands on its base.
pub fn trunk_world(base: Vec3) -> Matrix4 {
    translate(identity(), base.x, base.y, base.z)
}

/// Canopy sphere sits on top of the trunk.
pub fn canopy_world(base: Vec3, trunk_height: f32, canopy_radius: f32) -> Matrix4 {
    translate(identity(), base.x, trunk_height + canopy_radius, base.z)
}

/// The barn box is centered on its origin, so lift it by half its height.
pub fn barn_world(base: Vec3, height: f32) -> Matrix4 {
    translate(identity(), base.x, height / 2.0, base.z)
}

pub fn player_world(player: &PlayerState) -> Matrix4 {
    let p = player.position();
    rotate_y(translate(identity(), p.x, p.y, p.z), player.yaw())
}

/// One resolved draw: what, with which mesh, and the matrices involved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub drawable: Drawable,
    pub mesh: MeshHandle,
    pub world: Matrix4,
    /// `view_projection * world`, the matrix handed to the renderer.
    pub transform: Matrix4,
}

/// Everything the orchestrator needs between frames: mesh handles, prop
/// layout, projection parameters and the clear color. Holds no GPU state.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderContext {
    meshes: SceneMeshes,
    layout: SceneLayout,
    camera: CameraConfig,
    clear_color: Rgb,
}

impl RenderContext {
    pub fn new(
        meshes: SceneMeshes,
        layout: SceneLayout,
        camera: CameraConfig,
        clear_color: Rgb,
    ) -> Self {
        Self {
            meshes,
            layout,
            camera,
            clear_color,
        }
    }

    /// Generate the scene meshes and upload each one once.
    pub fn upload<R: Renderer + ?Sized>(
        renderer: &mut R,
        config: &SceneConfig,
    ) -> Result<Self, RenderError> {
        let palette = &config.palette;
        let tree = &config.tree;
        let barn = &config.barn;
        let player = &config.player;

        let meshes = SceneMeshes {
            ground: upload_one(renderer, Drawable::Ground, make_quad(palette.ground))?,
            trunk: upload_one(
                renderer,
                Drawable::TreeTrunk,
                make_cylinder(
                    tree.trunk_segments,
                    tree.trunk_height,
                    tree.trunk_radius,
                    palette.trunk,
                )?,
            )?,
            canopy: upload_one(
                renderer,
                Drawable::TreeCanopy,
                make_sphere(tree.canopy_segments, tree.canopy_radius, palette.canopy)?,
            )?,
            barn: upload_one(
                renderer,
                Drawable::Barn,
                make_box(barn.width, barn.height, barn.depth, palette.barn),
            )?,
            player: upload_one(
                renderer,
                Drawable::Player,
                make_cylinder(player.segments, player.height, player.radius, palette.player)?,
            )?,
        };

        Ok(Self::new(
            meshes,
            SceneLayout::from_config(config),
            config.camera.clone(),
            palette.sky,
        ))
    }

    pub fn meshes(&self) -> &SceneMeshes {
        &self.meshes
    }

    pub fn layout(&self) -> &SceneLayout {
        &self.layout
    }

    pub fn camera(&self) -> &CameraConfig {
        &self.camera
    }

    pub fn clear_color(&self) -> Rgb {
        self.clear_color
    }

    /// `projection * view` for this frame, where the view is the inverse of
    /// the camera's look-at frame.
    pub fn view_projection(&self, camera: &CameraFrame, aspect: f32, clip: ClipDepth) -> Matrix4 {
        let projection = perspective_for(
            clip,
            self.camera.fov_radians(),
            aspect,
            self.camera.near,
            self.camera.far,
        );
        let view = inverse(look_at(camera.eye, camera.target, camera.up));
        multiply(projection, view)
    }

    /// World matrix of one drawable in the current scene.
    pub fn world_matrix(&self, drawable: Drawable, scene: &SceneState) -> Matrix4 {
        let l = &self.layout;
        match drawable {
            Drawable::Ground => ground_world(l.ground_size),
            Drawable::TreeTrunk => trunk_world(l.tree_base),
            Drawable::TreeCanopy => canopy_world(l.tree_base, l.trunk_height, l.canopy_radius),
            Drawable::Barn => barn_world(l.barn_base, l.barn_height),
            Drawable::Player => player_world(scene.player()),
        }
    }

    /// The frame's draws in fixed order. Pure; nothing is submitted.
    pub fn draw_list(
        &self,
        scene: &SceneState,
        camera: &CameraFrame,
        aspect: f32,
        clip: ClipDepth,
    ) -> Vec<DrawCall> {
        let view_projection = self.view_projection(camera, aspect, clip);
        Drawable::DRAW_ORDER
            .into_iter()
            .map(|drawable| {
                let world = self.world_matrix(drawable, scene);
                DrawCall {
                    drawable,
                    mesh: self.meshes.get(drawable),
                    world,
                    transform: multiply(view_projection, world),
                }
            })
            .collect()
    }

    /// Issue this frame's draws. Returns the number of draws.
    pub fn render<R: Renderer + ?Sized>(
        &self,
        renderer: &mut R,
        scene: &SceneState,
        camera: &CameraFrame,
    ) -> usize {
        let draws = self.draw_list(scene, camera, renderer.aspect_ratio(), renderer.clip_depth());
        for call in &draws {
            renderer.draw(call.mesh, call.transform);
        }
        draws.len()
    }
}

fn upload_one<R: Renderer + ?Sized>(
    renderer: &mut R,
    drawable: Drawable,
    mesh: Mesh,
) -> Result<MeshHandle, RenderError> {
    let handle = renderer.upload_mesh(&mesh)?;
    tracing::info!(
        "Uploaded {} mesh: {} vertices, {} triangles -> {:?}",
        drawable.name(),
        mesh.vertex_count(),
        mesh.triangle_count(),
        handle
    );
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::DebugTextRenderer;
    use fieldwalk_kernel::camera_frame;
    use fieldwalk_transform::{rotation_x, scaling, transform_point};

    fn setup() -> (DebugTextRenderer, RenderContext, SceneState) {
        let config = SceneConfig::default();
        let mut renderer = DebugTextRenderer::default();
        let context = RenderContext::upload(&mut renderer, &config).unwrap();
        (renderer, context, SceneState::from_config(&config))
    }

    #[test]
    fn upload_creates_five_meshes() {
        let (renderer, context, _) = setup();
        assert_eq!(renderer.mesh_count(), 5);
        let m = context.meshes();
        assert_eq!(renderer.mesh_stats(m.ground), Some((4, 2)));
        assert_eq!(renderer.mesh_stats(m.trunk), Some((28, 48)));
        assert_eq!(renderer.mesh_stats(m.canopy), Some((289, 512)));
        assert_eq!(renderer.mesh_stats(m.barn), Some((24, 12)));
        assert_eq!(renderer.mesh_stats(m.player), Some((36, 64)));
        assert_eq!(context.clear_color(), Rgb::new(0.529, 0.808, 0.922));
    }

    #[test]
    fn upload_propagates_mesh_errors() {
        let mut config = SceneConfig::default();
        config.tree.canopy_segments = 2;
        let mut renderer = DebugTextRenderer::default();
        let err = RenderContext::upload(&mut renderer, &config).unwrap_err();
        assert!(matches!(err, RenderError::Mesh(_)));
    }

    #[test]
    fn draw_list_has_fixed_order() {
        let (_, context, scene) = setup();
        let camera = camera_frame(scene.player(), context.camera());
        let draws = context.draw_list(&scene, &camera, 16.0 / 9.0, ClipDepth::NegOneToOne);
        let order: Vec<_> = draws.iter().map(|d| d.drawable).collect();
        assert_eq!(order, Drawable::DRAW_ORDER.to_vec());
        let handles: Vec<_> = draws.iter().map(|d| d.mesh).collect();
        let m = context.meshes();
        assert_eq!(handles, vec![m.ground, m.trunk, m.canopy, m.barn, m.player]);
    }

    #[test]
    fn transform_is_view_projection_times_world() {
        let (_, context, scene) = setup();
        let camera = camera_frame(scene.player(), context.camera());
        let vp = context.view_projection(&camera, 1.5, ClipDepth::NegOneToOne);
        for call in context.draw_list(&scene, &camera, 1.5, ClipDepth::NegOneToOne) {
            assert!(call.transform.abs_diff_eq(vp * call.world, 1e-5));
        }
    }

    #[test]
    fn ground_is_rotated_then_scaled() {
        let expected = rotation_x(-FRAC_PI_2) * scaling(500.0, 1.0, 500.0);
        assert!(ground_world(500.0).abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn ground_quad_stands_in_xy_plane() {
        let corner = transform_point(ground_world(500.0), Vec3::new(0.5, 0.0, 0.5));
        assert!(corner.abs_diff_eq(Vec3::new(250.0, 250.0, 0.0), 1e-3), "{corner:?}");
    }

    #[test]
    fn props_sit_on_the_ground() {
        let base = Vec3::new(-40.0, 0.0, -20.0);
        let bottom = transform_point(barn_world(base, 15.0), Vec3::new(0.0, -7.5, 0.0));
        assert!(bottom.abs_diff_eq(Vec3::new(-40.0, 0.0, -20.0), 1e-5));

        let tree = Vec3::new(30.0, 0.0, -40.0);
        let canopy_center = transform_point(canopy_world(tree, 15.0, 8.0), Vec3::ZERO);
        assert!(canopy_center.abs_diff_eq(Vec3::new(30.0, 23.0, -40.0), 1e-5));
        assert_eq!(transform_point(trunk_world(tree), Vec3::ZERO), tree);
    }

    #[test]
    fn player_matrix_follows_pose() {
        let mut player = PlayerState::default();
        player.pose.position = Vec3::new(10.0, 0.0, 5.0);
        player.pose.yaw = FRAC_PI_2;
        let world = player_world(&player);
        assert!(transform_point(world, Vec3::ZERO).abs_diff_eq(player.position(), 1e-5));
        // Local +Z faces the heading, which is +X at yaw pi/2.
        let ahead = transform_point(world, Vec3::Z);
        assert!(ahead.abs_diff_eq(Vec3::new(11.0, 0.0, 5.0), 1e-5));
    }

    #[test]
    fn camera_target_projects_to_screen_center() {
        let (_, context, scene) = setup();
        let camera = camera_frame(scene.player(), context.camera());
        for clip in [ClipDepth::NegOneToOne, ClipDepth::ZeroToOne] {
            let vp = context.view_projection(&camera, 4.0 / 3.0, clip);
            let ndc = transform_point(vp, camera.target);
            assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4, "{ndc:?}");
            let lo = if clip == ClipDepth::ZeroToOne { 0.0 } else { -1.0 };
            assert!(ndc.z > lo && ndc.z < 1.0, "{ndc:?}");
        }
    }

    #[test]
    fn render_uses_renderer_aspect_and_issues_five_draws() {
        let (mut renderer, context, scene) = setup();
        renderer.resize(1000, 500);
        let camera = camera_frame(scene.player(), context.camera());
        assert_eq!(context.render(&mut renderer, &scene, &camera), 5);
        let expected = context.draw_list(&scene, &camera, 2.0, ClipDepth::NegOneToOne);
        let issued = renderer.take_draws();
        assert_eq!(issued.len(), 5);
        for (record, call) in issued.iter().zip(&expected) {
            assert_eq!(record.mesh, call.mesh);
            assert!(record.transform.abs_diff_eq(call.transform, 1e-6));
        }
    }
}
