use crate::context::RenderContext;
use crate::renderer::{RenderError, Renderer};
use fieldwalk_common::{Pose, SceneConfig};
use fieldwalk_input::HeldActions;
use fieldwalk_kernel::{CameraFrame, SceneState, StepOutcome, camera_frame};

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub tick: u64,
    pub outcome: StepOutcome,
    pub player: Pose,
    pub camera: CameraFrame,
    pub draws: usize,
}

/// Drives one simulation step and one render pass per tick.
///
/// Owns the scene exclusively; nothing else mutates it. Resizes go through
/// [`FrameLoop::resize`] between ticks so the next projection picks them up.
pub struct FrameLoop<R: Renderer> {
    scene: SceneState,
    context: RenderContext,
    renderer: R,
}

impl<R: Renderer> FrameLoop<R> {
    /// Build the scene from `config` and upload its meshes into `renderer`.
    pub fn new(config: &SceneConfig, mut renderer: R) -> Result<Self, RenderError> {
        let context = RenderContext::upload(&mut renderer, config)?;
        let scene = SceneState::from_config(config);
        tracing::info!(
            "Frame loop ready: {} obstacles, field half-extent {}",
            scene.obstacles().len(),
            scene.ground_half_extent()
        );
        Ok(Self {
            scene,
            context,
            renderer,
        })
    }

    /// Step with the held-action snapshot, place the camera, draw.
    pub fn tick(&mut self, held: HeldActions) -> FrameReport {
        let outcome = self.scene.step(held);
        let camera = camera_frame(self.scene.player(), self.context.camera());
        let draws = self.context.render(&mut self.renderer, &self.scene, &camera);
        FrameReport {
            tick: self.scene.tick(),
            outcome,
            player: self.scene.player().pose,
            camera,
            draws,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.renderer.resize(width, height);
    }

    pub fn scene(&self) -> &SceneState {
        &self.scene
    }

    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::DebugTextRenderer;
    use fieldwalk_input::Action;
    use fieldwalk_transform::{ClipDepth, transform_point};
    use glam::Vec3;

    fn frame_loop() -> FrameLoop<DebugTextRenderer> {
        FrameLoop::new(&SceneConfig::default(), DebugTextRenderer::new(800, 800)).unwrap()
    }

    #[test]
    fn tick_steps_then_draws() {
        let mut fl = frame_loop();
        let held: HeldActions = [Action::MoveForward].into_iter().collect();
        let report = fl.tick(held);
        assert_eq!(report.tick, 1);
        assert_eq!(report.outcome, StepOutcome::Moved);
        assert_eq!(report.draws, 5);
        assert!(report.player.position.abs_diff_eq(Vec3::new(0.0, 0.0, 0.4), 1e-6));
        assert!(report.camera.target.abs_diff_eq(Vec3::new(0.0, 4.0, 0.4), 1e-5));
        assert_eq!(fl.renderer_mut().take_draws().len(), 5);
    }

    #[test]
    fn ten_forward_ticks_reach_four_units() {
        let mut fl = frame_loop();
        let held: HeldActions = [Action::MoveForward].into_iter().collect();
        for _ in 0..10 {
            fl.tick(held);
        }
        let p = fl.scene().player().position();
        assert!(p.abs_diff_eq(Vec3::new(0.0, 0.0, 4.0), 1e-4));
        assert_eq!(fl.renderer().draws().len(), 50);
    }

    #[test]
    fn resize_applies_to_next_projection() {
        let mut fl = frame_loop();
        fl.resize(1600, 400);
        let report = fl.tick(HeldActions::new());
        let draws = fl.renderer_mut().take_draws();
        let expected = fl.context().view_projection(&report.camera, 4.0, ClipDepth::NegOneToOne);
        let player_world = fl
            .context()
            .world_matrix(crate::context::Drawable::Player, fl.scene());
        assert!(draws[4].transform.abs_diff_eq(expected * player_world, 1e-5));
    }

    #[test]
    fn player_draw_lands_in_view() {
        let mut fl = frame_loop();
        fl.tick(HeldActions::new());
        let player = fl.renderer_mut().take_draws()[4];
        let ndc = transform_point(player.transform, Vec3::new(0.0, 4.0, 0.0));
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
    }
}
