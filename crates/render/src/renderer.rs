use fieldwalk_mesh::{Mesh, MeshError};
use fieldwalk_transform::{ClipDepth, Matrix4};
use std::fmt::Write;

/// Opaque reference to a mesh a backend has taken ownership of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshHandle(pub u32);

/// Setup and submission failures of a rendering backend.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("mesh rejected: {0}")]
    Mesh(#[from] MeshError),
    #[error("shader compile/link failed: {0}")]
    Shader(String),
    #[error("surface error: {0}")]
    Surface(String),
    #[error("unknown mesh handle {0:?}")]
    UnknownMesh(MeshHandle),
    #[error("draw limit of {0} per frame exceeded")]
    TooManyDraws(usize),
}

/// The capabilities the core needs from a rasterization backend.
///
/// Program compilation happens when the backend is constructed. After that
/// the core uploads each mesh once and issues one `draw` per object per frame.
pub trait Renderer {
    /// Take ownership of a mesh for the rest of the process.
    fn upload_mesh(&mut self, mesh: &Mesh) -> Result<MeshHandle, RenderError>;

    /// Draw `mesh` with a combined world-view-projection transform.
    fn draw(&mut self, mesh: MeshHandle, transform: Matrix4);

    /// Current viewport width divided by height.
    fn aspect_ratio(&self) -> f32;

    /// The depth range this backend's clip space expects.
    fn clip_depth(&self) -> ClipDepth {
        ClipDepth::NegOneToOne
    }

    /// Apply a new viewport size. Called between frames only.
    fn resize(&mut self, width: u32, height: u32);
}

/// One recorded draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawRecord {
    pub mesh: MeshHandle,
    pub transform: Matrix4,
}

/// Headless renderer that records uploads and draws.
///
/// Produces a human-readable summary of each frame. Useful for CLI output,
/// logging, and testing the orchestration without a GPU.
#[derive(Debug)]
pub struct DebugTextRenderer {
    width: u32,
    height: u32,
    clip_depth: ClipDepth,
    meshes: Vec<(usize, usize)>,
    draws: Vec<DrawRecord>,
}

impl Default for DebugTextRenderer {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

impl DebugTextRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            clip_depth: ClipDepth::NegOneToOne,
            meshes: Vec::new(),
            draws: Vec::new(),
        }
    }

    /// Pretend to be a backend with a different clip depth convention.
    pub fn with_clip_depth(mut self, clip_depth: ClipDepth) -> Self {
        self.clip_depth = clip_depth;
        self
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// `(vertices, triangles)` of an uploaded mesh.
    pub fn mesh_stats(&self, handle: MeshHandle) -> Option<(usize, usize)> {
        self.meshes.get(handle.0 as usize).copied()
    }

    /// Draws issued since the last drain.
    pub fn draws(&self) -> &[DrawRecord] {
        &self.draws
    }

    /// Drain this frame's draws.
    pub fn take_draws(&mut self) -> Vec<DrawRecord> {
        std::mem::take(&mut self.draws)
    }

    /// Drain this frame's draws as text, one line per draw.
    pub fn take_frame(&mut self) -> String {
        let draws = self.take_draws();
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Frame ({}x{}, {} draws) ===",
            self.width,
            self.height,
            draws.len()
        );
        for d in &draws {
            let (vertices, triangles) = self.mesh_stats(d.mesh).unwrap_or_default();
            let origin = d.transform.project_point3(glam::Vec3::ZERO);
            let _ = writeln!(
                out,
                "  mesh#{} ({vertices} verts, {triangles} tris) origin_ndc=({:.3}, {:.3}, {:.3})",
                d.mesh.0, origin.x, origin.y, origin.z
            );
        }
        out
    }
}

impl Renderer for DebugTextRenderer {
    fn upload_mesh(&mut self, mesh: &Mesh) -> Result<MeshHandle, RenderError> {
        mesh.validate()?;
        let handle = MeshHandle(self.meshes.len() as u32);
        self.meshes.push((mesh.vertex_count(), mesh.triangle_count()));
        Ok(handle)
    }

    fn draw(&mut self, mesh: MeshHandle, transform: Matrix4) {
        if (mesh.0 as usize) < self.meshes.len() {
            self.draws.push(DrawRecord { mesh, transform });
        } else {
            tracing::warn!("draw with unknown mesh handle {:?} ignored", mesh);
        }
    }

    fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    fn clip_depth(&self) -> ClipDepth {
        self.clip_depth
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldwalk_common::Rgb;
    use fieldwalk_mesh::make_quad;
    use fieldwalk_transform::{identity, translation};

    #[test]
    fn upload_assigns_sequential_handles() {
        let mut r = DebugTextRenderer::default();
        let a = r.upload_mesh(&make_quad(Rgb::new(1.0, 1.0, 1.0))).unwrap();
        let b = r.upload_mesh(&make_quad(Rgb::new(1.0, 1.0, 1.0))).unwrap();
        assert_eq!(a, MeshHandle(0));
        assert_eq!(b, MeshHandle(1));
        assert_eq!(r.mesh_stats(a), Some((4, 2)));
    }

    #[test]
    fn upload_rejects_invalid_mesh() {
        let mut r = DebugTextRenderer::default();
        let broken = Mesh {
            positions: vec![[0.0; 3]],
            colors: vec![[0.0; 3]],
            indices: vec![0, 0, 5],
        };
        assert!(matches!(r.upload_mesh(&broken), Err(RenderError::Mesh(_))));
        assert_eq!(r.mesh_count(), 0);
    }

    #[test]
    fn draws_with_unknown_handle_are_dropped() {
        let mut r = DebugTextRenderer::default();
        r.draw(MeshHandle(3), identity());
        assert!(r.draws().is_empty());
    }

    #[test]
    fn frame_text_lists_draws_and_resets() {
        let mut r = DebugTextRenderer::new(800, 600);
        let quad = r.upload_mesh(&make_quad(Rgb::new(0.0, 1.0, 0.0))).unwrap();
        r.draw(quad, translation(0.5, 0.0, 0.0));
        let text = r.take_frame();
        assert!(text.contains("800x600, 1 draws"));
        assert!(text.contains("mesh#0 (4 verts, 2 tris)"));
        assert!(text.contains("origin_ndc=(0.500"));
        assert!(r.draws().is_empty());
    }

    #[test]
    fn resize_updates_aspect_and_guards_zero() {
        let mut r = DebugTextRenderer::new(100, 100);
        assert_eq!(r.aspect_ratio(), 1.0);
        r.resize(300, 0);
        assert_eq!(r.aspect_ratio(), 300.0);
    }
}
