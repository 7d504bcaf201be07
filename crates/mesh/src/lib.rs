//! Mesh Factory: deterministic generators for indexed triangle meshes.
//!
//! # Invariants
//! - Every index is below the vertex count and fits in a `u16`.
//! - Triangles wind counter-clockwise when seen from their visible side.
//! - Each vertex carries its own color; all current shapes are flat.

mod mesh;
mod shapes;

pub use mesh::{MAX_VERTICES, Mesh, MeshError};
pub use shapes::{
    BARN_SIZE, make_barn, make_box, make_cylinder, make_disc, make_quad, make_sphere,
};
