//! Transform library: pure constructors and composers for 4x4 matrices.
//!
//! # Conventions
//! - Storage is column-major and vectors are columns (glam's layout).
//! - `multiply(a, b)` applies `b` first, then `a`.
//! - The composers (`translate`, `rotate_x`, `rotate_y`, `scale`) post-multiply,
//!   so a chain written world-to-local applies to vertices local-to-world.
//! - Right-handed, +Y up. Positive X-rotation turns +Y toward +Z, positive
//!   Y-rotation turns +Z toward +X.
//!
//! # Invariants
//! - Every matrix handed to a renderer comes out of this module.
//! - Nothing here mutates its inputs or holds state.

use glam::{Mat4, Vec3, Vec4};

/// An affine or projective transform.
pub type Matrix4 = Mat4;

/// Vector lengths at or below this are treated as zero by [`look_at`].
pub const NORMALIZE_EPSILON: f32 = 1e-5;

/// Determinant magnitude at or below which [`try_inverse`] reports failure.
pub const SINGULAR_EPSILON: f32 = 1e-12;

/// Depth range of the clip space a rasterizer expects after the perspective divide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipDepth {
    /// OpenGL / WebGL: near maps to -1, far to +1.
    #[default]
    NegOneToOne,
    /// wgpu, Vulkan, Metal, D3D: near maps to 0, far to 1.
    ZeroToOne,
}

pub fn identity() -> Matrix4 {
    Mat4::IDENTITY
}

pub fn translation(tx: f32, ty: f32, tz: f32) -> Matrix4 {
    Mat4::from_translation(Vec3::new(tx, ty, tz))
}

pub fn rotation_x(theta: f32) -> Matrix4 {
    Mat4::from_rotation_x(theta)
}

pub fn rotation_y(theta: f32) -> Matrix4 {
    Mat4::from_rotation_y(theta)
}

pub fn scaling(sx: f32, sy: f32, sz: f32) -> Matrix4 {
    Mat4::from_scale(Vec3::new(sx, sy, sz))
}

/// Composition `a ∘ b`: the result transforms a point by `b`, then by `a`.
pub fn multiply(a: Matrix4, b: Matrix4) -> Matrix4 {
    a * b
}

/// `m` followed locally by a translation.
pub fn translate(m: Matrix4, tx: f32, ty: f32, tz: f32) -> Matrix4 {
    multiply(m, translation(tx, ty, tz))
}

pub fn rotate_x(m: Matrix4, theta: f32) -> Matrix4 {
    multiply(m, rotation_x(theta))
}

pub fn rotate_y(m: Matrix4, theta: f32) -> Matrix4 {
    multiply(m, rotation_y(theta))
}

pub fn scale(m: Matrix4, sx: f32, sy: f32, sz: f32) -> Matrix4 {
    multiply(m, scaling(sx, sy, sz))
}

/// Symmetric perspective frustum for a right-handed view space looking down -Z,
/// producing GL-style clip depth in `[-1, 1]`.
///
/// Preconditions: `0 < near < far`, `aspect > 0`, `0 < fov_y < π`.
pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Matrix4 {
    let f = (std::f32::consts::FRAC_PI_2 - 0.5 * fov_y).tan();
    let range_inv = 1.0 / (near - far);
    Mat4::from_cols(
        Vec4::new(f / aspect, 0.0, 0.0, 0.0),
        Vec4::new(0.0, f, 0.0, 0.0),
        Vec4::new(0.0, 0.0, (near + far) * range_inv, -1.0),
        Vec4::new(0.0, 0.0, near * far * range_inv * 2.0, 0.0),
    )
}

/// Same frustum as [`perspective`] with clip depth in `[0, 1]`.
pub fn perspective_zero_to_one(fov_y: f32, aspect: f32, near: f32, far: f32) -> Matrix4 {
    let f = (std::f32::consts::FRAC_PI_2 - 0.5 * fov_y).tan();
    let range_inv = 1.0 / (near - far);
    Mat4::from_cols(
        Vec4::new(f / aspect, 0.0, 0.0, 0.0),
        Vec4::new(0.0, f, 0.0, 0.0),
        Vec4::new(0.0, 0.0, far * range_inv, -1.0),
        Vec4::new(0.0, 0.0, near * far * range_inv, 0.0),
    )
}

/// Perspective projection for the given clip depth convention.
pub fn perspective_for(clip: ClipDepth, fov_y: f32, aspect: f32, near: f32, far: f32) -> Matrix4 {
    match clip {
        ClipDepth::NegOneToOne => perspective(fov_y, aspect, near, far),
        ClipDepth::ZeroToOne => perspective_zero_to_one(fov_y, aspect, near, far),
    }
}

/// General inverse by cofactor expansion.
///
/// The caller must not pass a singular matrix: the result is then non-finite
/// and no error is raised. Use [`try_inverse`] to test first.
pub fn inverse(m: Matrix4) -> Matrix4 {
    m.inverse()
}

/// [`inverse`], or `None` when the determinant is numerically zero.
pub fn try_inverse(m: Matrix4) -> Option<Matrix4> {
    if m.determinant().abs() <= SINGULAR_EPSILON {
        None
    } else {
        Some(m.inverse())
    }
}

/// Camera-to-world matrix for an eye at `eye` facing `target`.
///
/// Columns are right, up, backward (`eye - target`) and the eye position.
/// Axes shorter than [`NORMALIZE_EPSILON`] pass through unnormalized, so
/// `eye == target` or `up` parallel to the view direction yields a degenerate
/// but finite basis. Invert the result to get a view matrix.
pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Matrix4 {
    let z_axis = normalize_or_keep(eye - target);
    let x_axis = normalize_or_keep(up.cross(z_axis));
    let y_axis = z_axis.cross(x_axis);
    Mat4::from_cols(
        x_axis.extend(0.0),
        y_axis.extend(0.0),
        z_axis.extend(0.0),
        eye.extend(1.0),
    )
}

fn normalize_or_keep(v: Vec3) -> Vec3 {
    let len = v.length();
    if len > NORMALIZE_EPSILON { v / len } else { v }
}

/// Apply `m` to a point (w = 1) including the perspective divide.
pub fn transform_point(m: Matrix4, p: Vec3) -> Vec3 {
    m.project_point3(p)
}

/// Flatten to 16 floats in column-major order, ready for a uniform upload.
pub fn to_cols_array(m: Matrix4) -> [f32; 16] {
    m.to_cols_array()
}
