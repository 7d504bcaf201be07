use crate::mesh::{Mesh, MeshError, check_segments, check_vertex_budget};
use fieldwalk_common::{DEFAULT_BARN_SIZE, Rgb};
use glam::Vec3;
use std::f32::consts::{PI, TAU};

/// Width, height and depth of the barn box.
pub const BARN_SIZE: Vec3 = DEFAULT_BARN_SIZE;

fn rim_point(i: u32, segments: u32, radius: f32, y: f32) -> Vec3 {
    let angle = i as f32 / segments as f32 * TAU;
    Vec3::new(radius * angle.cos(), y, radius * angle.sin())
}

/// Unit disc in the XZ plane as a fan around the origin. Front face is -Y.
///
/// The rim has `segments + 1` vertices; the last one repeats the first
/// position so the fan closes without wrapping indices.
pub fn make_disc(segments: u32, color: Rgb) -> Result<Mesh, MeshError> {
    check_segments("disc", segments)?;
    check_vertex_budget("disc", segments as u64 + 2)?;

    let mut mesh = Mesh::with_capacity(segments as usize + 2, segments as usize * 3);
    let center = mesh.push_vertex(Vec3::ZERO, color);
    for i in 0..=segments {
        mesh.push_vertex(rim_point(i, segments, 1.0, 0.0), color);
    }
    for i in 1..=segments as u16 {
        mesh.push_triangle(center, i, i + 1);
    }
    Ok(mesh)
}

/// Unit square centered at the origin in the XZ plane, front face +Y.
pub fn make_quad(color: Rgb) -> Mesh {
    let mut mesh = Mesh::with_capacity(4, 6);
    for (x, z) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
        mesh.push_vertex(Vec3::new(x, 0.0, z), color);
    }
    mesh.push_triangle(0, 2, 1);
    mesh.push_triangle(0, 3, 2);
    mesh
}

/// Closed cylinder standing on the origin, from y = 0 to y = `height`.
///
/// Layout: bottom center, bottom rim, top center, top rim. Caps face down and
/// up, side quads face radially outward.
pub fn make_cylinder(
    segments: u32,
    height: f32,
    radius: f32,
    color: Rgb,
) -> Result<Mesh, MeshError> {
    check_segments("cylinder", segments)?;
    check_vertex_budget("cylinder", 2 * (segments as u64 + 2))?;

    let s = segments as usize;
    let mut mesh = Mesh::with_capacity(2 * (s + 2), 12 * s);

    let bottom_center = mesh.push_vertex(Vec3::ZERO, color);
    for i in 0..=segments {
        mesh.push_vertex(rim_point(i, segments, radius, 0.0), color);
    }
    let top_center = mesh.push_vertex(Vec3::new(0.0, height, 0.0), color);
    for i in 0..=segments {
        mesh.push_vertex(rim_point(i, segments, radius, height), color);
    }

    let n = segments as u16;
    for i in 1..=n {
        mesh.push_triangle(bottom_center, i, i + 1);
    }
    for i in 1..=n {
        mesh.push_triangle(top_center, top_center + i + 1, top_center + i);
    }

    let bottom_start = bottom_center + 1;
    let top_start = top_center + 1;
    for i in 0..n {
        let (b0, b1) = (bottom_start + i, bottom_start + i + 1);
        let (t0, t1) = (top_start + i, top_start + i + 1);
        mesh.push_triangle(b0, t0, b1);
        mesh.push_triangle(b1, t0, t1);
    }
    Ok(mesh)
}

/// Latitude/longitude sphere centered at the origin.
///
/// `segments + 1` rings of `segments + 1` vertices each; the seam column is
/// duplicated. Pole rows produce zero-area triangles, which is expected.
pub fn make_sphere(segments: u32, radius: f32, color: Rgb) -> Result<Mesh, MeshError> {
    check_segments("sphere", segments)?;
    let side = segments as u64 + 1;
    check_vertex_budget("sphere", side * side)?;

    let s = segments as usize;
    let mut mesh = Mesh::with_capacity((s + 1) * (s + 1), 6 * s * s);

    for lat in 0..=segments {
        let theta = lat as f32 * PI / segments as f32;
        let (sin_theta, cos_theta) = theta.sin_cos();
        for lon in 0..=segments {
            let phi = lon as f32 * TAU / segments as f32;
            let (sin_phi, cos_phi) = phi.sin_cos();
            let p = Vec3::new(cos_phi * sin_theta, cos_theta, sin_phi * sin_theta) * radius;
            mesh.push_vertex(p, color);
        }
    }

    let row = segments as u16 + 1;
    for lat in 0..segments as u16 {
        for lon in 0..segments as u16 {
            let first = lat * row + lon;
            let second = first + row;
            mesh.push_triangle(first, first + 1, second);
            mesh.push_triangle(second, first + 1, second + 1);
        }
    }
    Ok(mesh)
}

/// Axis-aligned box centered at the origin, four unshared vertices per face.
pub fn make_box(width: f32, height: f32, depth: f32, color: Rgb) -> Mesh {
    let half = Vec3::new(width, height, depth) * 0.5;
    // (normal, u, v) with u x v == normal, so c-u-v, c+u-v, c+u+v, c-u+v is CCW.
    let faces = [
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
    ];

    let mut mesh = Mesh::with_capacity(24, 36);
    for (normal, u, v) in faces {
        let (c, u, v) = (normal * half, u * half, v * half);
        let base = mesh.push_vertex(c - u - v, color);
        mesh.push_vertex(c + u - v, color);
        mesh.push_vertex(c + u + v, color);
        mesh.push_vertex(c - u + v, color);
        mesh.push_triangle(base, base + 1, base + 2);
        mesh.push_triangle(base, base + 2, base + 3);
    }
    mesh
}

/// The barn at its stock [`BARN_SIZE`].
///
/// Scenes with a configured barn size build it with [`make_box`] instead.
pub fn make_barn(color: Rgb) -> Mesh {
    make_box(BARN_SIZE.x, BARN_SIZE.y, BARN_SIZE.z, color)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb = Rgb::new(0.698, 0.133, 0.133);

    fn face_normal([a, b, c]: [Vec3; 3]) -> Vec3 {
        (b - a).cross(c - a)
    }

    fn centroid([a, b, c]: [Vec3; 3]) -> Vec3 {
        (a + b + c) / 3.0
    }

    #[test]
    fn disc_closes_fan_with_seam_vertex() {
        let mesh = make_disc(8, RED).unwrap();
        mesh.validate().unwrap();
        assert_eq!(mesh.vertex_count(), 10);
        assert_eq!(mesh.triangle_count(), 8);
        let first = Vec3::from_array(mesh.positions[1]);
        let seam = Vec3::from_array(mesh.positions[9]);
        assert!(first.abs_diff_eq(seam, 1e-6));
        assert_eq!(&mesh.indices[..3], &[0, 1, 2]);
        assert_eq!(&mesh.indices[21..], &[0, 8, 9]);
    }

    #[test]
    fn disc_faces_down() {
        let mesh = make_disc(6, RED).unwrap();
        assert!(mesh.triangles().all(|t| face_normal(t).y < 0.0));
    }

    #[test]
    fn quad_faces_up() {
        let mesh = make_quad(RED);
        mesh.validate().unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        for t in mesh.triangles() {
            let n = face_normal(t).normalize();
            assert!(n.abs_diff_eq(Vec3::Y, 1e-6));
        }
        assert!(mesh.positions.iter().all(|p| p[1] == 0.0));
    }

    #[test]
    fn cylinder_triangle_count_and_heights() {
        for segments in [3, 12, 16] {
            let mesh = make_cylinder(segments, 8.0, 2.0, RED).unwrap();
            mesh.validate().unwrap();
            assert_eq!(mesh.triangle_count(), 4 * segments as usize);
            assert!(mesh.positions.iter().all(|p| p[1] == 0.0 || p[1] == 8.0));
        }
    }

    #[test]
    fn cylinder_faces_point_outward() {
        let mesh = make_cylinder(12, 15.0, 2.0, RED).unwrap();
        let tris: Vec<_> = mesh.triangles().collect();
        let (bottom, rest) = tris.split_at(12);
        let (top, sides) = rest.split_at(12);
        assert!(bottom.iter().all(|&t| face_normal(t).y < 0.0));
        assert!(top.iter().all(|&t| face_normal(t).y > 0.0));
        for &t in sides {
            let c = centroid(t);
            let radial = Vec3::new(c.x, 0.0, c.z);
            assert!(face_normal(t).dot(radial) > 0.0);
            assert!(face_normal(t).y.abs() < 1e-3);
        }
    }

    #[test]
    fn sphere_triangle_count_and_radius() {
        for segments in [3, 8, 16] {
            let mesh = make_sphere(segments, 8.0, RED).unwrap();
            mesh.validate().unwrap();
            assert_eq!(mesh.triangle_count(), 2 * (segments * segments) as usize);
            for p in &mesh.positions {
                assert!((Vec3::from_array(*p).length() - 8.0).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn sphere_winds_outward() {
        let mesh = make_sphere(16, 8.0, RED).unwrap();
        let mut checked = 0;
        for t in mesh.triangles() {
            let n = face_normal(t);
            // Pole rows collapse to slivers whose orientation is noise.
            if n.length() < 1e-3 {
                continue;
            }
            assert!(n.dot(centroid(t)) > 0.0);
            checked += 1;
        }
        assert!(checked > 0);
    }

    #[test]
    fn box_has_four_vertices_per_face_wound_outward() {
        let mesh = make_box(20.0, 15.0, 25.0, RED);
        mesh.validate().unwrap();
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        for t in mesh.triangles() {
            assert!(face_normal(t).dot(centroid(t)) > 0.0);
        }
        for p in &mesh.positions {
            assert_eq!(p[0].abs(), 10.0);
            assert_eq!(p[1].abs(), 7.5);
            assert_eq!(p[2].abs(), 12.5);
        }
    }

    #[test]
    fn barn_is_standard_box() {
        assert_eq!(make_barn(RED), make_box(20.0, 15.0, 25.0, RED));
    }

    #[test]
    fn color_argument_is_applied_to_every_vertex() {
        let blue = Rgb::new(0.0, 0.0, 1.0);
        let mesh = make_cylinder(16, 8.0, 2.0, blue).unwrap();
        assert_eq!(mesh.colors.len(), mesh.positions.len());
        assert!(mesh.colors.iter().all(|c| *c == [0.0, 0.0, 1.0]));
    }

    #[test]
    fn generators_are_deterministic() {
        assert_eq!(
            make_sphere(12, 3.0, RED).unwrap(),
            make_sphere(12, 3.0, RED).unwrap()
        );
    }

    #[test]
    fn too_few_segments_rejected() {
        assert!(matches!(
            make_disc(2, RED),
            Err(MeshError::TooFewSegments { shape: "disc", .. })
        ));
        assert!(make_sphere(0, 1.0, RED).is_err());
    }

    #[test]
    fn oversized_shapes_rejected_before_generation() {
        // 256^2 = 65536 vertices fits, 257^2 does not.
        assert!(make_sphere(255, 1.0, RED).is_ok());
        assert!(matches!(
            make_sphere(256, 1.0, RED),
            Err(MeshError::VertexLimit { vertices: 66_049, .. })
        ));
        assert!(make_cylinder(40_000, 1.0, 1.0, RED).is_err());
    }
}
