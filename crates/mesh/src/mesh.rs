use fieldwalk_common::Rgb;
use glam::Vec3;

/// Largest vertex count addressable by 16-bit indices.
pub const MAX_VERTICES: usize = 1 << 16;

/// Errors from mesh generation or validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    #[error("{shape} needs at least 3 segments, got {segments}")]
    TooFewSegments { shape: &'static str, segments: u32 },
    #[error("{shape} would have {vertices} vertices, more than 16-bit indices can address")]
    VertexLimit { shape: &'static str, vertices: u64 },
    #[error("index {index} out of range for {vertices} vertices")]
    IndexOutOfRange { index: u16, vertices: usize },
    #[error("{colors} colors for {positions} positions")]
    ColorCountMismatch { positions: usize, colors: usize },
    #[error("index count {0} is not a multiple of 3")]
    PartialTriangle(usize),
}

/// A static indexed triangle mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 3]>,
    pub indices: Vec<u16>,
}

impl Mesh {
    pub(crate) fn with_capacity(vertices: usize, indices: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices),
            colors: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(indices),
        }
    }

    pub(crate) fn push_vertex(&mut self, position: Vec3, color: Rgb) -> u16 {
        let index = self.positions.len() as u16;
        self.positions.push(position.to_array());
        self.colors.push(color.0);
        index
    }

    pub(crate) fn push_triangle(&mut self, a: u16, b: u16, c: u16) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterate triangles as vertex-position triples.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| {
            [
                Vec3::from_array(self.positions[t[0] as usize]),
                Vec3::from_array(self.positions[t[1] as usize]),
                Vec3::from_array(self.positions[t[2] as usize]),
            ]
        })
    }

    /// Check the structural invariants a renderer relies on.
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.colors.len() != self.positions.len() {
            return Err(MeshError::ColorCountMismatch {
                positions: self.positions.len(),
                colors: self.colors.len(),
            });
        }
        if self.indices.len() % 3 != 0 {
            return Err(MeshError::PartialTriangle(self.indices.len()));
        }
        if let Some(&index) = self
            .indices
            .iter()
            .find(|&&i| i as usize >= self.positions.len())
        {
            return Err(MeshError::IndexOutOfRange {
                index,
                vertices: self.positions.len(),
            });
        }
        Ok(())
    }
}

/// Reject shapes whose vertex count cannot be indexed with `u16`.
pub(crate) fn check_vertex_budget(shape: &'static str, vertices: u64) -> Result<(), MeshError> {
    if vertices > MAX_VERTICES as u64 {
        Err(MeshError::VertexLimit { shape, vertices })
    } else {
        Ok(())
    }
}

pub(crate) fn check_segments(shape: &'static str, segments: u32) -> Result<(), MeshError> {
    if segments < 3 {
        Err(MeshError::TooFewSegments { shape, segments })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_flags_out_of_range_index() {
        let mesh = Mesh {
            positions: vec![[0.0; 3]; 2],
            colors: vec![[1.0; 3]; 2],
            indices: vec![0, 1, 2],
        };
        assert_eq!(
            mesh.validate(),
            Err(MeshError::IndexOutOfRange {
                index: 2,
                vertices: 2
            })
        );
    }

    #[test]
    fn validate_flags_missing_colors() {
        let mesh = Mesh {
            positions: vec![[0.0; 3]; 3],
            colors: vec![[1.0; 3]; 1],
            indices: vec![0, 1, 2],
        };
        assert!(matches!(
            mesh.validate(),
            Err(MeshError::ColorCountMismatch { .. })
        ));
    }

    #[test]
    fn vertex_budget_allows_exactly_65536() {
        assert!(check_vertex_budget("probe", 65_536).is_ok());
        assert!(check_vertex_budget("probe", 65_537).is_err());
    }
}
