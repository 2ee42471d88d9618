//! Indexed triangle mesh with a second UV channel.

use glam::{Mat3, Mat4, Vec2, Vec3};

use crate::error::{AtlasError, Result};

/// Indexed triangle mesh.
///
/// `positions` and `normals` are index-aligned. `uv2` is empty until the mesh
/// went through an [`AtlasBuilder`](crate::AtlasBuilder); afterwards it holds
/// one atlas UV per vertex, including the seam duplicates appended during
/// unwrapping.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
  /// Vertex positions.
  pub positions: Vec<Vec3>,

  /// Vertex normals (parallel to positions).
  pub normals: Vec<Vec3>,

  /// Triangle indices (3 indices per triangle).
  pub indices: Vec<u32>,

  /// Atlas UVs (parallel to positions once resolved).
  pub uv2: Vec<Vec2>,
}

impl Mesh {
  pub fn new(positions: Vec<Vec3>, normals: Vec<Vec3>, indices: Vec<u32>) -> Self {
    Self {
      positions,
      normals,
      indices,
      uv2: Vec::new(),
    }
  }

  /// Build a mesh from flat host buffers (stride 3) and validate it.
  pub fn from_buffers(positions: &[f32], normals: &[f32], indices: &[u32]) -> Result<Self> {
    let positions = unflatten(positions, "positions")?;
    let normals = unflatten(normals, "normals")?;
    let mesh = Self::new(positions, normals, indices.to_vec());
    mesh.validate()?;
    Ok(mesh)
  }

  /// Check buffer shapes, index ranges and that every position is finite.
  pub fn validate(&self) -> Result<()> {
    if self.normals.len() != self.positions.len() {
      return Err(AtlasError::NormalCountMismatch {
        positions: self.positions.len(),
        normals: self.normals.len(),
      });
    }
    if self.indices.len() % 3 != 0 {
      return Err(AtlasError::BufferStride {
        buffer: "index",
        len: self.indices.len(),
        stride: 3,
      });
    }
    if self.positions.len() > u32::MAX as usize {
      return Err(AtlasError::TooManyVertices);
    }
    if let Some(vertex) = self.positions.iter().position(|p| !p.is_finite()) {
      return Err(AtlasError::NonFiniteVertex { vertex });
    }
    let vertex_count = self.vertex_count();
    for (i, &index) in self.indices.iter().enumerate() {
      if index as usize >= vertex_count {
        return Err(AtlasError::IndexOutOfRange {
          triangle: i / 3,
          index,
          vertex_count,
        });
      }
    }
    Ok(())
  }

  #[inline]
  pub fn vertex_count(&self) -> usize {
    self.positions.len()
  }

  #[inline]
  pub fn triangle_count(&self) -> usize {
    self.indices.len() / 3
  }

  /// Vertex ids of triangle `t`.
  #[inline]
  pub fn triangle(&self, t: usize) -> [u32; 3] {
    let base = t * 3;
    [
      self.indices[base],
      self.indices[base + 1],
      self.indices[base + 2],
    ]
  }

  /// Corner positions of triangle `t`.
  #[inline]
  pub fn triangle_positions(&self, t: usize) -> [Vec3; 3] {
    self
      .triangle(t)
      .map(|vertex| self.positions[vertex as usize])
  }

  /// Append a copy of `vertex` (position and normal) and return its id.
  pub fn duplicate_vertex(&mut self, vertex: u32) -> Result<u32> {
    let id = u32::try_from(self.positions.len()).map_err(|_| AtlasError::TooManyVertices)?;
    let position = self.positions[vertex as usize];
    let normal = self.normals[vertex as usize];
    self.positions.push(position);
    self.normals.push(normal);
    Ok(id)
  }

  /// Bake a world transform into the mesh.
  ///
  /// Positions are transformed as points, normals by the inverse transpose
  /// of the upper 3x3 and renormalized.
  pub fn apply_transform(&mut self, transform: &Mat4) {
    let normal_matrix = Mat3::from_mat4(*transform).inverse().transpose();
    for position in &mut self.positions {
      *position = transform.transform_point3(*position);
    }
    for normal in &mut self.normals {
      *normal = (normal_matrix * *normal).normalize_or_zero();
    }
  }

  /// Positions as a flat `[x, y, z, ...]` buffer.
  pub fn flat_positions(&self) -> Vec<f32> {
    self.positions.iter().flat_map(|p| p.to_array()).collect()
  }

  /// Normals as a flat `[x, y, z, ...]` buffer.
  pub fn flat_normals(&self) -> Vec<f32> {
    self.normals.iter().flat_map(|n| n.to_array()).collect()
  }

  /// Atlas UVs as a flat `[u, v, ...]` buffer.
  pub fn flat_uv2(&self) -> Vec<f32> {
    self.uv2.iter().flat_map(|uv| uv.to_array()).collect()
  }
}

fn unflatten(buffer: &[f32], name: &'static str) -> Result<Vec<Vec3>> {
  if buffer.len() % 3 != 0 {
    return Err(AtlasError::BufferStride {
      buffer: name,
      len: buffer.len(),
      stride: 3,
    });
  }
  Ok(
    buffer
      .chunks_exact(3)
      .map(|c| Vec3::new(c[0], c[1], c[2]))
      .collect(),
  )
}

#[cfg(test)]
#[path = "mesh_test.rs"]
mod mesh_test;
