//! Stage 1: Face classification
//!
//! Each triangle is assigned to one of six buckets by the dominant axis of its
//! geometric normal (cross product of its edges, not the vertex normals).
//!
//! ```text
//! |n.x| >= |n.y| && |n.x| >= |n.z|  →  n.x >= 0 ? +X : -X
//! |n.y| >= |n.x| && |n.y| >= |n.z|  →  n.y >= 0 ? +Y : -Y
//! otherwise                         →  n.z >= 0 ? +Z : -Z
//! ```
//!
//! The chain is first-match-wins with non-strict comparisons, so exact ties
//! prefer X over Y over Z, and a zero component counts as positive.
//! Degenerate triangles have a zero normal and land in +X.

use glam::Vec3;

use crate::mesh::Mesh;
use crate::types::Direction;

/// Unit geometric normal of a triangle, zero for degenerate triangles.
#[inline]
pub fn face_normal(corners: [Vec3; 3]) -> Vec3 {
  let [p0, p1, p2] = corners;
  (p1 - p0).cross(p2 - p0).normalize_or_zero()
}

/// Bucket for a face normal.
pub fn classify_normal(normal: Vec3) -> Direction {
  let abs = normal.abs();
  if abs.x >= abs.y && abs.x >= abs.z {
    if normal.x >= 0.0 {
      Direction::PosX
    } else {
      Direction::NegX
    }
  } else if abs.y >= abs.x && abs.y >= abs.z {
    if normal.y >= 0.0 {
      Direction::PosY
    } else {
      Direction::NegY
    }
  } else if normal.z >= 0.0 {
    Direction::PosZ
  } else {
    Direction::NegZ
  }
}

/// Bucket for triangle `t` of `mesh`.
#[inline]
pub fn classify_triangle(mesh: &Mesh, t: usize) -> Direction {
  classify_normal(face_normal(mesh.triangle_positions(t)))
}

/// Triangle ids per bucket, each list in mesh face order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FaceBuckets {
  buckets: [Vec<u32>; 6],
}

impl FaceBuckets {
  /// Triangles classified into `direction`.
  pub fn get(&self, direction: Direction) -> &[u32] {
    &self.buckets[direction.index()]
  }

  pub fn push(&mut self, direction: Direction, triangle: u32) {
    self.buckets[direction.index()].push(triangle);
  }

  /// Iterate buckets in [`Direction::ALL`] order.
  pub fn iter(&self) -> impl Iterator<Item = (Direction, &[u32])> {
    Direction::ALL
      .into_iter()
      .map(move |direction| (direction, self.get(direction)))
  }

  /// Total number of classified triangles.
  pub fn len(&self) -> usize {
    self.buckets.iter().map(Vec::len).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Number of buckets holding at least one triangle.
  pub fn non_empty_buckets(&self) -> usize {
    self.buckets.iter().filter(|b| !b.is_empty()).count()
  }
}

/// Classify every triangle of `mesh`.
pub fn classify_faces(mesh: &Mesh) -> FaceBuckets {
  let mut buckets = FaceBuckets::default();
  for t in 0..mesh.triangle_count() {
    buckets.push(classify_triangle(mesh, t), t as u32);
  }
  buckets
}

#[cfg(test)]
#[path = "classify_test.rs"]
mod classify_test;
