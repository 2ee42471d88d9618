//! Stage 3: Planar projection
//!
//! Every bucket has a fixed pair of axis vectors; a vertex projects to
//! `(dot(p, u), dot(p, v))`.
//!
//! ```text
//! Bucket   u        v        uv
//! ──────   ──────   ──────   ──────
//!   ±X     +Y       +Z       (y, z)
//!   ±Y     +Z       +X       (z, x)
//!   ±Z     +Y       +X       (y, x)
//! ```
//!
//! Opposite buckets share a basis, so the negative side is mirrored. Islands
//! are packed separately, so mirroring never causes overlap.

use glam::{Vec2, Vec3};

use crate::islands::{Island, IslandSet};
use crate::mesh::Mesh;
use crate::types::{Direction, UvEntry};

/// Projection axes for a bucket.
pub fn basis(direction: Direction) -> [Vec3; 2] {
  match direction {
    Direction::PosX | Direction::NegX => [Vec3::Y, Vec3::Z],
    Direction::PosY | Direction::NegY => [Vec3::Z, Vec3::X],
    Direction::PosZ | Direction::NegZ => [Vec3::Y, Vec3::X],
  }
}

/// Project a world-space point into the plane of `direction`.
#[inline]
pub fn project_point(point: Vec3, direction: Direction) -> Vec2 {
  let [u, v] = basis(direction);
  Vec2::new(point.dot(u), point.dot(v))
}

/// Island with one projected entry per triangle corner.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectedIsland {
  pub direction: Direction,
  /// Three entries per triangle, in face order. Vertex ids may repeat.
  pub entries: Vec<UvEntry>,
}

/// Project a single island against the current (post-duplication) mesh.
pub fn project_island(mesh: &Mesh, island: &Island) -> ProjectedIsland {
  let entries = island
    .faces
    .iter()
    .flat_map(|&t| mesh.triangle(t as usize))
    .map(|vertex| UvEntry {
      vertex,
      uv: project_point(mesh.positions[vertex as usize], island.direction),
    })
    .collect();

  ProjectedIsland {
    direction: island.direction,
    entries,
  }
}

/// Project every island of `set`.
pub fn project_islands(mesh: &Mesh, set: &IslandSet) -> Vec<ProjectedIsland> {
  set
    .islands
    .iter()
    .map(|island| project_island(mesh, island))
    .collect()
}
