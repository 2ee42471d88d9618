//! Stage 2: Island building
//!
//! Groups the triangles of each bucket into connected islands and splits
//! vertices along bucket seams so islands of different buckets never share a
//! vertex id.
//!
//! ```text
//!  bucket +Y                      bucket +Y      bucket +X
//!  ┌───────┐                      ┌───────┐    ┌───────┐
//!  │       │ v    bucket +X       │       │ v  │       │ v'
//!  │   A   ●───────┐          →   │   A   ●    ●   B   │
//!  │       │   B   │              │       │    │       │
//!  └───────┴───────┘              └───────┘    └───────┘
//!                                  v keeps island A, B is rewritten to the
//!                                  duplicate v' registered for (v, +X)
//! ```
//!
//! # Bookkeeping
//!
//! - **Batches** live in a [`DisjointSet`]: merging two islands is a directed
//!   union into the batch of the first vertex encountered, so batch ids never
//!   dangle and output order is reproducible.
//! - **Vertex → batch** stores the batch a vertex was last assigned to; the
//!   live island is always `find(batch)`.
//! - **Duplicates** map `(original vertex, bucket)` to at most one copy.
//!
//! Buckets are processed in [`Direction::ALL`] order, triangles in face order.

use std::collections::HashMap;

use smallvec::SmallVec;

use crate::classify::FaceBuckets;
use crate::disjoint_set::DisjointSet;
use crate::error::Result;
use crate::mesh::Mesh;
use crate::types::Direction;

/// Finished island: connected triangles of one bucket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Island {
  pub direction: Direction,
  /// Triangle ids, in assignment order.
  pub faces: Vec<u32>,
}

/// Output of island building.
#[derive(Clone, Debug, Default)]
pub struct IslandSet {
  /// Islands grouped by bucket, each bucket in batch creation order.
  pub islands: Vec<Island>,

  /// Vertices appended to the mesh at seams.
  pub duplicated_vertices: usize,

  /// Structural warnings raised while merging.
  pub warnings: usize,
}

impl IslandSet {
  /// Total triangles over all islands.
  pub fn face_count(&self) -> usize {
    self.islands.iter().map(|island| island.faces.len()).sum()
  }

  /// Islands of one bucket.
  pub fn in_direction(&self, direction: Direction) -> impl Iterator<Item = &Island> {
    self
      .islands
      .iter()
      .filter(move |island| island.direction == direction)
  }
}

/// At most one duplicate per `(vertex, bucket)` pair.
#[derive(Clone, Debug, Default)]
pub struct DuplicateRegistry {
  copies: HashMap<(u32, Direction), u32>,
}

impl DuplicateRegistry {
  pub fn get(&self, vertex: u32, direction: Direction) -> Option<u32> {
    self.copies.get(&(vertex, direction)).copied()
  }

  pub fn insert(&mut self, vertex: u32, direction: Direction, duplicate: u32) {
    self.copies.insert((vertex, direction), duplicate);
  }

  pub fn len(&self) -> usize {
    self.copies.len()
  }

  pub fn is_empty(&self) -> bool {
    self.copies.is_empty()
  }
}

#[derive(Clone, Debug)]
struct Batch {
  direction: Direction,
  faces: Vec<u32>,
}

/// Incremental island builder for one mesh.
#[derive(Debug, Default)]
pub struct IslandBuilder {
  batches: Vec<Batch>,
  sets: DisjointSet,
  vertex_batch: Vec<Option<u32>>,
  duplicates: DuplicateRegistry,
  warnings: usize,
}

impl IslandBuilder {
  pub fn new(vertex_count: usize) -> Self {
    Self {
      vertex_batch: vec![None; vertex_count],
      ..Default::default()
    }
  }

  pub fn duplicates(&self) -> &DuplicateRegistry {
    &self.duplicates
  }

  /// Live batch of `vertex`, if any.
  fn batch_of(&mut self, vertex: u32) -> Option<u32> {
    let batch = self.vertex_batch[vertex as usize]?;
    Some(self.sets.find(batch))
  }

  fn new_batch(&mut self, direction: Direction) -> u32 {
    let id = self.sets.make_set();
    self.batches.push(Batch {
      direction,
      faces: Vec::new(),
    });
    id
  }

  /// Merge `other` into `survivor`, moving its faces. Returns the live root.
  fn merge(&mut self, survivor: u32, other: u32) -> u32 {
    let survivor = self.sets.find(survivor);
    let other = self.sets.find(other);
    if survivor == other {
      return survivor;
    }
    if self.batches[survivor as usize].direction != self.batches[other as usize].direction {
      self.warnings += 1;
      tracing::warn!(
        survivor,
        other,
        "refusing to merge batches of different buckets"
      );
      return survivor;
    }
    self.sets.union_into(survivor, other);
    let faces = std::mem::take(&mut self.batches[other as usize].faces);
    self.batches[survivor as usize].faces.extend(faces);
    survivor
  }

  /// Assign triangle `t` to an island of `direction`, splitting seam vertices.
  pub fn push_face(&mut self, mesh: &mut Mesh, t: u32, direction: Direction) -> Result<()> {
    let mut corners = mesh.triangle(t as usize);
    let mut candidates: SmallVec<[u32; 3]> = SmallVec::new();

    for slot in 0..3 {
      let vertex = corners[slot];
      let Some(owner) = self.batch_of(vertex) else {
        continue;
      };

      if self.batches[owner as usize].direction == direction {
        candidates.push(owner);
        continue;
      }

      // Seam: this vertex already belongs to another bucket.
      let duplicate = match self.duplicates.get(vertex, direction) {
        Some(duplicate) => {
          match self.batch_of(duplicate) {
            Some(batch) => candidates.push(batch),
            // Same seam vertex repeated within this (degenerate) triangle.
            None if corners[..slot].contains(&duplicate) => {}
            None => {
              self.warnings += 1;
              tracing::warn!(
                vertex,
                duplicate,
                direction = direction.label(),
                "seam duplicate has no batch"
              );
            }
          }
          duplicate
        }
        None => {
          let duplicate = mesh.duplicate_vertex(vertex)?;
          self.vertex_batch.push(None);
          self.duplicates.insert(vertex, direction, duplicate);
          duplicate
        }
      };

      mesh.indices[t as usize * 3 + slot] = duplicate;
      corners[slot] = duplicate;
    }

    let batch = match candidates.split_first() {
      None => self.new_batch(direction),
      Some((&first, rest)) => {
        let mut survivor = self.sets.find(first);
        for &other in rest {
          survivor = self.merge(survivor, other);
        }
        survivor
      }
    };

    self.batches[batch as usize].faces.push(t);
    for vertex in corners {
      self.vertex_batch[vertex as usize] = Some(batch);
    }
    Ok(())
  }

  /// Collect the surviving batches as islands.
  pub fn finish(mut self) -> IslandSet {
    let mut islands = Vec::new();
    for id in 0..self.batches.len() as u32 {
      if !self.sets.is_root(id) {
        continue;
      }
      let batch = &mut self.batches[id as usize];
      if batch.faces.is_empty() {
        continue;
      }
      islands.push(Island {
        direction: batch.direction,
        faces: std::mem::take(&mut batch.faces),
      });
    }
    // Creation order is already bucket-major; keep it stable per bucket.
    islands.sort_by_key(|island| island.direction);

    IslandSet {
      islands,
      duplicated_vertices: self.duplicates.len(),
      warnings: self.warnings,
    }
  }
}

/// Build islands for every bucket, rewriting seam references in `mesh`.
///
/// `mesh` grows by one vertex per `(vertex, bucket)` seam pair; triangles are
/// never added or removed.
#[tracing::instrument(skip_all, name = "islands::build")]
pub fn build_islands(mesh: &mut Mesh, buckets: &FaceBuckets) -> Result<IslandSet> {
  let mut builder = IslandBuilder::new(mesh.vertex_count());
  for (direction, faces) in buckets.iter() {
    for &t in faces {
      builder.push_face(mesh, t, direction)?;
    }
  }
  let set = builder.finish();

  tracing::debug!(
    islands = set.islands.len(),
    duplicated_vertices = set.duplicated_vertices,
    "built islands"
  );
  Ok(set)
}

#[cfg(test)]
#[path = "islands_test.rs"]
mod islands_test;
