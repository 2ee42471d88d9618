//! Shared atlas builder
//!
//! Runs meshes through the unwrap pipeline into one common atlas.
//!
//! ```text
//!   add_meshes(&mut [Mesh])
//!        │
//!        ▼
//!   ┌───────────────────────────────┐
//!   │ prepare (rayon, per mesh)     │  validate → classify → islands → project
//!   └───────────────┬───────────────┘  on a private copy of the mesh
//!                   ▼
//!   ┌───────────────────────────────┐
//!   │ commit (serial, input order)  │  images → pack → resolve → write back
//!   └───────────────────────────────┘
//! ```
//!
//! Packing and resolution share one tree and run in submission order, so the
//! layout depends on the order meshes are added. A mesh whose images do not
//! all fit is rolled back completely: the tree, the id allocator and the
//! caller's mesh are left as they were.

use rayon::prelude::*;

use crate::classify::classify_faces;
use crate::error::{AtlasError, Result};
use crate::image::{build_images, ImageAllocator, ImageId};
use crate::islands::build_islands;
use crate::mesh::Mesh;
use crate::packer::AtlasPacker;
use crate::projection::{project_islands, ProjectedIsland};
use crate::resolve::resolve_uvs;
use crate::types::{AtlasConfig, Rect};

/// Counters for one unwrapped mesh.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UnwrapStats {
  /// Triangles in the input mesh.
  pub triangles: usize,
  /// Triangles assigned to an island. Always equal to `triangles`.
  pub triangles_in_islands: usize,
  pub vertices_before: usize,
  pub vertices_after: usize,
  /// Seam vertices appended to the mesh.
  pub duplicated_vertices: usize,
  pub islands: usize,
  pub images_packed: usize,
  /// Structural warnings raised while unwrapping (see `tracing` output).
  pub warnings: usize,
}

/// Solid debug rectangle for one packed image.
///
/// `rect` is the image's usable area: the packed node moved in by the padding
/// on the left and bottom edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Swatch {
  pub image: ImageId,
  pub owner: usize,
  pub rect: Rect,
  pub color: [u8; 3],
}

/// Mesh that went through the per-mesh stages and waits for packing.
struct PreparedMesh {
  mesh: Mesh,
  islands: Vec<ProjectedIsland>,
  stats: UnwrapStats,
}

/// Classify, split and project a copy of `source`.
fn prepare(source: &Mesh) -> Result<PreparedMesh> {
  source.validate()?;
  let mut mesh = source.clone();

  let buckets = {
    let _span = tracing::info_span!("classify").entered();
    classify_faces(&mesh)
  };

  let set = build_islands(&mut mesh, &buckets)?;

  let islands = {
    let _span = tracing::info_span!("project").entered();
    project_islands(&mesh, &set)
  };

  let stats = UnwrapStats {
    triangles: source.triangle_count(),
    triangles_in_islands: set.face_count(),
    vertices_before: source.vertex_count(),
    vertices_after: mesh.vertex_count(),
    duplicated_vertices: set.duplicated_vertices,
    islands: set.islands.len(),
    images_packed: 0,
    warnings: set.warnings,
  };

  tracing::debug!(
    triangles = stats.triangles,
    buckets = buckets.non_empty_buckets(),
    islands = stats.islands,
    duplicated_vertices = stats.duplicated_vertices,
    "prepared mesh"
  );

  Ok(PreparedMesh {
    mesh,
    islands,
    stats,
  })
}

/// Packs any number of meshes into one atlas.
#[derive(Clone, Debug)]
pub struct AtlasBuilder {
  config: AtlasConfig,
  packer: AtlasPacker,
  allocator: ImageAllocator,
  meshes_added: usize,
}

impl AtlasBuilder {
  pub fn new(config: AtlasConfig) -> Result<Self> {
    config.validate()?;
    Ok(Self {
      packer: AtlasPacker::new(config.extent),
      allocator: ImageAllocator::new(config.swatch_seed),
      meshes_added: 0,
      config,
    })
  }

  pub fn config(&self) -> &AtlasConfig {
    &self.config
  }

  /// The shared packing tree.
  pub fn packer(&self) -> &AtlasPacker {
    &self.packer
  }

  /// Meshes successfully added so far; also the owner id of the next one.
  pub fn mesh_count(&self) -> usize {
    self.meshes_added
  }

  /// Unwrap `mesh` into the atlas.
  ///
  /// On success the mesh has grown by its seam duplicates and `uv2` holds one
  /// atlas UV per vertex. On error the mesh is unchanged.
  #[tracing::instrument(skip_all, name = "atlas::add_mesh", fields(owner = self.meshes_added))]
  pub fn add_mesh(&mut self, mesh: &mut Mesh) -> Result<UnwrapStats> {
    let prepared = prepare(mesh)?;
    self.commit(prepared, mesh)
  }

  /// Unwrap several meshes into the atlas.
  ///
  /// The per-mesh stages run in parallel; packing and resolution follow
  /// serially in slice order. An input error in any mesh aborts before
  /// anything is packed. A capacity failure stops at the failing mesh:
  /// meshes before it stay committed, it and the rest are unchanged.
  #[tracing::instrument(skip_all, name = "atlas::add_meshes", fields(meshes = meshes.len()))]
  pub fn add_meshes(&mut self, meshes: &mut [Mesh]) -> Result<Vec<UnwrapStats>> {
    let prepared: Vec<PreparedMesh> = meshes
      .par_iter()
      .map(prepare)
      .collect::<Result<_>>()?;

    let _span = tracing::info_span!("commit").entered();
    prepared
      .into_iter()
      .zip(meshes.iter_mut())
      .map(|(prepared, mesh)| self.commit(prepared, mesh))
      .collect()
  }

  /// Pack a prepared mesh, resolve its UVs and hand it back to `target`.
  fn commit(&mut self, prepared: PreparedMesh, target: &mut Mesh) -> Result<UnwrapStats> {
    let PreparedMesh {
      mut mesh,
      islands,
      mut stats,
    } = prepared;
    let owner = self.meshes_added;

    let checkpoint = self.packer.checkpoint();
    let allocator = self.allocator.clone();
    let (images, dropped) = build_images(islands, owner, &self.config, &mut self.allocator);
    stats.warnings += dropped;

    {
      let _span = tracing::info_span!("pack", images = images.len()).entered();
      for image in images {
        if let Err(image) = self.packer.insert(image) {
          self.packer.rollback(checkpoint);
          self.allocator = allocator;
          tracing::warn!(
            image = %image.id,
            owner,
            width = image.width,
            height = image.height,
            "atlas is full"
          );
          return Err(AtlasError::AtlasFull {
            image: image.id,
            owner,
            width: image.width,
            height: image.height,
            extent: self.config.extent,
          });
        }
        stats.images_packed += 1;
      }
      self.packer.release();
    }

    let report = {
      let _span = tracing::info_span!("resolve").entered();
      resolve_uvs(&self.packer, owner, &mut mesh, &self.config)
    };
    stats.warnings += report.warnings();

    *target = mesh;
    self.meshes_added += 1;

    tracing::debug!(
      owner,
      images = stats.images_packed,
      vertices = stats.vertices_after,
      occupancy = self.packer.occupancy(),
      "committed mesh"
    );
    Ok(stats)
  }

  /// One debug swatch per packed image, in tree order.
  pub fn swatches(&self) -> Vec<Swatch> {
    let padding = self.config.padding as i32;
    self
      .packer
      .packed()
      .into_iter()
      .map(|(_, rect, image)| {
        let left = rect.left + padding;
        let bottom = rect.bottom + padding;
        Swatch {
          image: image.id,
          owner: image.owner,
          rect: Rect::new(
            left,
            bottom + image.height as i32 - padding - 1,
            left + image.width as i32 - padding - 1,
            bottom,
          ),
          color: image.color,
        }
      })
      .collect()
  }
}

#[cfg(test)]
#[path = "atlas_test.rs"]
mod atlas_test;
