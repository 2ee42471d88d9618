//! Stage 6: UV resolution
//!
//! Walks the packed leaves of one mesh and writes the final atlas UV of every
//! entry:
//!
//! ```text
//! offset = (rect.left + padding, rect.bottom + padding) / extent
//! uv     = (raw - bounds.min) * density / extent + offset
//! ```
//!
//! The scale divides by the atlas extent, not by the image size, so one world
//! unit always covers `density` atlas pixels. The first write of a vertex
//! wins; a later entry with a different value only raises a warning.

use glam::Vec2;

use crate::image::ImageRequest;
use crate::mesh::Mesh;
use crate::packer::AtlasPacker;
use crate::types::{AtlasConfig, Rect};

const CONFLICT_EPSILON: f32 = 1e-6;

/// Counters from resolving one mesh.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResolveReport {
  /// Packed images of the mesh that were resolved.
  pub images: usize,

  /// Vertices that received a UV.
  pub written: usize,

  /// Repeated writes whose value differed from the first one.
  pub conflicts: usize,

  /// Entries that landed outside their image rectangle.
  pub out_of_bounds: usize,
}

impl ResolveReport {
  /// Number of structural warnings raised.
  pub fn warnings(&self) -> usize {
    self.conflicts + self.out_of_bounds
  }
}

/// Offset of an image's usable area in normalized atlas space.
#[inline]
pub fn image_offset(rect: &Rect, config: &AtlasConfig) -> Vec2 {
  let padding = config.padding as f32;
  Vec2::new(rect.left as f32 + padding, rect.bottom as f32 + padding) / config.extent as f32
}

/// Rewrite `mesh.uv2` from every packed image owned by `owner`.
///
/// `uv2` is resized to the vertex count; vertices no entry refers to get
/// `(0, 0)`.
pub fn resolve_uvs(
  packer: &AtlasPacker,
  owner: usize,
  mesh: &mut Mesh,
  config: &AtlasConfig,
) -> ResolveReport {
  let vertex_count = mesh.vertex_count();
  mesh.uv2.clear();
  mesh.uv2.resize(vertex_count, Vec2::ZERO);
  let mut written = vec![false; vertex_count];
  let mut report = ResolveReport::default();

  for (_, rect, image) in packer.packed() {
    if image.owner != owner {
      continue;
    }
    report.images += 1;
    resolve_image(rect, image, config, &mut mesh.uv2, &mut written, &mut report);
  }

  tracing::debug!(
    owner,
    images = report.images,
    written = report.written,
    conflicts = report.conflicts,
    out_of_bounds = report.out_of_bounds,
    "resolved uvs"
  );
  report
}

fn resolve_image(
  rect: &Rect,
  image: &ImageRequest,
  config: &AtlasConfig,
  uv2: &mut [Vec2],
  written: &mut [bool],
  report: &mut ResolveReport,
) {
  let extent = config.extent as f32;
  let scale = config.uv_scale();
  let offset = image_offset(rect, config);
  let limit = Vec2::new(rect.width() as f32, rect.height() as f32) / extent;

  for entry in &image.entries {
    let local = (entry.uv - image.bounds.min) * scale;
    if !(local.cmpge(Vec2::ZERO).all() && local.cmple(limit).all()) {
      report.out_of_bounds += 1;
      tracing::warn!(
        image = %image.id,
        vertex = entry.vertex,
        u = local.x,
        v = local.y,
        "uv entry out of bounds"
      );
    }

    let uv = local + offset;
    let slot = entry.vertex as usize;
    let Some(target) = uv2.get_mut(slot) else {
      report.out_of_bounds += 1;
      tracing::warn!(image = %image.id, vertex = entry.vertex, "uv entry references a missing vertex");
      continue;
    };

    if written[slot] {
      if !target.abs_diff_eq(uv, CONFLICT_EPSILON) {
        report.conflicts += 1;
        tracing::warn!(
          image = %image.id,
          vertex = entry.vertex,
          kept = ?*target,
          ignored = ?uv,
          "vertex already resolved with a different uv"
        );
      }
      continue;
    }

    *target = uv;
    written[slot] = true;
    report.written += 1;
  }
}
