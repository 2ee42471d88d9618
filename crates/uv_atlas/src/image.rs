//! Stage 4: Island images
//!
//! Converts a projected island into a pixel-sized packing request:
//!
//! ```text
//! width  = ceil((max.x - min.x) * density) + padding
//! height = ceil((max.y - min.y) * density) + padding
//! ```
//!
//! The request keeps the island's entries and bounding box so the resolver
//! can normalize UVs into the rectangle the packer hands out.

use std::fmt;

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::projection::ProjectedIsland;
use crate::types::{AtlasConfig, Bounds2, Direction, UvEntry};

/// Identity of an island image within one atlas run.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct ImageId(u32);

impl ImageId {
  pub fn new(raw: u32) -> Self {
    Self(raw)
  }

  pub fn raw(&self) -> u32 {
    self.0
  }
}

impl fmt::Display for ImageId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}

/// A rectangle to be placed in the atlas.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageRequest {
  pub id: ImageId,

  /// Index of the mesh this island belongs to, in atlas submission order.
  pub owner: usize,

  pub direction: Direction,

  /// Size in pixels, padding included.
  pub width: u32,
  pub height: u32,

  /// Debug swatch colour (RGB).
  pub color: [u8; 3],

  pub entries: Vec<UvEntry>,

  /// Bounds of `entries` in projection space.
  pub bounds: Bounds2,
}

/// Hands out image ids and swatch colours for one atlas run.
#[derive(Clone, Debug)]
pub struct ImageAllocator {
  next: u32,
  rng: StdRng,
}

impl ImageAllocator {
  pub fn new(seed: u64) -> Self {
    Self {
      next: 0,
      rng: StdRng::seed_from_u64(seed),
    }
  }

  pub fn allocate(&mut self) -> (ImageId, [u8; 3]) {
    let id = ImageId(self.next);
    self.next += 1;
    (id, self.rng.random())
  }

  /// Number of ids handed out so far.
  pub fn allocated(&self) -> u32 {
    self.next
  }
}

/// Bounding box of an island's projected entries.
pub fn entry_bounds(entries: &[UvEntry]) -> Bounds2 {
  let mut bounds = Bounds2::empty();
  for entry in entries {
    bounds.encapsulate(entry.uv);
  }
  bounds
}

/// Pixel size of an island with the given bounds.
///
/// Sizes past `u32::MAX` saturate, so an oversized island can never fit and
/// surfaces as a capacity failure instead of wrapping to a small image.
pub fn image_size(bounds: &Bounds2, density: f32, padding: u32) -> (u32, u32) {
  let span: Vec2 = bounds.size() * density;
  let pixels = |extent: f32| (extent.ceil() as u32).saturating_add(padding);
  (pixels(span.x), pixels(span.y))
}

/// Build packing requests for the islands of one mesh.
///
/// Islands without entries are dropped with a warning; the returned count is
/// the number of such warnings.
pub fn build_images(
  islands: Vec<ProjectedIsland>,
  owner: usize,
  config: &AtlasConfig,
  allocator: &mut ImageAllocator,
) -> (Vec<ImageRequest>, usize) {
  let mut images = Vec::with_capacity(islands.len());
  let mut warnings = 0;

  for island in islands {
    if island.entries.is_empty() {
      warnings += 1;
      tracing::warn!(
        owner,
        direction = island.direction.label(),
        "dropping island without uv entries"
      );
      continue;
    }

    let bounds = entry_bounds(&island.entries);
    let (width, height) = image_size(&bounds, config.density, config.padding);
    let (id, color) = allocator.allocate();

    images.push(ImageRequest {
      id,
      owner,
      direction: island.direction,
      width,
      height,
      color,
      entries: island.entries,
      bounds,
    });
  }

  (images, warnings)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn entry(vertex: u32, x: f32, y: f32) -> UvEntry {
    UvEntry {
      vertex,
      uv: Vec2::new(x, y),
    }
  }

  fn island(entries: Vec<UvEntry>) -> ProjectedIsland {
    ProjectedIsland {
      direction: Direction::PosZ,
      entries,
    }
  }

  #[test]
  fn test_entry_bounds() {
    let bounds = entry_bounds(&[entry(0, 1.0, -1.0), entry(1, -2.0, 4.0), entry(2, 0.5, 0.5)]);
    assert_eq!(bounds.min, Vec2::new(-2.0, -1.0));
    assert_eq!(bounds.max, Vec2::new(1.0, 4.0));
  }

  #[test]
  fn test_image_size_rounds_up_and_pads() {
    let bounds = Bounds2 {
      min: Vec2::ZERO,
      max: Vec2::new(1.0, 0.5),
    };
    // 7 px/unit: 7.0 -> 7, 3.5 -> 4, plus 3 px padding.
    assert_eq!(image_size(&bounds, 7.0, 3), (10, 7));
  }

  #[test]
  fn test_degenerate_island_is_padding_only() {
    let bounds = entry_bounds(&[entry(0, 2.0, 2.0), entry(1, 2.0, 2.0)]);
    assert_eq!(image_size(&bounds, 7.0, 3), (3, 3));
  }

  #[test]
  fn test_huge_island_saturates() {
    let bounds = Bounds2 {
      min: Vec2::ZERO,
      max: Vec2::new(1.0e9, 2.0),
    };
    assert_eq!(image_size(&bounds, 7.0, 3), (u32::MAX, 17));

    let bounds = Bounds2 {
      min: Vec2::ZERO,
      max: Vec2::splat(f32::MAX),
    };
    assert_eq!(image_size(&bounds, 7.0, 3), (u32::MAX, u32::MAX));
  }

  #[test]
  fn test_build_images_assigns_sequential_ids() {
    let config = AtlasConfig::default();
    let mut allocator = ImageAllocator::new(1);
    let islands = vec![
      island(vec![entry(0, 0.0, 0.0), entry(1, 1.0, 1.0), entry(2, 0.0, 1.0)]),
      island(vec![entry(3, 5.0, 5.0), entry(4, 6.0, 5.0), entry(5, 6.0, 7.0)]),
    ];

    let (images, warnings) = build_images(islands, 2, &config, &mut allocator);

    assert_eq!(warnings, 0);
    assert_eq!(images.len(), 2);
    assert_eq!(images[0].id, ImageId::new(0));
    assert_eq!(images[1].id, ImageId::new(1));
    assert!(images.iter().all(|image| image.owner == 2));
    assert_eq!((images[1].width, images[1].height), (10, 17));
    assert_eq!(images[1].bounds.min, Vec2::new(5.0, 5.0));
    assert_eq!(allocator.allocated(), 2);
  }

  #[test]
  fn test_empty_island_is_dropped_with_warning() {
    let config = AtlasConfig::default();
    let mut allocator = ImageAllocator::new(0);
    let islands = vec![island(Vec::new()), island(vec![entry(0, 0.0, 0.0)])];

    let (images, warnings) = build_images(islands, 0, &config, &mut allocator);

    assert_eq!(warnings, 1);
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].id, ImageId::new(0));
  }

  #[test]
  fn test_swatch_colours_are_seeded() {
    let mut a = ImageAllocator::new(7);
    let mut b = ImageAllocator::new(7);
    for _ in 0..8 {
      assert_eq!(a.allocate(), b.allocate());
    }
    assert_eq!(ImageId::new(3).to_string(), "#3");
  }
}
