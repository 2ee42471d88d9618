//! Core data types shared by every unwrap stage.

use glam::Vec2;

use crate::error::{AtlasError, Result};

/// Dominant-axis bucket a triangle is classified into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
  PosX,
  NegX,
  PosY,
  NegY,
  PosZ,
  NegZ,
}

impl Direction {
  /// All buckets in processing order.
  pub const ALL: [Direction; 6] = [
    Direction::PosX,
    Direction::NegX,
    Direction::PosY,
    Direction::NegY,
    Direction::PosZ,
    Direction::NegZ,
  ];

  /// Stable index in `[0, 6)`, matching the order of [`Direction::ALL`].
  #[inline]
  pub fn index(self) -> usize {
    self as usize
  }

  /// Short label used in log output.
  pub fn label(self) -> &'static str {
    match self {
      Direction::PosX => "+X",
      Direction::NegX => "-X",
      Direction::PosY => "+Y",
      Direction::NegY => "-Y",
      Direction::PosZ => "+Z",
      Direction::NegZ => "-Z",
    }
  }
}

/// Projected vertex occurrence: a vertex id and its 2D position in the
/// island's projection plane (world units).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UvEntry {
  pub vertex: u32,
  pub uv: Vec2,
}

/// Axis-aligned 2D bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds2 {
  pub min: Vec2,
  pub max: Vec2,
}

impl Bounds2 {
  /// Create bounds with inverted extents (ready for encapsulation).
  pub fn empty() -> Self {
    Self {
      min: Vec2::splat(f32::INFINITY),
      max: Vec2::splat(f32::NEG_INFINITY),
    }
  }

  /// Expand the bounds to include a point.
  #[inline]
  pub fn encapsulate(&mut self, point: Vec2) {
    self.min = self.min.min(point);
    self.max = self.max.max(point);
  }

  /// Check if bounds are valid (min <= max on both axes).
  pub fn is_valid(&self) -> bool {
    self.min.x <= self.max.x && self.min.y <= self.max.y
  }

  /// Extent along both axes. Zero for empty bounds.
  pub fn size(&self) -> Vec2 {
    if self.is_valid() {
      self.max - self.min
    } else {
      Vec2::ZERO
    }
  }
}

impl Default for Bounds2 {
  fn default() -> Self {
    Self::empty()
  }
}

/// Integer pixel rectangle inside the atlas.
///
/// Bounds are inclusive and y points up, so `top >= bottom` for any
/// non-empty rectangle:
///
/// ```text
///   top    ┌─────────┐
///          │         │  width  = right - left + 1
///          │         │  height = top - bottom + 1
///   bottom └─────────┘
///        left      right
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rect {
  pub left: i32,
  pub top: i32,
  pub right: i32,
  pub bottom: i32,
}

impl Rect {
  pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
    Self {
      left,
      top,
      right,
      bottom,
    }
  }

  /// Full atlas rectangle for a square atlas of `extent` pixels.
  pub fn atlas(extent: u32) -> Self {
    let last = extent as i32 - 1;
    Self::new(0, last, last, 0)
  }

  #[inline]
  pub fn width(&self) -> i32 {
    self.right - self.left + 1
  }

  #[inline]
  pub fn height(&self) -> i32 {
    self.top - self.bottom + 1
  }

  pub fn is_empty(&self) -> bool {
    self.width() <= 0 || self.height() <= 0
  }

  /// True if an image of `width` x `height` pixels fits inside.
  #[inline]
  pub fn fits(&self, width: u32, height: u32) -> bool {
    height as i64 <= self.height() as i64 && width as i64 <= self.width() as i64
  }

  /// True if an image of `width` x `height` pixels fills the rectangle exactly.
  #[inline]
  pub fn is_perfect_fit(&self, width: u32, height: u32) -> bool {
    height as i64 == self.height() as i64 && width as i64 == self.width() as i64
  }

  /// True if the two rectangles share at least one pixel.
  pub fn overlaps(&self, other: &Rect) -> bool {
    if self.is_empty() || other.is_empty() {
      return false;
    }
    self.left <= other.right
      && other.left <= self.right
      && self.bottom <= other.top
      && other.bottom <= self.top
  }

  /// True if `other` lies entirely inside this rectangle.
  pub fn contains(&self, other: &Rect) -> bool {
    other.left >= self.left
      && other.right <= self.right
      && other.bottom >= self.bottom
      && other.top <= self.top
  }

  /// Pixel area (zero for empty rectangles).
  pub fn area(&self) -> u64 {
    if self.is_empty() {
      0
    } else {
      self.width() as u64 * self.height() as u64
    }
  }
}

/// Configuration for one atlas run.
#[derive(Clone, Debug, PartialEq)]
pub struct AtlasConfig {
  /// Atlas side length in pixels (square atlas).
  pub extent: u32,

  /// Pixels per world unit.
  pub density: f32,

  /// Pixels reserved on the left and bottom edge of every packed image.
  pub padding: u32,

  /// Seed for the debug swatch colours.
  pub swatch_seed: u64,
}

impl Default for AtlasConfig {
  fn default() -> Self {
    Self {
      extent: 1024,
      density: 7.0,
      padding: 3,
      swatch_seed: 0,
    }
  }
}

impl AtlasConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_extent(mut self, extent: u32) -> Self {
    self.extent = extent;
    self
  }

  pub fn with_density(mut self, density: f32) -> Self {
    self.density = density;
    self
  }

  pub fn with_padding(mut self, padding: u32) -> Self {
    self.padding = padding;
    self
  }

  pub fn with_swatch_seed(mut self, seed: u64) -> Self {
    self.swatch_seed = seed;
    self
  }

  /// Reject configurations the pipeline cannot run with.
  ///
  /// A non power-of-two extent is allowed but logged.
  pub fn validate(&self) -> Result<()> {
    if self.extent == 0 || self.extent > i32::MAX as u32 {
      return Err(AtlasError::invalid_config(
        "extent",
        self.extent,
        "must be in 1..=i32::MAX",
      ));
    }
    if !self.density.is_finite() || self.density <= 0.0 {
      return Err(AtlasError::invalid_config(
        "density",
        self.density,
        "must be finite and positive",
      ));
    }
    if self.padding >= self.extent {
      return Err(AtlasError::invalid_config(
        "padding",
        self.padding,
        "must be smaller than the atlas extent",
      ));
    }
    if !self.extent.is_power_of_two() {
      tracing::warn!(extent = self.extent, "atlas extent is not a power of two");
    }
    Ok(())
  }

  /// Scale from world-space projection units to normalized atlas UVs.
  #[inline]
  pub fn uv_scale(&self) -> f32 {
    self.density / self.extent as f32
  }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
