//! Fatal pipeline errors.
//!
//! Structural problems that still allow a best-effort result (an island with
//! no entries, a vertex resolved twice with different UVs) are not errors:
//! they are logged through `tracing` and counted in
//! [`UnwrapStats::warnings`](crate::UnwrapStats::warnings).

use thiserror::Error;

use crate::image::ImageId;

/// Result type alias using [`AtlasError`].
pub type Result<T> = std::result::Result<T, AtlasError>;

/// Errors that stop an unwrap run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AtlasError {
  /// A flat input buffer does not hold whole tuples.
  #[error("{buffer} buffer length {len} is not a multiple of {stride}")]
  BufferStride {
    buffer: &'static str,
    len: usize,
    stride: usize,
  },

  /// Normal buffer is not index-aligned with the position buffer.
  #[error("mesh has {normals} normals for {positions} positions")]
  NormalCountMismatch { positions: usize, normals: usize },

  /// A triangle references a vertex that does not exist.
  #[error("triangle {triangle} references vertex {index} but the mesh has {vertex_count} vertices")]
  IndexOutOfRange {
    triangle: usize,
    index: u32,
    vertex_count: usize,
  },

  /// A vertex position has a NaN or infinite coordinate.
  #[error("vertex {vertex} has a non-finite position")]
  NonFiniteVertex { vertex: usize },

  /// Seam duplication would overflow 32-bit vertex indices.
  #[error("mesh vertex count exceeds the 32-bit index range")]
  TooManyVertices,

  /// Invalid configuration value.
  #[error("invalid atlas configuration: {name} = {value} ({reason})")]
  InvalidConfig {
    name: &'static str,
    value: String,
    reason: &'static str,
  },

  /// An island image could not be placed anywhere in the atlas.
  #[error(
    "image {image} of mesh {owner} ({width}x{height} px) does not fit in the remaining space of the {extent}x{extent} atlas"
  )]
  AtlasFull {
    image: ImageId,
    owner: usize,
    width: u32,
    height: u32,
    extent: u32,
  },
}

impl AtlasError {
  /// Create an invalid configuration error.
  pub fn invalid_config<T: std::fmt::Display>(
    name: &'static str,
    value: T,
    reason: &'static str,
  ) -> Self {
    AtlasError::InvalidConfig {
      name,
      value: value.to_string(),
      reason,
    }
  }

  /// True for capacity failures, which a caller may retry with a larger atlas.
  pub fn is_capacity_failure(&self) -> bool {
    matches!(self, AtlasError::AtlasFull { .. })
  }
}
