//! uv_atlas - Engine independent lightmap unwrapping and atlas packing
//!
//! This crate generates a second, non-overlapping UV channel for arbitrary
//! triangle meshes so every triangle owns a unique, padded region of one
//! fixed-size texture. Several meshes can share the same atlas.
//!
//! ```text
//! ┌──────────┐   ┌─────────┐   ┌──────────┐   ┌────────┐   ┌────────┐   ┌─────────┐
//! │ Classify ├──►│ Islands ├──►│ Project  ├──►│ Images ├──►│  Pack  ├──►│ Resolve │
//! └──────────┘   └─────────┘   └──────────┘   └────────┘   └────────┘   └─────────┘
//!      │              │              │             │            │             │
//!  FaceBuckets    IslandSet   ProjectedIsland ImageRequest   NodeId      mesh.uv2
//!  (6 axes)     (+ seam dups)  (UvEntry list)  (px size)   (guillotine)  (atlas UVs)
//! ```
//!
//! # Features
//!
//! - **Dominant-axis classification**: triangles are bucketed into ±X/±Y/±Z
//! - **Seam splitting**: vertices shared across buckets are duplicated once per
//!   (vertex, bucket) pair so islands never leak into each other
//! - **Guillotine packing**: a binary split tree places every island in a
//!   shared atlas, reporting capacity failures instead of truncating
//! - **Parallel preparation**: multi-mesh runs classify and project on rayon,
//!   packing stays serial and deterministic
//!
//! # Example
//!
//! ```
//! use uv_atlas::{primitives, AtlasBuilder, AtlasConfig};
//!
//! let mut cube = primitives::cube(2.0);
//! let mut builder = AtlasBuilder::new(AtlasConfig::default()).unwrap();
//! let stats = builder.add_mesh(&mut cube).unwrap();
//!
//! assert_eq!(stats.islands, 6);
//! assert_eq!(cube.uv2.len(), cube.vertex_count());
//! ```

pub mod atlas;
pub mod classify;
pub mod disjoint_set;
pub mod error;
pub mod image;
pub mod islands;
pub mod mesh;
pub mod packer;
pub mod primitives;
pub mod projection;
pub mod resolve;
pub mod types;

// Re-export commonly used items
pub use atlas::{AtlasBuilder, Swatch, UnwrapStats};
pub use classify::{classify_faces, classify_normal, FaceBuckets};
pub use error::{AtlasError, Result};
pub use image::{ImageId, ImageRequest};
pub use islands::{build_islands, Island, IslandSet};
pub use mesh::Mesh;
pub use packer::{AtlasPacker, NodeId, PackNode};
pub use projection::{project_islands, ProjectedIsland};
pub use resolve::{resolve_uvs, ResolveReport};
pub use types::{AtlasConfig, Bounds2, Direction, Rect, UvEntry};
