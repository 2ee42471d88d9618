//! End-to-end checks of the unwrap pipeline through the public API.

use std::collections::HashSet;

use glam::{Vec2, Vec3};
use uv_atlas::{
  build_islands, classify_faces, primitives, AtlasBuilder, AtlasConfig, AtlasError, Direction,
  ImageId, Mesh,
};

fn flat_squares(offsets: &[f32], size: f32) -> Mesh {
  let mut positions = Vec::new();
  let mut indices = Vec::new();
  for &x in offsets {
    let base = positions.len() as u32;
    positions.extend([
      Vec3::new(x, 0.0, 0.0),
      Vec3::new(x + size, 0.0, 0.0),
      Vec3::new(x + size, size, 0.0),
      Vec3::new(x, size, 0.0),
    ]);
    indices.extend([base, base + 1, base + 2, base, base + 2, base + 3]);
  }
  let normals = vec![Vec3::Z; positions.len()];
  Mesh::new(positions, normals, indices)
}

/// A 12 triangle cube gives one island per face; every face is a quad split
/// in two, so each island holds two triangles.
#[test]
fn cube_forms_one_island_per_face() {
  let mut cube = primitives::cube(1.0);
  let buckets = classify_faces(&cube);
  assert_eq!(buckets.non_empty_buckets(), 6);

  let set = build_islands(&mut cube, &buckets).unwrap();
  assert_eq!(set.islands.len(), 6);

  let directions: HashSet<Direction> = set.islands.iter().map(|i| i.direction).collect();
  assert_eq!(directions.len(), 6);
  assert!(set.islands.iter().all(|island| island.faces.len() == 2));
}

#[test]
fn every_triangle_is_assigned_exactly_once() {
  for mut mesh in [
    primitives::welded_cube(1.0),
    primitives::sphere(9, 2.0),
    flat_squares(&[0.0, 2.0, 4.0], 1.0),
  ] {
    let buckets = classify_faces(&mesh);
    let set = build_islands(&mut mesh, &buckets).unwrap();

    let mut faces: Vec<u32> = set.islands.iter().flat_map(|i| i.faces.clone()).collect();
    faces.sort_unstable();
    assert_eq!(faces, (0..mesh.triangle_count() as u32).collect::<Vec<_>>());
  }
}

#[test]
fn disjoint_squares_form_separate_islands() {
  let mut squares = flat_squares(&[0.0, 3.0], 1.0);
  let buckets = classify_faces(&squares);
  assert_eq!(buckets.get(Direction::PosZ).len(), 4);

  let set = build_islands(&mut squares, &buckets).unwrap();
  assert_eq!(set.islands.len(), 2);
}

/// 3x3 px images (no padding, one pixel per unit) in a 4x4 atlas.
#[test]
fn second_image_overflows_tiny_atlas() {
  let config = AtlasConfig::default()
    .with_extent(4)
    .with_density(1.0)
    .with_padding(0);
  let mut builder = AtlasBuilder::new(config).unwrap();
  let mut squares = flat_squares(&[0.0, 10.0], 3.0);

  let err = builder.add_mesh(&mut squares).unwrap_err();

  assert_eq!(
    err,
    AtlasError::AtlasFull {
      image: ImageId::new(1),
      owner: 0,
      width: 3,
      height: 3,
      extent: 4,
    }
  );
  assert!(err.to_string().contains("4x4"));
  assert!(squares.uv2.is_empty());
}

/// An island far larger than any atlas fails to pack instead of wrapping
/// around to a tiny image.
#[test]
fn huge_island_is_a_capacity_failure() {
  let mut builder = AtlasBuilder::new(AtlasConfig::default()).unwrap();
  let mut mesh = Mesh::new(
    vec![Vec3::ZERO, Vec3::new(1.0e9, 0.0, 0.0), Vec3::new(0.0, 1.0e9, 0.0)],
    vec![Vec3::Z; 3],
    vec![0, 1, 2],
  );

  let err = builder.add_mesh(&mut mesh).unwrap_err();

  assert!(err.is_capacity_failure(), "{err}");
  assert!(matches!(
    err,
    AtlasError::AtlasFull {
      width: u32::MAX,
      height: u32::MAX,
      ..
    }
  ));
  assert_eq!(builder.packer().image_count(), 0);
  assert!(mesh.uv2.is_empty());
}

/// A single +Z triangle in the unit square resolves inside its image.
#[test]
fn single_triangle_round_trip() {
  let config = AtlasConfig::default();
  let extent = config.extent as f32;
  let padding = config.padding as i32;
  let mut builder = AtlasBuilder::new(config).unwrap();
  let mut mesh = Mesh::from_buffers(
    &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
    &[0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
    &[0, 1, 2],
  )
  .unwrap();

  let stats = builder.add_mesh(&mut mesh).unwrap();
  assert_eq!(stats.images_packed, 1);

  let packed = builder.packer().packed();
  let (_, rect, image) = packed[0];
  let offset = Vec2::new((rect.left + padding) as f32, (rect.bottom + padding) as f32) / extent;
  let size = Vec2::new(image.width as f32, image.height as f32) / extent;

  for uv in &mesh.uv2 {
    assert!(uv.cmpge(offset).all(), "{uv} below {offset}");
    assert!(uv.cmple(offset + size).all(), "{uv} beyond {}", offset + size);
  }
  assert_eq!(mesh.flat_uv2().len(), 6);
}

/// Reclassifying a resolved mesh keeps the bucket of every triangle.
#[test]
fn classification_survives_unwrap() {
  let mut sphere = primitives::sphere(7, 5.0);
  let before = classify_faces(&sphere);

  let mut builder = AtlasBuilder::new(AtlasConfig::default()).unwrap();
  builder.add_mesh(&mut sphere).unwrap();

  assert_eq!(classify_faces(&sphere), before);
}

#[test]
fn transformed_mesh_scales_with_density() {
  let mut small = primitives::cube(1.0);
  let mut large = primitives::cube(1.0);
  large.apply_transform(&glam::Mat4::from_scale(Vec3::splat(4.0)));

  let mut builder = AtlasBuilder::new(AtlasConfig::default()).unwrap();
  builder.add_mesh(&mut small).unwrap();
  builder.add_mesh(&mut large).unwrap();

  let sizes: Vec<(usize, u32)> = builder
    .packer()
    .packed()
    .iter()
    .map(|(_, _, image)| (image.owner, image.width))
    .collect();
  // 1 unit -> 7 + 3 px, 4 units -> 28 + 3 px
  assert!(sizes.iter().filter(|(owner, _)| *owner == 0).all(|&(_, w)| w == 10));
  assert!(sizes.iter().filter(|(owner, _)| *owner == 1).all(|&(_, w)| w == 31));
}
