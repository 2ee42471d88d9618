use glam::{Vec2, Vec3};

use super::*;
use crate::primitives;

fn builder(extent: u32) -> AtlasBuilder {
  AtlasBuilder::new(AtlasConfig::default().with_extent(extent)).unwrap()
}

/// Atlas UV of `vertex` in pixel units.
fn pixel(mesh: &Mesh, vertex: u32, extent: u32) -> Vec2 {
  mesh.uv2[vertex as usize] * extent as f32
}

/// True if `point` (pixels) lies inside the swatch, right/top edge inclusive.
fn swatch_contains(swatch: &Swatch, point: Vec2) -> bool {
  const EPS: f32 = 1e-3;
  point.x >= swatch.rect.left as f32 - EPS
    && point.x <= (swatch.rect.right + 1) as f32 + EPS
    && point.y >= swatch.rect.bottom as f32 - EPS
    && point.y <= (swatch.rect.top + 1) as f32 + EPS
}

/// Every triangle of mesh `owner` must sit inside one of its swatches.
fn assert_triangles_in_swatches(builder: &AtlasBuilder, owner: usize, mesh: &Mesh) {
  let extent = builder.config().extent;
  let swatches: Vec<Swatch> = builder
    .swatches()
    .into_iter()
    .filter(|swatch| swatch.owner == owner)
    .collect();

  for t in 0..mesh.triangle_count() {
    let corners = mesh.triangle(t).map(|v| pixel(mesh, v, extent));
    assert!(
      swatches
        .iter()
        .any(|swatch| corners.iter().all(|&c| swatch_contains(swatch, c))),
      "triangle {t} of mesh {owner} is not inside any of its swatches"
    );
  }
}

#[test]
fn test_cube_scenario() {
  let mut cube = primitives::cube(2.0);
  let mut builder = builder(1024);

  let stats = builder.add_mesh(&mut cube).unwrap();

  assert_eq!(stats.triangles, 12);
  assert_eq!(stats.triangles_in_islands, 12);
  assert_eq!(stats.islands, 6);
  assert_eq!(stats.images_packed, 6);
  assert_eq!(stats.duplicated_vertices, 0);
  assert_eq!(stats.warnings, 0);
  assert_eq!(cube.uv2.len(), 24);
  assert!(cube
    .uv2
    .iter()
    .all(|uv| uv.cmpge(Vec2::ZERO).all() && uv.cmple(Vec2::ONE).all()));
  assert_triangles_in_swatches(&builder, 0, &cube);
}

#[test]
fn test_welded_cube_grows_before_resolve() {
  let mut cube = primitives::welded_cube(2.0);
  let mut builder = builder(1024);

  let stats = builder.add_mesh(&mut cube).unwrap();

  assert_eq!(stats.vertices_before, 8);
  assert_eq!(stats.vertices_after, 24);
  assert_eq!(stats.duplicated_vertices, 16);
  assert_eq!(cube.vertex_count(), 24);
  assert_eq!(cube.uv2.len(), 24);
  assert_eq!(stats.warnings, 0);
  assert_triangles_in_swatches(&builder, 0, &cube);
}

/// 2x2 faces at 7 px per unit: 14 px of surface plus 3 px padding.
#[test]
fn test_swatch_geometry() {
  let mut cube = primitives::cube(2.0);
  let mut builder = builder(1024);
  builder.add_mesh(&mut cube).unwrap();

  let packed = builder.packer().packed();
  let swatches = builder.swatches();
  assert_eq!(swatches.len(), 6);

  for ((_, rect, image), swatch) in packed.iter().zip(&swatches) {
    assert_eq!((image.width, image.height), (17, 17));
    assert_eq!(swatch.image, image.id);
    assert_eq!(swatch.color, image.color);
    assert_eq!(swatch.rect.left, rect.left + 3);
    assert_eq!(swatch.rect.bottom, rect.bottom + 3);
    assert_eq!(swatch.rect.width(), 14);
    assert_eq!(swatch.rect.height(), 14);
    assert!(rect.contains(&swatch.rect));
  }
}

#[test]
fn test_capacity_failure_leaves_everything_untouched() {
  let original = primitives::cube(2.0);
  let mut cube = original.clone();
  // Only one 17x17 image fits in 32x32.
  let mut builder = builder(32);

  let err = builder.add_mesh(&mut cube).unwrap_err();

  assert!(err.is_capacity_failure());
  match err {
    AtlasError::AtlasFull {
      image,
      owner,
      width,
      height,
      extent,
    } => {
      assert_eq!(image, ImageId::new(1));
      assert_eq!(owner, 0);
      assert_eq!((width, height, extent), (17, 17, 32));
    }
    other => panic!("unexpected error: {other}"),
  }
  assert_eq!(cube, original);
  assert_eq!(builder.packer().node_count(), 1);
  assert_eq!(builder.packer().image_count(), 0);
  assert_eq!(builder.mesh_count(), 0);

  // The atlas is still usable, and ids restart where they were.
  let mut plane = primitives::plane(1.0);
  let stats = builder.add_mesh(&mut plane).unwrap();
  assert_eq!(stats.images_packed, 1);
  assert_eq!(builder.swatches()[0].image, ImageId::new(0));
  assert_eq!(builder.swatches()[0].owner, 0);
}

#[test]
fn test_invalid_mesh_is_rejected() {
  let mut mesh = Mesh::new(vec![Vec3::ZERO; 3], vec![Vec3::Z; 3], vec![0, 1, 3]);
  let mut builder = builder(64);

  let err = builder.add_mesh(&mut mesh).unwrap_err();
  assert_eq!(
    err,
    AtlasError::IndexOutOfRange {
      triangle: 0,
      index: 3,
      vertex_count: 3
    }
  );
  assert!(mesh.uv2.is_empty());
}

#[test]
fn test_invalid_config_is_rejected() {
  let err = AtlasBuilder::new(AtlasConfig::default().with_density(0.0)).unwrap_err();
  assert!(matches!(err, AtlasError::InvalidConfig { name: "density", .. }));
}

#[test]
fn test_meshes_share_the_atlas_without_overlap() {
  let mut meshes = vec![
    primitives::cube(2.0),
    primitives::sphere(6, 4.0),
    primitives::plane(3.0),
    primitives::welded_cube(1.0),
  ];
  let mut builder = builder(512);

  let stats = builder.add_meshes(&mut meshes).unwrap();

  assert_eq!(stats.len(), 4);
  assert_eq!(builder.mesh_count(), 4);
  let packed = builder.packer().packed();
  assert_eq!(packed.len(), stats.iter().map(|s| s.images_packed).sum::<usize>());
  for (i, (_, a, _)) in packed.iter().enumerate() {
    for (_, b, _) in &packed[i + 1..] {
      assert!(!a.overlaps(b));
    }
  }

  for (owner, (mesh, stats)) in meshes.iter().zip(&stats).enumerate() {
    assert_eq!(stats.triangles_in_islands, stats.triangles);
    assert_eq!(mesh.uv2.len(), mesh.vertex_count());
    assert_triangles_in_swatches(&builder, owner, mesh);
  }
}

#[test]
fn test_parallel_matches_sequential() {
  let inputs = vec![
    primitives::sphere(5, 3.0),
    primitives::welded_cube(2.0),
    primitives::cube(1.5),
  ];

  let mut parallel = inputs.clone();
  let mut batch = builder(1024);
  let batch_stats = batch.add_meshes(&mut parallel).unwrap();

  let mut sequential = inputs;
  let mut single = builder(1024);
  let single_stats: Vec<UnwrapStats> = sequential
    .iter_mut()
    .map(|mesh| single.add_mesh(mesh).unwrap())
    .collect();

  assert_eq!(batch_stats, single_stats);
  assert_eq!(parallel, sequential);
  assert_eq!(batch.swatches(), single.swatches());
}

#[test]
fn test_later_meshes_do_not_touch_earlier_uvs() {
  let mut first = primitives::cube(1.0);
  let mut builder = builder(256);
  builder.add_mesh(&mut first).unwrap();
  let resolved = first.uv2.clone();

  let mut second = primitives::cube(1.0);
  builder.add_mesh(&mut second).unwrap();

  assert_eq!(first.uv2, resolved);
  assert_ne!(second.uv2, resolved);
}

#[test]
fn test_batch_input_error_packs_nothing() {
  let mut meshes = vec![
    primitives::cube(1.0),
    Mesh::new(vec![Vec3::ZERO; 2], vec![Vec3::Z; 1], Vec::new()),
  ];
  let mut builder = builder(256);

  let err = builder.add_meshes(&mut meshes).unwrap_err();

  assert!(matches!(err, AtlasError::NormalCountMismatch { .. }));
  assert_eq!(builder.packer().image_count(), 0);
  assert!(meshes[0].uv2.is_empty());
}
