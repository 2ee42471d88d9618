//! Primitive mesh generators.
//!
//! All primitives are centered on the origin and wound counter-clockwise, so
//! the cross-product normal of every triangle points outward.

use std::f32::consts::PI;

use glam::Vec3;

use crate::mesh::Mesh;

/// Face normal with its in-plane axes, `u x v == normal`.
const CUBE_FACES: [(Vec3, Vec3, Vec3); 6] = [
  (Vec3::X, Vec3::Y, Vec3::Z),
  (Vec3::NEG_X, Vec3::Z, Vec3::Y),
  (Vec3::Y, Vec3::Z, Vec3::X),
  (Vec3::NEG_Y, Vec3::X, Vec3::Z),
  (Vec3::Z, Vec3::X, Vec3::Y),
  (Vec3::NEG_Z, Vec3::Y, Vec3::X),
];

/// Append a quad `center -u -v .. center -u +v` as two triangles.
fn push_quad(mesh: &mut Mesh, center: Vec3, u: Vec3, v: Vec3, normal: Vec3) {
  let base = mesh.positions.len() as u32;
  for corner in [center - u - v, center + u - v, center + u + v, center - u + v] {
    mesh.positions.push(corner);
    mesh.normals.push(normal);
  }
  mesh
    .indices
    .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
}

/// Axis-aligned cube with split corners: 24 vertices, 12 triangles.
///
/// Faces are emitted in +X, -X, +Y, -Y, +Z, -Z order.
pub fn cube(size: f32) -> Mesh {
  let half = size * 0.5;
  let mut mesh = Mesh::default();
  for (normal, u, v) in CUBE_FACES {
    push_quad(&mut mesh, normal * half, u * half, v * half, normal);
  }
  mesh
}

/// Cube sharing its 8 corners between faces, so every corner sits on a seam.
///
/// Corner `i` has coordinates `(i & 1, i >> 1 & 1, i >> 2 & 1)` mapped to
/// `±size/2`; normals point along the corner diagonal.
pub fn welded_cube(size: f32) -> Mesh {
  let half = size * 0.5;
  let mut positions = Vec::with_capacity(8);
  let mut normals = Vec::with_capacity(8);
  for i in 0..8u32 {
    let corner = Vec3::new(
      if i & 1 != 0 { 1.0 } else { -1.0 },
      if i & 2 != 0 { 1.0 } else { -1.0 },
      if i & 4 != 0 { 1.0 } else { -1.0 },
    );
    positions.push(corner * half);
    normals.push(corner.normalize());
  }

  #[rustfmt::skip]
  let indices = vec![
    1, 3, 7,  1, 7, 5, // +X
    0, 4, 6,  0, 6, 2, // -X
    2, 6, 7,  2, 7, 3, // +Y
    0, 1, 5,  0, 5, 4, // -Y
    4, 5, 7,  4, 7, 6, // +Z
    0, 2, 3,  0, 3, 1, // -Z
  ];

  Mesh::new(positions, normals, indices)
}

/// Latitude/longitude sphere.
///
/// `segments` rings (at least 2) and twice as many slices. The seam column
/// and the poles are emitted once per slice, and the degenerate pole
/// triangles are skipped.
pub fn sphere(segments: u32, diameter: f32) -> Mesh {
  let radius = diameter * 0.5;
  let rings = segments.max(2);
  let slices = rings * 2;
  let stride = slices + 1;

  let mut mesh = Mesh::default();
  for ring in 0..=rings {
    let theta = PI * ring as f32 / rings as f32;
    let (sin_theta, cos_theta) = theta.sin_cos();
    for slice in 0..=slices {
      let phi = 2.0 * PI * slice as f32 / slices as f32;
      let (sin_phi, cos_phi) = phi.sin_cos();
      let normal = Vec3::new(sin_theta * cos_phi, cos_theta, sin_theta * sin_phi);
      mesh.positions.push(normal * radius);
      mesh.normals.push(normal);
    }
  }

  for ring in 0..rings {
    for slice in 0..slices {
      let a = ring * stride + slice;
      let b = a + stride;
      let c = b + 1;
      let d = a + 1;
      if ring != 0 {
        mesh.indices.extend_from_slice(&[a, d, b]);
      }
      if ring != rings - 1 {
        mesh.indices.extend_from_slice(&[d, c, b]);
      }
    }
  }
  mesh
}

/// Square in the XZ plane facing +Y.
pub fn plane(size: f32) -> Mesh {
  let half = size * 0.5;
  let mut mesh = Mesh::default();
  push_quad(&mut mesh, Vec3::ZERO, Vec3::Z * half, Vec3::X * half, Vec3::Y);
  mesh
}
