//! Wavefront OBJ import and export.
//!
//! Import reads positions, normals and faces (polygons are fan-triangulated);
//! texture coordinates and everything else are ignored. Missing normals are
//! rebuilt from area-weighted face normals.
//!
//! Export writes the atlas UVs as `vt`, one per vertex, so every face
//! corner is `v/vt/vn` with the same index.

use anyhow::{bail, Context, Result};
use glam::Vec3;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use uv_atlas::Mesh;

/// Read a mesh from an OBJ file.
pub fn load(path: &Path) -> Result<Mesh> {
	let content = std::fs::read_to_string(path)
		.with_context(|| format!("Failed to read OBJ file: {}", path.display()))?;
	import_obj(&content).with_context(|| format!("Failed to parse OBJ file: {}", path.display()))
}

/// Write a mesh and its atlas UVs to an OBJ file.
pub fn save(path: &Path, mesh: &Mesh, name: &str) -> Result<()> {
	let file =
		File::create(path).with_context(|| format!("Failed to create: {}", path.display()))?;
	let mut writer = BufWriter::new(file);
	write_obj(&mut writer, mesh, name)
		.and_then(|()| writer.flush())
		.with_context(|| format!("Failed to write: {}", path.display()))
}

/// Parse OBJ text into an indexed mesh.
pub fn import_obj(content: &str) -> Result<Mesh> {
	let mut positions: Vec<Vec3> = Vec::new();
	let mut normals: Vec<Vec3> = Vec::new();

	let mut mesh = Mesh::default();
	let mut has_normals = true;
	// (position, normal) pair -> mesh vertex
	let mut vertex_map: HashMap<(usize, Option<usize>), u32> = HashMap::new();

	for (number, line) in content.lines().enumerate() {
		let line = line.trim();
		if line.is_empty() || line.starts_with('#') {
			continue;
		}
		let mut parts = line.split_whitespace();
		let Some(keyword) = parts.next() else {
			continue;
		};
		let line_number = number + 1;

		match keyword {
			"v" => positions.push(parse_vec3(parts, line_number)?),
			"vn" => normals.push(parse_vec3(parts, line_number)?.normalize_or_zero()),
			"f" => {
				let mut corners = Vec::new();
				for part in parts {
					let (position, normal) = parse_corner(part, positions.len(), normals.len())
						.with_context(|| format!("line {line_number}: bad face corner '{part}'"))?;
					has_normals &= normal.is_some();

					let vertex = *vertex_map.entry((position, normal)).or_insert_with(|| {
						mesh.positions.push(positions[position]);
						mesh.normals.push(normal.map_or(Vec3::ZERO, |n| normals[n]));
						mesh.positions.len() as u32 - 1
					});
					corners.push(vertex);
				}
				if corners.len() < 3 {
					bail!("line {line_number}: face has fewer than 3 corners");
				}
				for i in 1..corners.len() - 1 {
					mesh
						.indices
						.extend_from_slice(&[corners[0], corners[i], corners[i + 1]]);
				}
			}
			// Ignore other commands (vt, mtllib, usemtl, g, o, s, etc.)
			_ => {}
		}
	}

	if !has_normals {
		compute_smooth_normals(&mut mesh);
	}
	mesh.validate()?;
	Ok(mesh)
}

fn parse_vec3<'a>(mut parts: impl Iterator<Item = &'a str>, line: usize) -> Result<Vec3> {
	let mut next = || -> Result<f32> {
		let value = parts
			.next()
			.with_context(|| format!("line {line}: expected three components"))?;
		value
			.parse::<f32>()
			.with_context(|| format!("line {line}: invalid number '{value}'"))
	};
	Ok(Vec3::new(next()?, next()?, next()?))
}

/// Resolve one `v`, `v/vt`, `v//vn` or `v/vt/vn` corner to zero-based
/// position and normal indices. Negative indices count from the end.
fn parse_corner(
	corner: &str,
	position_count: usize,
	normal_count: usize,
) -> Result<(usize, Option<usize>)> {
	let mut fields = corner.split('/');
	let position = match fields.next() {
		Some(field) => resolve_index(field, position_count)?,
		None => bail!("missing position index"),
	};
	let _texcoord = fields.next();
	let normal = match fields.next() {
		Some(field) if !field.is_empty() => Some(resolve_index(field, normal_count)?),
		_ => None,
	};
	Ok((position, normal))
}

fn resolve_index(field: &str, count: usize) -> Result<usize> {
	let index: i64 = field
		.parse()
		.with_context(|| format!("invalid index '{field}'"))?;
	let resolved = if index < 0 {
		count as i64 + index
	} else {
		index - 1
	};
	if resolved < 0 || resolved >= count as i64 {
		bail!("index {index} out of range (have {count})");
	}
	Ok(resolved as usize)
}

/// Replace the vertex normals with area-weighted averages of face normals.
fn compute_smooth_normals(mesh: &mut Mesh) {
	let mut accumulated = vec![Vec3::ZERO; mesh.vertex_count()];
	for t in 0..mesh.triangle_count() {
		let [p0, p1, p2] = mesh.triangle_positions(t);
		let weighted = (p1 - p0).cross(p2 - p0);
		for vertex in mesh.triangle(t) {
			accumulated[vertex as usize] += weighted;
		}
	}
	mesh.normals = accumulated.into_iter().map(Vec3::normalize_or_zero).collect();
}

/// Serialize a mesh with its atlas UVs.
fn write_obj(out: &mut impl Write, mesh: &Mesh, name: &str) -> std::io::Result<()> {
	let has_uvs = mesh.uv2.len() == mesh.vertex_count();

	writeln!(out, "# bake_atlas")?;
	writeln!(out, "o {name}")?;
	for p in &mesh.positions {
		writeln!(out, "v {} {} {}", p.x, p.y, p.z)?;
	}
	if has_uvs {
		for uv in &mesh.uv2 {
			writeln!(out, "vt {} {}", uv.x, uv.y)?;
		}
	}
	for n in &mesh.normals {
		writeln!(out, "vn {} {} {}", n.x, n.y, n.z)?;
	}

	for t in 0..mesh.triangle_count() {
		let [a, b, c] = mesh.triangle(t).map(|i| i + 1);
		if has_uvs {
			writeln!(out, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}")?;
		} else {
			writeln!(out, "f {a}//{a} {b}//{b} {c}//{c}")?;
		}
	}
	Ok(())
}
