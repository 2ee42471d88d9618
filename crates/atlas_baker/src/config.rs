//! Job file parsing for atlas baking.

use anyhow::{Context, Result};
use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use uv_atlas::AtlasConfig;

/// Root configuration of a bake job.
#[derive(Debug, Deserialize)]
pub struct Config {
	/// Output directory relative to the job file.
	#[serde(default = "default_output_dir")]
	pub output_dir: String,
	/// Atlas side length in pixels (square).
	#[serde(default = "default_atlas_size")]
	pub atlas_size: u32,
	/// Pixels per world unit.
	#[serde(default = "default_density")]
	pub density: f32,
	/// Pixels reserved on the left and bottom of every island.
	#[serde(default = "default_padding")]
	pub padding: u32,
	/// Seed for the debug swatch colours.
	#[serde(default)]
	pub seed: u64,
	/// Meshes packed into the atlas, in packing order.
	pub meshes: Vec<MeshConfig>,
}

/// One mesh of the job.
#[derive(Debug, Deserialize)]
pub struct MeshConfig {
	/// Output file stem, unique within the job.
	pub name: String,
	/// Generated mesh.
	pub primitive: Option<Primitive>,
	/// OBJ file relative to the job file.
	pub obj: Option<String>,
	#[serde(default)]
	pub translation: [f32; 3],
	/// Euler angles, applied X then Y then Z.
	#[serde(default)]
	pub rotation_degrees: [f32; 3],
	#[serde(default = "default_scale")]
	pub scale: [f32; 3],
}

/// Built-in mesh generators.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Primitive {
	Cube {
		#[serde(default = "default_size")]
		size: f32,
	},
	Sphere {
		#[serde(default = "default_segments")]
		segments: u32,
		#[serde(default = "default_size")]
		diameter: f32,
	},
	Plane {
		#[serde(default = "default_size")]
		size: f32,
	},
}

/// Where a mesh comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeshSource<'a> {
	Primitive(Primitive),
	Obj(&'a str),
}

fn default_output_dir() -> String {
	"out".to_string()
}

fn default_atlas_size() -> u32 {
	1024
}

fn default_density() -> f32 {
	7.0
}

fn default_padding() -> u32 {
	3
}

fn default_scale() -> [f32; 3] {
	[1.0; 3]
}

fn default_size() -> f32 {
	1.0
}

fn default_segments() -> u32 {
	16
}

impl Config {
	/// Load configuration from a TOML file.
	pub fn load(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path)
			.with_context(|| format!("Failed to read config file: {}", path.display()))?;
		Self::parse(&content)
	}

	/// Parse and validate a TOML job description.
	pub fn parse(content: &str) -> Result<Self> {
		let config: Config = toml::from_str(content).context("Failed to parse config TOML")?;

		if config.meshes.is_empty() {
			anyhow::bail!("Config must have at least one mesh");
		}
		if config.atlas_size == 0 || config.atlas_size > i32::MAX as u32 {
			anyhow::bail!("atlas_size must be positive, got {}", config.atlas_size);
		}
		if !config.density.is_finite() || config.density <= 0.0 {
			anyhow::bail!("density must be positive, got {}", config.density);
		}
		if config.padding >= config.atlas_size {
			anyhow::bail!(
				"padding {} does not leave room in a {} px atlas",
				config.padding,
				config.atlas_size
			);
		}

		let mut names = HashSet::new();
		for mesh in &config.meshes {
			if mesh.name.is_empty() || mesh.name.contains(['/', '\\']) || mesh.name.starts_with('.') {
				anyhow::bail!("Invalid mesh name '{}'", mesh.name);
			}
			if !names.insert(mesh.name.as_str()) {
				anyhow::bail!("Duplicate mesh name '{}'", mesh.name);
			}
			mesh.source()?;
		}

		Ok(config)
	}

	/// Pipeline settings for this job.
	pub fn atlas_config(&self) -> AtlasConfig {
		AtlasConfig::new()
			.with_extent(self.atlas_size)
			.with_density(self.density)
			.with_padding(self.padding)
			.with_swatch_seed(self.seed)
	}
}

impl MeshConfig {
	/// The single source of this mesh.
	pub fn source(&self) -> Result<MeshSource<'_>> {
		match (&self.primitive, &self.obj) {
			(Some(primitive), None) => Ok(MeshSource::Primitive(*primitive)),
			(None, Some(obj)) => Ok(MeshSource::Obj(obj)),
			(Some(_), Some(_)) => {
				anyhow::bail!("Mesh '{}' sets both primitive and obj", self.name)
			}
			(None, None) => anyhow::bail!("Mesh '{}' needs a primitive or an obj path", self.name),
		}
	}

	/// Local-to-world transform: scale, then rotation, then translation.
	pub fn transform(&self) -> Mat4 {
		let [rx, ry, rz] = self.rotation_degrees.map(f32::to_radians);
		Mat4::from_scale_rotation_translation(
			Vec3::from(self.scale),
			Quat::from_euler(EulerRot::XYZ, rx, ry, rz),
			Vec3::from(self.translation),
		)
	}
}

impl Primitive {
	pub fn build(self) -> uv_atlas::Mesh {
		match self {
			Primitive::Cube { size } => uv_atlas::primitives::cube(size),
			Primitive::Sphere { segments, diameter } => {
				uv_atlas::primitives::sphere(segments, diameter)
			}
			Primitive::Plane { size } => uv_atlas::primitives::plane(size),
		}
	}
}
