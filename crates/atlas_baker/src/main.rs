//! Lightmap atlas baker.
//!
//! Unwraps every mesh of a job file into one shared atlas and writes:
//! - atlas_debug.png: one solid colour per packed island, transparent elsewhere
//! - <name>.obj: the unwrapped mesh in world space, atlas UVs as `vt`

mod config;
mod obj;
mod raster;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use config::{Config, MeshConfig, MeshSource};
use uv_atlas::{AtlasBuilder, AtlasError, Mesh, UnwrapStats};

/// Lightmap atlas baker.
#[derive(Parser, Debug)]
#[command(name = "bake_atlas")]
#[command(about = "Unwraps meshes into a shared lightmap atlas")]
struct Args {
	/// Path to the job TOML file.
	#[arg(short, long)]
	config: PathBuf,

	/// Output directory (default: `output_dir` from the job, relative to it).
	#[arg(short, long)]
	output_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
	let args = Args::parse();
	let baked = run(&args.config, args.output_dir)?;

	let warnings: usize = baked.stats.iter().map(|stats| stats.warnings).sum();
	if warnings > 0 {
		println!("\nWarning: {warnings} structural warnings while unwrapping");
	}
	println!("\nDone! Output written to: {}", baked.output_dir.display());
	Ok(())
}

/// Outcome of one bake.
#[derive(Debug)]
struct Baked {
	output_dir: PathBuf,
	stats: Vec<UnwrapStats>,
}

fn run(config_path: &Path, output_dir: Option<PathBuf>) -> Result<Baked> {
	let job_dir = config_path.parent().unwrap_or(Path::new(".")).to_path_buf();

	println!("Loading config from: {}", config_path.display());
	let config = Config::load(config_path)?;
	let output_dir = output_dir.unwrap_or_else(|| job_dir.join(&config.output_dir));

	if !config.atlas_size.is_power_of_two() {
		println!("Warning: atlas_size {} is not a power of 2", config.atlas_size);
	}
	println!(
		"Unwrapping {} meshes into a {}x{} atlas ({} px/unit, {} px padding)",
		config.meshes.len(),
		config.atlas_size,
		config.atlas_size,
		config.density,
		config.padding
	);

	let mut meshes = Vec::with_capacity(config.meshes.len());
	for mesh_config in &config.meshes {
		let mesh = load_mesh(mesh_config, &job_dir)
			.with_context(|| format!("Loading mesh '{}'", mesh_config.name))?;
		meshes.push(mesh);
	}

	let mut builder = AtlasBuilder::new(config.atlas_config()).context("Invalid atlas settings")?;
	let stats = builder
		.add_meshes(&mut meshes)
		.map_err(|err| describe_failure(err, &config))?;

	for (mesh_config, stats) in config.meshes.iter().zip(&stats) {
		println!(
			"  {}: {} tris, {} islands, {} -> {} verts ({} seam), {} warnings",
			mesh_config.name,
			stats.triangles,
			stats.islands,
			stats.vertices_before,
			stats.vertices_after,
			stats.duplicated_vertices,
			stats.warnings
		);
	}
	println!(
		"Packed {} islands, {:.1}% of the atlas in use",
		builder.packer().image_count(),
		builder.packer().occupancy() * 100.0
	);

	std::fs::create_dir_all(&output_dir)
		.with_context(|| format!("Failed to create output dir: {}", output_dir.display()))?;

	let atlas = raster::paint_swatches(&builder.swatches(), config.atlas_size);
	raster::save_png(&atlas, &output_dir.join("atlas_debug.png"))?;
	println!("  ✓ atlas_debug.png");

	for (mesh_config, mesh) in config.meshes.iter().zip(&meshes) {
		let file = format!("{}.obj", mesh_config.name);
		obj::save(&output_dir.join(&file), mesh, &mesh_config.name)?;
		println!("  ✓ {file}");
	}

	Ok(Baked { output_dir, stats })
}

/// Build or load a mesh and move it into world space.
fn load_mesh(mesh_config: &MeshConfig, job_dir: &Path) -> Result<Mesh> {
	let mut mesh = match mesh_config.source()? {
		MeshSource::Primitive(primitive) => primitive.build(),
		MeshSource::Obj(path) => obj::load(&job_dir.join(path))?,
	};
	mesh.apply_transform(&mesh_config.transform());
	Ok(mesh)
}

/// Attach the mesh name and a hint to capacity failures.
fn describe_failure(err: AtlasError, config: &Config) -> anyhow::Error {
	if let AtlasError::AtlasFull { owner, .. } = &err {
		let name = config
			.meshes
			.get(*owner)
			.map_or("?", |mesh| mesh.name.as_str());
		let hint = format!("Mesh '{name}' does not fit; raise atlas_size or lower density");
		return anyhow::Error::new(err).context(hint);
	}
	anyhow::Error::new(err).context("Unwrapping failed")
}
