use std::path::PathBuf;
use std::process;

use clap::Parser;

use cube_terrain::config::{LevelConfig, LevelConfigBuilder};
use cube_terrain::prefab::MapPrefab;
use cube_terrain::storage::MapStore;
use cube_terrain::{ascii, export, generator, HeightField};

#[derive(Parser, Debug)]
#[command(name = "cube_terrain")]
#[command(about = "Generate cube terrain maps colored by height")]
struct Args {
    /// Number of cubes along x
    #[arg(short = 'W', long)]
    width: Option<usize>,

    /// Number of cubes along z
    #[arg(short = 'D', long)]
    depth: Option<usize>,

    /// Uniform cube scale
    #[arg(long)]
    map_size: Option<f32>,

    /// Noise-space offset along x
    #[arg(long, allow_hyphen_values = true)]
    seed_x: Option<f32>,

    /// Noise-space offset along z
    #[arg(long, allow_hyphen_values = true)]
    seed_z: Option<f32>,

    /// Noise frequency divisor (larger = smoother terrain)
    #[arg(short, long)]
    relief: Option<f32>,

    /// Maximum cube height
    #[arg(short = 'm', long)]
    max_height: Option<f32>,

    /// Use uniform random heights instead of Perlin noise
    #[arg(long)]
    random: bool,

    /// Keep continuous heights instead of rounding to whole units
    #[arg(long)]
    smooth: bool,

    /// Do not attach colliders to the cubes
    #[arg(long)]
    no_collider: bool,

    /// Noise permutation and RNG seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Compute columns on all cores
    #[arg(long)]
    parallel: bool,

    /// Read the level configuration from a JSON file (flags override it)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the effective configuration to a JSON file
    #[arg(long)]
    write_config: Option<PathBuf>,

    /// Directory for saved maps
    #[arg(long, default_value = "maps")]
    maps_dir: PathBuf,

    /// Save the generated map under this name
    #[arg(long)]
    save: Option<String>,

    /// Load a saved map instead of generating one
    #[arg(long)]
    load: Option<String>,

    /// List saved maps and exit
    #[arg(long)]
    list: bool,

    /// Export the color map to a PNG
    #[arg(long)]
    png: Option<String>,

    /// Export the grayscale height map to a PNG
    #[arg(long)]
    height_png: Option<String>,

    /// Pixels per cube in PNG exports
    #[arg(long, default_value = "4")]
    png_scale: u32,

    /// Export the cube instances as JSON
    #[arg(long)]
    prefab: Option<String>,

    /// Print an ASCII preview
    #[arg(long)]
    ascii: bool,
}

fn main() {
    let args = Args::parse();
    let store = MapStore::new(&args.maps_dir);

    if args.list {
        match store.list() {
            Ok(names) if names.is_empty() => println!("No saved maps in {}", args.maps_dir.display()),
            Ok(names) => {
                println!("Saved maps in {}:", args.maps_dir.display());
                for name in names {
                    println!("  {}", name);
                }
            }
            Err(e) => {
                eprintln!("Failed to list maps: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    let field = match args.load {
        Some(ref name) => {
            println!("Loading map '{}'...", name);
            match store.load(name) {
                Ok(stored) => {
                    println!("Loaded '{}' (saved {})", stored.name, stored.saved_at);
                    stored.field
                }
                Err(e) => {
                    eprintln!("Failed to load map: {}", e);
                    process::exit(1);
                }
            }
        }
        None => generate_from_args(&args),
    };

    let stats = field.stats();
    println!(
        "Height range: {:.2} to {:.2} (mean {:.2}, {} cubes)",
        stats.min, stats.max, stats.mean, stats.count
    );

    if args.ascii {
        print!("{}", ascii::render_ascii(&field));
    }

    if let Some(ref path) = args.png {
        match export::export_color_map(&field, path, args.png_scale) {
            Ok(()) => println!("Exported color map to: {}", path),
            Err(e) => eprintln!("Failed to export color map: {}", e),
        }
    }

    if let Some(ref path) = args.height_png {
        match export::export_height_map(&field, path, args.png_scale) {
            Ok(()) => println!("Exported height map to: {}", path),
            Err(e) => eprintln!("Failed to export height map: {}", e),
        }
    }

    if let Some(ref path) = args.prefab {
        let name = args.save.as_deref().or(args.load.as_deref()).unwrap_or("map");
        let prefab = MapPrefab::from_field(name, &field);
        let result = serde_json::to_string_pretty(&prefab)
            .map_err(|e| e.to_string())
            .and_then(|json| std::fs::write(path, json).map_err(|e| e.to_string()));
        match result {
            Ok(()) => println!(
                "Exported {} cubes ({} with colliders) to: {}",
                prefab.len(),
                prefab.collider_count(),
                path
            ),
            Err(e) => eprintln!("Failed to export cubes: {}", e),
        }
    }

    if let Some(ref name) = args.save {
        match store.save(name, &field) {
            Ok(path) => println!("Saved map to: {}", path.display()),
            Err(e) => {
                eprintln!("Failed to save map: {}", e);
                process::exit(1);
            }
        }
    }
}

fn generate_from_args(args: &Args) -> HeightField {
    let base = match args.config {
        Some(ref path) => match LevelConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to read config {}: {}", path.display(), e);
                process::exit(1);
            }
        },
        None => LevelConfig::default(),
    };

    let seed = args.seed.unwrap_or_else(|| rand::random());
    let config = match apply_overrides(LevelConfigBuilder::from_config(base), args, seed).build() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    if let Some(ref path) = args.write_config {
        match config.save(path) {
            Ok(()) => println!("Wrote config to: {}", path.display()),
            Err(e) => eprintln!("Failed to write config: {}", e),
        }
    }

    println!("Generating {}x{} cube map with seed: {}", config.width, config.depth, seed);
    println!(
        "Heights: {} (relief {}, max {}, {})",
        if config.perlin_noise { "perlin noise" } else { "random" },
        config.relief,
        config.max_height,
        if config.smoothness { "smooth" } else { "stepped" },
    );

    let result = if args.parallel {
        generator::generate_parallel(&config, seed)
    } else {
        generator::generate(&config, seed)
    };

    match result {
        Ok(field) => field,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}

fn apply_overrides(mut builder: LevelConfigBuilder, args: &Args, seed: u64) -> LevelConfigBuilder {
    if let Some(width) = args.width {
        builder = builder.width(width);
    }
    if let Some(depth) = args.depth {
        builder = builder.depth(depth);
    }
    if let Some(map_size) = args.map_size {
        builder = builder.map_size(map_size);
    }
    if let Some(relief) = args.relief {
        builder = builder.relief(relief);
    }
    if let Some(max_height) = args.max_height {
        builder = builder.max_height(max_height);
    }
    if args.seed_x.is_some() || args.seed_z.is_some() {
        let (seed_x, seed_z) = seed_offset_overrides(args, builder.current());
        builder = builder.seed_offset(seed_x, seed_z);
    }
    if args.seed.is_some() || args.config.is_none() {
        builder = builder.noise_seed(seed as u32);
    }
    if args.random {
        builder = builder.perlin_noise(false);
    }
    if args.smooth {
        builder = builder.smoothness(true);
    }
    if args.no_collider {
        builder = builder.need_collider(false);
    }
    builder
}

/// Noise offsets after applying whichever of `--seed-x`/`--seed-z` were given.
fn seed_offset_overrides(args: &Args, current: &LevelConfig) -> (f32, f32) {
    (
        args.seed_x.unwrap_or(current.seed_x),
        args.seed_z.unwrap_or(current.seed_z),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_offset_overrides_keep_unset_axis() {
        let args = Args::parse_from(["cube_terrain", "--seed-x", "-4.5", "--seed", "3"]);
        let base = LevelConfig::builder().seed_offset(1.0, 2.0).build().unwrap();
        let config = apply_overrides(LevelConfigBuilder::from_config(base), &args, 3)
            .build()
            .unwrap();
        assert_eq!((config.seed_x, config.seed_z), (-4.5, 2.0));
        assert_eq!(config.noise_seed, 3);
    }

    #[test]
    fn test_overrides_toggle_flags() {
        let args = Args::parse_from(["cube_terrain", "--random", "--smooth", "--no-collider", "-W", "7"]);
        let config = apply_overrides(LevelConfigBuilder::new(), &args, 0).build().unwrap();
        assert!(!config.perlin_noise);
        assert!(config.smoothness);
        assert!(!config.need_collider);
        assert_eq!(config.width, 7);
    }
}
