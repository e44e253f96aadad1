//! Debug tool for comparing relief values visually
//! Renders the same noise field at several relief settings side by side

use cube_terrain::config::LevelConfig;
use cube_terrain::export::{combine_horizontal, render_color_map};
use cube_terrain::generator::generate_parallel;

const WIDTH: usize = 96;
const DEPTH: usize = 96;
const SEED: u64 = 42;
const PIXELS_PER_CUBE: u32 = 3;

fn main() {
    println!("Generating relief comparison strip...");

    let variants: [(&str, f32, bool); 6] = [
        ("1. Relief 4 stepped", 4.0, false),
        ("2. Relief 8 stepped", 8.0, false),
        ("3. Relief 15 stepped", 15.0, false),
        ("4. Relief 15 smooth", 15.0, true),
        ("5. Relief 30 smooth", 30.0, true),
        ("6. Relief 60 smooth", 60.0, true),
    ];

    let mut images = Vec::with_capacity(variants.len());
    for (name, relief, smooth) in variants {
        println!("  Processing: {}", name);
        let config = match LevelConfig::builder()
            .width(WIDTH)
            .depth(DEPTH)
            .relief(relief)
            .max_height(10.0)
            .smoothness(smooth)
            .noise_seed(SEED as u32)
            .build()
        {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Skipping {}: {}", name, e);
                continue;
            }
        };

        match generate_parallel(&config, SEED) {
            Ok(field) => {
                let stats = field.stats();
                println!("    height {:.2} to {:.2}, mean {:.2}", stats.min, stats.max, stats.mean);
                match render_color_map(&field, PIXELS_PER_CUBE) {
                    Ok(img) => images.push(img),
                    Err(e) => eprintln!("Skipping {}: {}", name, e),
                }
            }
            Err(e) => eprintln!("Skipping {}: {}", name, e),
        }
    }

    let strip = combine_horizontal(&images, 4);
    match strip.save("relief_comparison.png") {
        Ok(()) => println!("Saved relief_comparison.png ({}x{})", strip.width(), strip.height()),
        Err(e) => eprintln!("Failed to save comparison: {}", e),
    }
}
