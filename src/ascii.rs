//! ASCII preview of a height field.
//!
//! One character per cell, one line per z row, darker glyphs for lower cells.

use std::fs::File;
use std::io::{self, Write};

use chrono::Local;

use crate::grid::HeightField;

const HEIGHT_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Glyph for a relative height in 0.0-1.0.
pub fn height_char(ratio: f32) -> char {
    let ratio = ratio.clamp(0.0, 1.0);
    let idx = (ratio * (HEIGHT_RAMP.len() - 1) as f32).round() as usize;
    HEIGHT_RAMP[idx.min(HEIGHT_RAMP.len() - 1)]
}

/// Render the field as text, `depth` lines of `width` glyphs.
pub fn render_ascii(field: &HeightField) -> String {
    let max_height = field.config.max_height;
    let mut out = String::with_capacity((field.width() + 1) * field.depth());

    for z in 0..field.depth() {
        for x in 0..field.width() {
            let height = field.get(x, z).height;
            let ratio = if max_height > 0.0 { height / max_height } else { 0.0 };
            out.push(height_char(ratio));
        }
        out.push('\n');
    }
    out
}

/// Write the ASCII preview to a file with a short header.
pub fn export_ascii(field: &HeightField, path: &str) -> io::Result<()> {
    let mut file = File::create(path)?;
    let stats = field.stats();

    writeln!(file, "Cube map {}x{}", field.width(), field.depth())?;
    writeln!(file, "Generated: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(file, "Height range: {:.2} to {:.2} (max {:.2})", stats.min, stats.max, field.config.max_height)?;
    writeln!(file)?;
    file.write_all(render_ascii(field).as_bytes())?;
    Ok(())
}
