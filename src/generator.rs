//! Cube map height field generation.
//!
//! Every cell is computed independently from its coordinate and the
//! configuration:
//! 1. Raw height from the height source (noise or random)
//! 2. Optional rounding to whole units
//! 3. Color from the low/high ramp by height / max height
//!
//! Cells are produced x outer, z inner.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::color::Color;
use crate::config::{ConfigError, LevelConfig};
use crate::grid::{Cell, Grid, HeightField};
use crate::sampling::{HeightMode, HeightSource};

/// Round to the nearest whole unit unless smoothness is enabled.
/// Ties round away from zero.
pub fn apply_smoothing(height: f32, config: &LevelConfig) -> f32 {
    if config.smoothness {
        height
    } else {
        height.round()
    }
}

/// Color for a height: `low + (high - low) * clamp(height / max_height, 0, 1)`.
/// A max height that is not positive (or NaN) gives the low color.
pub fn compute_color(height: f32, config: &LevelConfig) -> Color {
    if !(config.max_height > 0.0) {
        return config.colors.low;
    }
    let ratio = (height / config.max_height).clamp(0.0, 1.0);
    config.colors.sample(ratio)
}

/// Highest height a cell may end up with. Stepped heights stop at the
/// largest whole unit not above `max_height` so they stay integral.
fn height_ceiling(config: &LevelConfig) -> f32 {
    let ceiling = if config.smoothness {
        config.max_height
    } else {
        config.max_height.floor()
    };
    ceiling.max(0.0)
}

/// Height, smoothing and color for one cell.
pub fn compute_cell<S: HeightSource + ?Sized>(
    source: &mut S,
    x: usize,
    z: usize,
    config: &LevelConfig,
) -> Cell {
    let raw = source.sample(x, z, config);
    let height = apply_smoothing(raw, config).clamp(0.0, height_ceiling(config));
    Cell {
        x,
        z,
        height,
        color: compute_color(height, config),
    }
}

/// Generates cube map height fields from a height source.
pub struct HeightFieldGenerator<S: HeightSource> {
    source: S,
}

impl HeightFieldGenerator<HeightMode> {
    /// Generator using the source the configuration selects.
    /// `rng_seed` only matters for the random-height path.
    pub fn for_config(config: &LevelConfig, rng_seed: u64) -> Self {
        Self::new(HeightMode::for_config(config, rng_seed))
    }
}

impl<S: HeightSource> HeightFieldGenerator<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Raw height for a cell, before smoothing.
    ///
    /// Requires `config.relief > 0` and `config.max_height > 0`; `generate`
    /// and `reapply` check this, this call does not.
    pub fn compute_height(&mut self, x: usize, z: usize, config: &LevelConfig) -> f32 {
        self.source.prepare(config);
        self.source.sample(x, z, config)
    }

    /// Lazily produce every cell of the grid.
    pub fn generate_iter<'a>(
        &'a mut self,
        config: &'a LevelConfig,
    ) -> Result<impl Iterator<Item = Cell> + 'a, ConfigError> {
        config.validate()?;
        self.source.prepare(config);
        let depth = config.depth;
        let coords = (0..config.width).flat_map(move |x| (0..depth).map(move |z| (x, z)));
        Ok(coords.map(move |(x, z)| compute_cell(&mut self.source, x, z, config)))
    }

    /// Generate the whole grid.
    pub fn generate(&mut self, config: &LevelConfig) -> Result<HeightField, ConfigError> {
        let cells: Vec<Cell> = self.generate_iter(config)?.collect();
        Ok(HeightField::new(
            config.clone(),
            Grid::from_raw(config.width, config.depth, cells),
        ))
    }

    /// Recompute every cell of an existing field under a new configuration.
    ///
    /// Cells keep their coordinates; the field's dimensions are not changed
    /// even if the new configuration names different ones.
    pub fn reapply(&mut self, field: &mut HeightField, config: &LevelConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.source.prepare(config);
        for (_, _, cell) in field.cells.iter_mut() {
            *cell = compute_cell(&mut self.source, cell.x, cell.z, config);
        }
        let (width, depth) = (field.width(), field.depth());
        field.config = LevelConfig { width, depth, ..config.clone() };
        Ok(())
    }
}

/// Generate a field with the source the configuration selects.
pub fn generate(config: &LevelConfig, rng_seed: u64) -> Result<HeightField, ConfigError> {
    HeightFieldGenerator::for_config(config, rng_seed).generate(config)
}

/// Generate a field with columns computed in parallel.
///
/// The noise path gives the same result as `generate`. The random path
/// gives each column its own ChaCha stream `x` under `rng_seed`, so it is
/// reproducible for a given seed but differs from the sequential random path.
pub fn generate_parallel(config: &LevelConfig, rng_seed: u64) -> Result<HeightField, ConfigError> {
    config.validate()?;

    let columns: Vec<Vec<Cell>> = (0..config.width)
        .into_par_iter()
        .map(|x| {
            let mut rng = ChaCha8Rng::seed_from_u64(rng_seed);
            rng.set_stream(x as u64);
            let mut source = HeightMode::new(config, rng);
            (0..config.depth)
                .map(|z| compute_cell(&mut source, x, z, config))
                .collect()
        })
        .collect();

    let cells: Vec<Cell> = columns.into_iter().flatten().collect();
    Ok(HeightField::new(
        config.clone(),
        Grid::from_raw(config.width, config.depth, cells),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorRamp;
    use crate::sampling::FixedHeight;

    fn noise_config() -> LevelConfig {
        LevelConfig::builder()
            .width(24)
            .depth(18)
            .relief(6.0)
            .max_height(20.0)
            .seed_offset(101.5, 37.25)
            .build()
            .unwrap()
    }

    #[test]
    fn test_smoothing_rounds_when_disabled() {
        let config = LevelConfig::builder().smoothness(false).build().unwrap();
        assert_eq!(apply_smoothing(3.4, &config), 3.0);
        assert_eq!(apply_smoothing(3.6, &config), 4.0);
        // Ties round away from zero
        assert_eq!(apply_smoothing(2.5, &config), 3.0);
        assert_eq!(apply_smoothing(0.5, &config), 1.0);
    }

    #[test]
    fn test_smoothing_keeps_height_when_enabled() {
        let config = LevelConfig::builder().smoothness(true).build().unwrap();
        assert_eq!(apply_smoothing(3.4, &config), 3.4);
    }

    #[test]
    fn test_smoothed_heights_are_integral() {
        let config = noise_config();
        let field = generate(&config, 0).unwrap();
        for cell in field.iter() {
            assert_eq!(cell.height, cell.height.round());
        }
    }

    #[test]
    fn test_color_endpoints_and_midpoint() {
        let config = noise_config();
        let ramp = ColorRamp::default();
        assert_eq!(compute_color(0.0, &config), ramp.low);
        assert_eq!(compute_color(config.max_height, &config), ramp.high);
        assert_eq!(compute_color(config.max_height / 2.0, &config), Color::rgb(0.5, 0.5, 0.0));
    }

    #[test]
    fn test_color_clamps_out_of_range_heights() {
        let config = noise_config();
        assert_eq!(compute_color(-5.0, &config), Color::RED);
        assert_eq!(compute_color(config.max_height * 3.0, &config), Color::GREEN);
    }

    #[test]
    fn test_color_uses_configured_ramp() {
        let config = LevelConfig::builder()
            .colors(ColorRamp::new(Color::BLUE, Color::WHITE))
            .build()
            .unwrap();
        assert_eq!(compute_color(0.0, &config), Color::BLUE);
        assert_eq!(compute_color(config.max_height, &config), Color::WHITE);
    }

    #[test]
    fn test_heights_within_bounds() {
        let mut config = noise_config();
        config.smoothness = true;
        for cell in generate(&config, 0).unwrap().iter() {
            assert!(cell.height >= 0.0 && cell.height <= config.max_height);
        }

        config.perlin_noise = false;
        config.smoothness = false;
        for cell in generate(&config, 99).unwrap().iter() {
            assert!(cell.height >= 0.0 && cell.height <= config.max_height);
        }
    }

    #[test]
    fn test_compute_height_is_deterministic() {
        let config = noise_config();
        let mut generator = HeightFieldGenerator::for_config(&config, 0);
        for (x, z) in [(0, 0), (5, 9), (23, 17)] {
            let a = generator.compute_height(x, z, &config);
            let b = generator.compute_height(x, z, &config);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_generation_is_idempotent() {
        let config = noise_config();
        let first = generate(&config, 1).unwrap();
        let second = generate(&config, 2).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_coordinate_coverage_and_order() {
        let config = LevelConfig::builder().width(3).depth(2).build().unwrap();
        let field = generate(&config, 0).unwrap();
        let coords: Vec<(usize, usize)> = field.iter().map(|c| (c.x, c.z)).collect();
        assert_eq!(coords, vec![(0, 0), (0, 1), (1, 0), (1, 1), (2, 0), (2, 1)]);
    }

    #[test]
    fn test_fixed_height_example() {
        let config = LevelConfig::builder()
            .width(2)
            .depth(2)
            .perlin_noise(false)
            .max_height(10.0)
            .smoothness(false)
            .build()
            .unwrap();
        let mut generator = HeightFieldGenerator::new(FixedHeight(5.0));
        let field = generator.generate(&config).unwrap();

        assert_eq!(field.len(), 4);
        for cell in field.iter() {
            assert_eq!(cell.height, 5.0);
            assert_eq!(cell.color, Color::rgb(0.5, 0.5, 0.0));
        }
    }

    #[test]
    fn test_empty_dimensions_produce_no_cells() {
        let config = LevelConfig::builder().width(0).depth(8).build().unwrap();
        assert!(generate(&config, 0).unwrap().is_empty());

        let config = LevelConfig::builder().width(8).depth(0).build().unwrap();
        assert!(generate_parallel(&config, 0).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_config_rejected_at_generation() {
        let mut config = noise_config();
        config.relief = 0.0;
        assert!(matches!(generate(&config, 0), Err(ConfigError::InvalidRelief(_))));

        let mut config = noise_config();
        config.max_height = 0.0;
        assert!(matches!(generate_parallel(&config, 0), Err(ConfigError::InvalidMaxHeight(_))));
    }

    #[test]
    fn test_lazy_iterator_matches_eager() {
        let config = noise_config();
        let mut generator = HeightFieldGenerator::for_config(&config, 0);
        let lazy: Vec<Cell> = generator.generate_iter(&config).unwrap().take(5).collect();
        let eager = generate(&config, 0).unwrap();
        assert_eq!(lazy.as_slice(), &eager.cells.values()[..5]);
    }

    #[test]
    fn test_parallel_matches_sequential_for_noise() {
        let mut config = noise_config();
        config.smoothness = true;
        assert_eq!(generate(&config, 0).unwrap(), generate_parallel(&config, 0).unwrap());
    }

    #[test]
    fn test_parallel_random_is_reproducible() {
        let mut config = noise_config();
        config.perlin_noise = false;
        let a = generate_parallel(&config, 77).unwrap();
        let b = generate_parallel(&config, 77).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_sequential_random_is_reproducible_with_seed() {
        let mut config = noise_config();
        config.perlin_noise = false;
        config.smoothness = true;
        let a = generate(&config, 5).unwrap();
        let b = generate(&config, 5).unwrap();
        let c = generate(&config, 6).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_reapply_recomputes_cells() {
        let config = noise_config();
        let mut field = generate(&config, 0).unwrap();

        let mut taller = config.clone();
        taller.max_height = 40.0;
        taller.smoothness = true;
        taller.width = 100;

        let mut generator = HeightFieldGenerator::for_config(&taller, 0);
        generator.reapply(&mut field, &taller).unwrap();

        let expected = generate(&LevelConfig { width: config.width, ..taller.clone() }, 0).unwrap();
        assert_eq!(field, expected);
        assert_eq!(field.config.width, config.width);
        assert_eq!(field.config.max_height, 40.0);
    }

    #[test]
    fn test_reapply_rejects_invalid_config() {
        let config = noise_config();
        let mut field = generate(&config, 0).unwrap();
        let before = field.clone();

        let mut bad = config.clone();
        bad.relief = -1.0;
        let mut generator = HeightFieldGenerator::for_config(&config, 0);
        assert!(generator.reapply(&mut field, &bad).is_err());
        assert_eq!(field, before);
    }

    #[test]
    fn test_reapply_follows_height_source_flag() {
        let config = noise_config();
        let mut field = generate(&config, 0).unwrap();
        let noise_heights = field.heights();

        let mut random = config.clone();
        random.perlin_noise = false;
        random.smoothness = true;

        let mut generator = HeightFieldGenerator::for_config(&config, 3);
        generator.reapply(&mut field, &random).unwrap();

        assert!(!field.config.perlin_noise);
        assert_ne!(field.heights(), noise_heights);
        assert_eq!(field, generate(&random, 3).unwrap());

        generator.reapply(&mut field, &config).unwrap();
        assert_eq!(field, generate(&config, 0).unwrap());
    }

    #[test]
    fn test_compute_height_follows_config() {
        let config = noise_config();
        let mut random = config.clone();
        random.perlin_noise = false;

        let mut generator = HeightFieldGenerator::for_config(&config, 11);
        let a = generator.compute_height(1, 1, &random);
        let b = generator.compute_height(1, 1, &random);
        assert_ne!(a, b);

        let mut reseeded = config.clone();
        reseeded.noise_seed = 1234;
        let expected = HeightFieldGenerator::for_config(&reseeded, 0).compute_height(4, 7, &reseeded);
        assert_eq!(generator.compute_height(4, 7, &reseeded), expected);
    }

    #[test]
    fn test_stepped_heights_integral_with_fractional_max() {
        let config = LevelConfig::builder()
            .width(2)
            .depth(2)
            .max_height(2.6)
            .smoothness(false)
            .build()
            .unwrap();
        let field = HeightFieldGenerator::new(FixedHeight(2.55)).generate(&config).unwrap();
        for cell in field.iter() {
            assert_eq!(cell.height, 2.0);
            assert!(cell.height <= config.max_height);
        }

        let mut smooth = config.clone();
        smooth.smoothness = true;
        let field = HeightFieldGenerator::new(FixedHeight(2.55)).generate(&smooth).unwrap();
        assert_eq!(field.get(0, 0).height, 2.55);
    }

    #[test]
    fn test_color_with_nan_max_height_is_low() {
        let mut config = noise_config();
        config.max_height = f32::NAN;
        assert_eq!(compute_color(3.0, &config), config.colors.low);
    }

    #[test]
    fn test_parallel_random_columns_differ_across_seeds() {
        let mut config = noise_config();
        config.perlin_noise = false;
        config.smoothness = true;
        let five = generate_parallel(&config, 5).unwrap();
        let six = generate_parallel(&config, 6).unwrap();

        let column = |field: &HeightField, x: usize| -> Vec<f32> {
            (0..config.depth).map(|z| field.get(x, z).height).collect()
        };
        assert_ne!(column(&five, 1), column(&six, 0));
        assert_ne!(column(&five, 0), column(&five, 1));
    }
}
