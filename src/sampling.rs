//! Height sources for cube maps.
//!
//! The generator asks a `HeightSource` for the raw height of each cell.
//! `NoiseHeight` samples coherent Perlin noise and is fully determined by the
//! configuration; `RandomHeight` draws uniform heights from an injected RNG
//! and is reproducible only when that RNG is seeded.

use noise::{NoiseFn, Perlin};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::LevelConfig;

/// Produces the raw (unsmoothed) height for a grid cell.
pub trait HeightSource {
    /// Height for cell `(x, z)`, in `[0, config.max_height]`.
    fn sample(&mut self, x: usize, z: usize, config: &LevelConfig) -> f32;

    /// Bring the source in line with `config` before sampling.
    fn prepare(&mut self, _config: &LevelConfig) {}
}

/// Coherent-noise heights: continuous in (x, z) and deterministic.
#[derive(Clone)]
pub struct NoiseHeight {
    perlin: Perlin,
    seed: u32,
}

impl NoiseHeight {
    pub fn new(seed: u32) -> Self {
        Self { perlin: Perlin::new(seed), seed }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Noise source using the configuration's permutation seed.
    pub fn for_config(config: &LevelConfig) -> Self {
        Self::new(config.noise_seed)
    }

    /// Sample the noise at a point in noise space, remapped to 0.0-1.0.
    pub fn sample_unit(&self, xs: f64, zs: f64) -> f64 {
        let value = self.perlin.get([xs, zs]);
        ((value + 1.0) * 0.5).clamp(0.0, 1.0)
    }

    /// Height for a cell. Requires `config.relief > 0`.
    pub fn height_at(&self, x: usize, z: usize, config: &LevelConfig) -> f32 {
        let relief = config.relief as f64;
        let xs = (x as f64 + config.seed_x as f64) / relief;
        let zs = (z as f64 + config.seed_z as f64) / relief;
        let height = self.sample_unit(xs, zs) as f32 * config.max_height;
        height.clamp(0.0, config.max_height)
    }
}

impl Default for NoiseHeight {
    fn default() -> Self {
        Self::new(Perlin::DEFAULT_SEED)
    }
}

impl HeightSource for NoiseHeight {
    fn sample(&mut self, x: usize, z: usize, config: &LevelConfig) -> f32 {
        self.height_at(x, z, config)
    }
}

/// Uniform random heights in `[0, max_height)`.
pub struct RandomHeight<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomHeight<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl RandomHeight<ChaCha8Rng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> HeightSource for RandomHeight<R> {
    fn sample(&mut self, _x: usize, _z: usize, config: &LevelConfig) -> f32 {
        if !(config.max_height > 0.0) {
            return 0.0;
        }
        self.rng.gen_range(0.0..config.max_height)
    }
}

/// Constant height for every cell, clamped to the configured range.
#[derive(Clone, Copy, Debug)]
pub struct FixedHeight(pub f32);

impl HeightSource for FixedHeight {
    fn sample(&mut self, _x: usize, _z: usize, config: &LevelConfig) -> f32 {
        self.0.clamp(0.0, config.max_height.max(0.0))
    }
}

/// The height source a configuration asks for.
///
/// Holds both a noise field and a random stream and follows the
/// `perlin_noise` flag and `noise_seed` of whichever configuration it is
/// prepared with, so an edited configuration switches sources.
pub struct HeightMode {
    noise: NoiseHeight,
    random: RandomHeight<ChaCha8Rng>,
    perlin: bool,
}

impl HeightMode {
    /// Source for `config`, drawing random heights from `rng`.
    pub fn new(config: &LevelConfig, rng: ChaCha8Rng) -> Self {
        Self {
            noise: NoiseHeight::for_config(config),
            random: RandomHeight::new(rng),
            perlin: config.perlin_noise,
        }
    }

    /// Noise when `perlin_noise` is set, otherwise uniform random heights
    /// seeded with `rng_seed`.
    pub fn for_config(config: &LevelConfig, rng_seed: u64) -> Self {
        Self::new(config, ChaCha8Rng::seed_from_u64(rng_seed))
    }

    pub fn is_deterministic(&self) -> bool {
        self.perlin
    }

    pub fn noise(&self) -> &NoiseHeight {
        &self.noise
    }
}

impl HeightSource for HeightMode {
    fn sample(&mut self, x: usize, z: usize, config: &LevelConfig) -> f32 {
        if self.perlin {
            self.noise.sample(x, z, config)
        } else {
            self.random.sample(x, z, config)
        }
    }

    fn prepare(&mut self, config: &LevelConfig) {
        self.perlin = config.perlin_noise;
        if self.noise.seed() != config.noise_seed {
            self.noise = NoiseHeight::for_config(config);
        }
    }
}
