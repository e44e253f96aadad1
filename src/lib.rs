//! Cube map generation library
//!
//! Re-exports modules for use by binaries and tools.

pub mod ascii;
pub mod color;
pub mod config;
pub mod export;
pub mod generator;
pub mod grid;
pub mod prefab;
pub mod sampling;
pub mod storage;

pub use color::{Color, ColorRamp};
pub use config::{ConfigError, LevelConfig};
pub use generator::{generate, generate_parallel, HeightFieldGenerator};
pub use grid::{Cell, HeightField};
