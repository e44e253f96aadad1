//! Dense 2D grid storage and the generated height field.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::config::LevelConfig;

/// A width x depth grid stored x-major, so iteration visits
/// every z of column 0, then column 1, and so on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Grid<T> {
    pub width: usize,
    pub depth: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    pub fn new(width: usize, depth: usize) -> Self {
        Self {
            width,
            depth,
            data: vec![T::default(); width * depth],
        }
    }
}

impl<T: Clone> Grid<T> {
    pub fn new_with(width: usize, depth: usize, value: T) -> Self {
        Self {
            width,
            depth,
            data: vec![value; width * depth],
        }
    }
}

impl<T> Grid<T> {
    /// Build a grid from values already laid out x-major.
    /// Returns `None` if the length does not match the dimensions.
    pub fn from_vec(width: usize, depth: usize, data: Vec<T>) -> Option<Self> {
        if data.len() != width * depth {
            return None;
        }
        Some(Self { width, depth, data })
    }

    /// Build a grid whose length is known to match, e.g. from a generation pass.
    pub(crate) fn from_raw(width: usize, depth: usize, data: Vec<T>) -> Self {
        debug_assert_eq!(data.len(), width * depth);
        Self { width, depth, data }
    }

    fn index(&self, x: usize, z: usize) -> usize {
        debug_assert!(x < self.width && z < self.depth);
        x * self.depth + z
    }

    pub fn get(&self, x: usize, z: usize) -> &T {
        &self.data[self.index(x, z)]
    }

    pub fn get_mut(&mut self, x: usize, z: usize) -> &mut T {
        let idx = self.index(x, z);
        &mut self.data[idx]
    }

    pub fn set(&mut self, x: usize, z: usize, value: T) {
        let idx = self.index(x, z);
        self.data[idx] = value;
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate over all cells with their coordinates, x outer and z inner.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let depth = self.depth;
        self.data.iter().enumerate().map(move |(idx, val)| {
            (idx / depth, idx % depth, val)
        })
    }

    /// Iterate mutably over all cells with their coordinates.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, usize, &mut T)> {
        let depth = self.depth;
        self.data.iter_mut().enumerate().map(move |(idx, val)| {
            (idx / depth, idx % depth, val)
        })
    }

    /// Values in storage order.
    pub fn values(&self) -> &[T] {
        &self.data
    }
}

/// One generated grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub x: usize,
    pub z: usize,
    pub height: f32,
    pub color: Color,
}

/// Summary of the heights in a field.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HeightStats {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
    pub count: usize,
}

/// The result of one generation pass, with the configuration that produced it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeightField {
    pub config: LevelConfig,
    pub cells: Grid<Cell>,
}

impl HeightField {
    pub fn new(config: LevelConfig, cells: Grid<Cell>) -> Self {
        Self { config, cells }
    }

    pub fn width(&self) -> usize {
        self.cells.width
    }

    pub fn depth(&self) -> usize {
        self.cells.depth
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, x: usize, z: usize) -> &Cell {
        self.cells.get(x, z)
    }

    /// Cells in generation order (x outer, z inner).
    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values().iter()
    }

    /// Height of every cell as its own grid.
    pub fn heights(&self) -> Grid<f32> {
        let heights = self.iter().map(|c| c.height).collect();
        Grid { width: self.cells.width, depth: self.cells.depth, data: heights }
    }

    /// Check that the cells, their coordinates and the echoed configuration
    /// agree, e.g. after reading a field from disk.
    pub fn check_consistency(&self) -> Result<(), String> {
        let (width, depth) = (self.cells.width, self.cells.depth);
        if self.cells.data.len() != width * depth {
            return Err(format!(
                "grid holds {} cells but is {}x{}",
                self.cells.data.len(),
                width,
                depth
            ));
        }
        if self.config.width != width || self.config.depth != depth {
            return Err(format!(
                "config is {}x{} but grid is {}x{}",
                self.config.width, self.config.depth, width, depth
            ));
        }
        self.config.validate().map_err(|e| e.to_string())?;
        for (x, z, cell) in self.cells.iter() {
            if cell.x != x || cell.z != z {
                return Err(format!("cell ({}, {}) stored at ({}, {})", cell.x, cell.z, x, z));
            }
            if !cell.height.is_finite() {
                return Err(format!("cell ({}, {}) has height {}", x, z, cell.height));
            }
        }
        Ok(())
    }

    pub fn stats(&self) -> HeightStats {
        if self.is_empty() {
            return HeightStats::default();
        }

        let mut min = f32::MAX;
        let mut max = f32::MIN;
        let mut sum = 0.0f64;
        for cell in self.iter() {
            if cell.height < min { min = cell.height; }
            if cell.height > max { max = cell.height; }
            sum += cell.height as f64;
        }

        HeightStats {
            min,
            max,
            mean: (sum / self.len() as f64) as f32,
            count: self.len(),
        }
    }
}
