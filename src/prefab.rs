//! Presentation of a height field as a set of cube instances.
//!
//! Generation only produces heights and colors. Turning those into placed,
//! scaled, colored cubes (and deciding whether each carries a collider)
//! happens here, from the configuration echoed in the field.

use serde::{Deserialize, Serialize};

use crate::grid::HeightField;

/// One renderable cube.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CubeInstance {
    /// World-space center `(x, height, z) * map_size`
    pub position: [f32; 3],
    /// Uniform edge length
    pub scale: f32,
    pub color: [u8; 3],
    pub collider: bool,
}

/// A named group of cubes ready to hand to a renderer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapPrefab {
    pub name: String,
    pub map_size: f32,
    pub need_collider: bool,
    pub cubes: Vec<CubeInstance>,
}

impl MapPrefab {
    pub fn from_field(name: &str, field: &HeightField) -> Self {
        let map_size = field.config.map_size;
        let need_collider = field.config.need_collider;

        let cubes = field
            .iter()
            .map(|cell| CubeInstance {
                position: [
                    cell.x as f32 * map_size,
                    cell.height * map_size,
                    cell.z as f32 * map_size,
                ],
                scale: map_size,
                color: cell.color.to_rgb8(),
                collider: need_collider,
            })
            .collect();

        Self {
            name: name.to_string(),
            map_size,
            need_collider,
            cubes,
        }
    }

    pub fn len(&self) -> usize {
        self.cubes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cubes.is_empty()
    }

    /// Number of cubes that carry a collider.
    pub fn collider_count(&self) -> usize {
        self.cubes.iter().filter(|c| c.collider).count()
    }

    /// Axis-aligned bounds `(min, max)` of the cube centers, or `None` if empty.
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let first = self.cubes.first()?;
        let mut min = first.position;
        let mut max = first.position;
        for cube in &self.cubes[1..] {
            for axis in 0..3 {
                min[axis] = min[axis].min(cube.position[axis]);
                max[axis] = max[axis].max(cube.position[axis]);
            }
        }
        Some((min, max))
    }
}
