use noise::{NoiseFn, Perlin};

use crate::config::WorldConfig;

use super::HeightField;

pub struct PerlinHeightField {
    perlin: Perlin,
    base_height: i32,
    amplitude: f64,
    scale: f64,
}

impl PerlinHeightField {
    pub fn new(config: &WorldConfig) -> PerlinHeightField {
        Self {
            perlin: Perlin::new(config.seed),
            base_height: config.base_height,
            amplitude: config.height_amplitude,
            scale: config.noise_scale,
        }
    }
}

impl HeightField for PerlinHeightField {
    fn height(&self, world_x: i32, world_z: i32) -> i32 {
        let fx = world_x as f64 * self.scale;
        let fz = world_z as f64 * self.scale;
        // [-1; 1]
        let noise_val = self.perlin.get([fx, fz]);
        self.base_height + (noise_val * self.amplitude).floor() as i32
    }
}
