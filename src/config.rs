use std::{error::Error, fs, path::Path};

use log::info;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// Terrain noise seed
    pub seed: u32,
    /// Surface height the terrain noise oscillates around
    pub base_height: i32,
    pub height_amplitude: f64,
    pub noise_scale: f64,
    /// Minimum number of ticks between two strength changes of a liquid cell
    pub liquid_tick_delay: u64,
    /// Upper bound of AABBs a single region query returns
    pub region_query_capacity: usize,
    pub update_queue_capacity: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 99,
            base_height: 64,
            height_amplitude: 12.0,
            noise_scale: 0.03,
            liquid_tick_delay: 5,
            region_query_capacity: 4096,
            update_queue_capacity: 65_536,
        }
    }
}

impl WorldConfig {
    /// Reads a JSON config. Missing fields fall back to their defaults.
    pub fn load(path: &Path) -> Result<WorldConfig, Box<dyn Error>> {
        let content = fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        info!("Loaded world config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::WorldConfig;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: WorldConfig =
            serde_json::from_str(r#"{ "seed": 7, "liquid_tick_delay": 2 }"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.liquid_tick_delay, 2);
        assert_eq!(config.base_height, WorldConfig::default().base_height);
    }

    #[test]
    fn test_roundtrip_json() {
        let config = WorldConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: WorldConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let res = WorldConfig::load(std::path::Path::new("/nonexistent/world.json"));
        assert!(res.is_err());
    }
}
