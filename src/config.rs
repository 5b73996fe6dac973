use std::path::Path;
use serde::{Serialize, Deserialize, de::DeserializeOwned};

use crate::{
    log,
    pathfind::MAX_JUNCTION_HISTORY,
};

// ----------------------------------------------
// Configs
// ----------------------------------------------

pub trait Configs {
    fn post_load(&mut self) {
    }

    // Saves current configs to a JSON file.
    fn save_file<P>(&self, config_json_path: P) -> Result<(), String>
        where Self: Sized + Serialize,
              P: AsRef<Path>
    {
        let config_json_path = config_json_path.as_ref();

        let json = serde_json::to_string_pretty(self).map_err(|err| {
            format!("Failed to serialize config file {config_json_path:?}: {err}")
        })?;

        std::fs::write(config_json_path, json).map_err(|err| {
            format!("Failed to write config file {config_json_path:?}: {err}")
        })
    }

    fn from_json_str<T>(json: &str) -> Result<T, String>
        where T: Configs + Sized + DeserializeOwned
    {
        let mut configs: T = serde_json::from_str(json).map_err(|err| err.to_string())?;
        configs.post_load();
        Ok(configs)
    }

    // Either succeeds loading the config file or returns a default config.
    fn load_file<T, P>(config_json_path: P) -> T
        where T: Configs + Sized + Default + DeserializeOwned,
              P: AsRef<Path>
    {
        let config_json_path = config_json_path.as_ref();

        let json = match std::fs::read_to_string(config_json_path) {
            Ok(json) => json,
            Err(err) => {
                log::error!(log::channel!("config"), "Failed to read config file from path {config_json_path:?}: {err}");
                return T::default();
            }
        };

        match Self::from_json_str::<T>(&json) {
            Ok(configs) => configs,
            Err(err) => {
                log::error!(log::channel!("config"), "Failed to deserialize config file from path {config_json_path:?}: {err}");
                T::default()
            }
        }
    }
}

// ----------------------------------------------
// PathfindConfigs
// ----------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)] // Missing fields in the config file get defaults from PathfindConfigs::default().
pub struct PathfindConfigs {
    // Thin junctions a single search path may pass through, per agent role:
    pub staff_max_junctions: u8,
    pub guest_max_junctions: u8,
    pub guest_with_map_max_junctions: u8,
    pub guest_leaving_park_max_junctions: u8,
    pub guest_lost_leaving_park_max_junctions: u8,

    // A guest leaving the park counts as lost once its lost countdown drops below this.
    pub lost_countdown_threshold: u8,

    // Whole-search tile budgets, split evenly between the candidate edges.
    pub staff_max_tiles_checked: i32,
    pub guest_max_tiles_checked: i32,

    // Steps along one search path before it is cut off.
    pub max_search_steps: u8,

    // Depth limit of the single-width destination probe.
    pub destination_probe_max_depth: u8,

    // Random draws are compared against these after masking with 0xFFFF.
    pub useless_edge_prune_threshold: u16,
    pub read_map_probability: u16,
    pub read_map_probability_heading: u16,

    // Log every search branch termination on the pathfind channel.
    pub debug_log_search: bool,
}

impl Default for PathfindConfigs {
    fn default() -> Self {
        Self { staff_max_junctions: 8,
               guest_max_junctions: 5,
               guest_with_map_max_junctions: 7,
               guest_leaving_park_max_junctions: 7,
               guest_lost_leaving_park_max_junctions: 8,
               lost_countdown_threshold: 90,
               staff_max_tiles_checked: 50_000,
               guest_max_tiles_checked: 15_000,
               max_search_steps: 200,
               destination_probe_max_depth: 25,
               useless_edge_prune_threshold: 2184,
               read_map_probability: 1638,
               read_map_probability_heading: 9362,
               debug_log_search: false }
    }
}

impl Configs for PathfindConfigs {
    fn post_load(&mut self) {
        let limit = MAX_JUNCTION_HISTORY as u8;

        for (name, value) in [
            ("staff_max_junctions", &mut self.staff_max_junctions),
            ("guest_max_junctions", &mut self.guest_max_junctions),
            ("guest_with_map_max_junctions", &mut self.guest_with_map_max_junctions),
            ("guest_leaving_park_max_junctions", &mut self.guest_leaving_park_max_junctions),
            ("guest_lost_leaving_park_max_junctions", &mut self.guest_lost_leaving_park_max_junctions),
        ] {
            if *value > limit {
                log::warn!(log::channel!("config"), "{name}={} exceeds the junction history capacity; clamping to {limit}.", *value);
                *value = limit;
            }
        }

        if self.staff_max_tiles_checked <= 0 || self.guest_max_tiles_checked <= 0 {
            log::warn!(log::channel!("config"), "Tile check budgets must be positive; restoring defaults.");
            let defaults = Self::default();
            self.staff_max_tiles_checked = defaults.staff_max_tiles_checked;
            self.guest_max_tiles_checked = defaults.guest_max_tiles_checked;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_defaults() {
        let configs: PathfindConfigs =
            PathfindConfigs::from_json_str(r#"{ "guest_max_junctions": 6 }"#).unwrap();
        assert_eq!(configs.guest_max_junctions, 6);
        assert_eq!(configs.staff_max_junctions, 8);
        assert_eq!(configs.guest_max_tiles_checked, 15_000);
        assert_eq!(configs.max_search_steps, 200);
    }

    #[test]
    fn test_post_load_clamps_junction_caps() {
        let configs: PathfindConfigs =
            PathfindConfigs::from_json_str(r#"{ "staff_max_junctions": 40, "guest_max_tiles_checked": 0 }"#).unwrap();
        assert_eq!(configs.staff_max_junctions as usize, MAX_JUNCTION_HISTORY);
        assert_eq!(configs.guest_max_tiles_checked, 15_000);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let result: Result<PathfindConfigs, String> = PathfindConfigs::from_json_str("{ not json");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let configs: PathfindConfigs = PathfindConfigs::load_file("does/not/exist/pathfind.json");
        assert_eq!(configs, PathfindConfigs::default());
    }

    #[test]
    fn test_save_then_load_file() {
        let path = std::env::temp_dir().join("park_pathfind_configs_test.json");
        let mut configs = PathfindConfigs::default();
        configs.guest_max_junctions = 4;
        configs.debug_log_search = true;
        configs.save_file(&path).unwrap();

        let loaded: PathfindConfigs = PathfindConfigs::load_file(&path);
        assert_eq!(loaded, configs);
        let _ = std::fs::remove_file(&path);
    }
}
