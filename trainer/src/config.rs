use anyhow::{Context, Result};
use neurodrive_nn::networks::NeuralNetwork;
use neurodrive_sim::states::DriverConfig;
use neurodrive_sim::tracks::{layouts, RoadGrid, TrackLayout};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use std::fs;
use std::path::{Path, PathBuf};

/// Everything a training run reads from its RON file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub driver: DriverConfig,
    /// Tracks to drive on. The built-in layouts are used when empty.
    pub tracks: Vec<TrackLayout>,
    /// Network replayed in file mode and used to seed training.
    pub network_file: PathBuf,
    /// Directory improved networks are written to.
    pub save_dir: PathBuf,
    /// Whether to write every improved network.
    pub save_improvements: bool,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            driver: DriverConfig::default(),
            tracks: vec![],
            network_file: PathBuf::from("default.txt"),
            save_dir: PathBuf::from("."),
            save_improvements: true,
        }
    }
}

impl TrainerConfig {
    pub fn load(path: Option<&Path>) -> Result<TrainerConfig> {
        match path {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                ron::from_str(&raw)
                    .with_context(|| format!("failed to parse RON config {}", path.display()))
            }
            None => Ok(TrainerConfig::default()),
        }
    }

    pub fn to_ron(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .context("failed to serialize config")
    }

    pub fn build_tracks(&self) -> Result<Vec<RoadGrid>> {
        let layouts = if self.tracks.is_empty() {
            layouts::builtin()
        } else {
            self.tracks.clone()
        };
        layouts
            .iter()
            .enumerate()
            .map(|(i, layout)| {
                RoadGrid::from_layout(layout).with_context(|| format!("invalid track {}", i))
            })
            .collect()
    }
}

/// Reads a stored network, treating a missing or malformed
/// file as "no network" with a warning.
pub fn load_network(path: &Path) -> Option<NeuralNetwork> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            warn!("no network loaded from {}: {}", path.display(), e);
            return None;
        }
    };
    match text.parse::<NeuralNetwork>() {
        Ok(network) => {
            info!("loaded network from {}", path.display());
            Some(network)
        }
        Err(e) => {
            warn!("malformed network in {}: {}", path.display(), e);
            None
        }
    }
}

/// Writes `network` to `temp_<count>.txt` inside `dir`.
pub fn save_network(dir: &Path, count: usize, network: &NeuralNetwork) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed creating output directory {}", dir.display()))?;
    let path = dir.join(format!("temp_{}.txt", count));
    fs::write(&path, network.serialize())
        .with_context(|| format!("failed writing {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ron_round_trip() {
        let config = TrainerConfig::default();
        let text = config.to_ron().unwrap();
        let parsed: TrainerConfig = ron::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn partial_config() {
        let config: TrainerConfig =
            ron::from_str("(driver: (forward_outputs: 4, optim: (population_size: 12)))").unwrap();
        assert_eq!(config.driver.forward_outputs, 4);
        assert_eq!(config.driver.turn_outputs, 10);
        assert_eq!(config.driver.optim.population_size, 12);
        assert_eq!(config.driver.optim.hidden_scale, 2);
        assert!(config.save_improvements);
    }

    #[test]
    fn builtin_tracks_when_none_given() {
        let config = TrainerConfig::default();
        assert_eq!(config.build_tracks().unwrap().len(), 2);
    }

    #[test]
    fn missing_network_file() {
        assert!(load_network(Path::new("/nonexistent/default.txt")).is_none());
    }
}
