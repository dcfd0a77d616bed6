use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::generator::detections::ScenarioConfig;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub confidence_threshold: f32,
    pub max_detections: usize,
    pub seed: u64,
    pub output_dir: PathBuf,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.25,
            max_detections: 6,
            seed: 0,
            output_dir: PathBuf::from("tools/data/annotated"),
        }
    }
}

impl ServiceConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading service config {}", path_ref.display()))?;
        let config: ServiceConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing service config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(
        confidence_threshold: f32,
        max_detections: usize,
        seed: u64,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            confidence_threshold,
            max_detections,
            seed,
            output_dir,
        }
    }

    pub fn to_scenario(&self) -> ScenarioConfig {
        ScenarioConfig {
            seed: self.seed,
            max_detections: self.max_detections,
            ..Default::default()
        }
    }
}
