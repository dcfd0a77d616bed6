use denticore::api_interface::{DentalClass, Detection};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Configuration for generating synthetic detection scenarios.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub seed: u64,
    pub max_detections: usize,
    pub scenario: Option<String>,
    pub description: Option<String>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            max_detections: 6,
            scenario: None,
            description: None,
        }
    }
}

const MIN_BOX_EDGE: u32 = 8;

/// Deterministic synthetic detections for one decoded upload.
///
/// The rng is seeded from the scenario seed and the image shape, so the
/// same upload replays the same findings. Boxes stay inside the image
/// bounds and every confidence clears the requested threshold.
pub fn build_detections(
    width: u32,
    height: u32,
    threshold: f32,
    config: &ScenarioConfig,
) -> Vec<Detection> {
    if width < 2 * MIN_BOX_EDGE || height < 2 * MIN_BOX_EDGE {
        return Vec::new();
    }

    let mut rng = StdRng::seed_from_u64(
        config
            .seed
            .wrapping_add((u64::from(width) << 32) | u64::from(height)),
    );
    let floor = threshold.clamp(0.0, 0.99);
    let count = rng.gen_range(0..=config.max_detections);

    let mut detections = Vec::with_capacity(count);
    for index in 0..count {
        let class = if rng.gen_bool(0.5) {
            DentalClass::Cavity
        } else {
            DentalClass::Normal
        };
        let box_width = rng.gen_range(MIN_BOX_EDGE..=width / 2);
        let box_height = rng.gen_range(MIN_BOX_EDGE..=height / 2);
        let x1 = rng.gen_range(0..=width - box_width) as i32;
        let y1 = rng.gen_range(0..=height - box_height) as i32;
        let confidence = floor + (1.0 - floor) * rng.gen::<f32>();

        detections.push(Detection::new(
            index as u32 + 1,
            class,
            confidence,
            [x1, y1, x1 + box_width as i32, y1 + box_height as i32],
        ));
    }
    detections
}
