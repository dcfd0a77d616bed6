use serde::{Deserialize, Serialize};

use crate::api_interface::Detection;

/// Derived input for the probability bar chart: one label per detection
/// plus the two parallel probability series. An empty response yields an
/// empty model, which still renders (zero bars), never a suppressed
/// chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityChartModel {
    pub labels: Vec<String>,
    pub cavity: Vec<f32>,
    pub normal: Vec<f32>,
}

impl ProbabilityChartModel {
    pub fn from_detections(detections: &[Detection]) -> Self {
        Self {
            labels: detections.iter().map(Detection::label).collect(),
            cavity: detections
                .iter()
                .map(Detection::cavity_probability)
                .collect(),
            normal: detections
                .iter()
                .map(Detection::normal_probability)
                .collect(),
        }
    }

    pub fn bar_groups(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// A chart bound to the canvas. Instances are only created by
/// [`ChartSlot`], which owns the replace protocol.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartInstance {
    id: u64,
    model: ProbabilityChartModel,
}

impl ChartInstance {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn model(&self) -> &ProbabilityChartModel {
        &self.model
    }
}

/// Owned handle for the single chart bound to the canvas surface.
///
/// The canvas does not support rebinding: the prior instance must be
/// destroyed before a replacement exists, and at most one instance is
/// bound at any time. Instance ids increase monotonically so the
/// replace protocol is observable.
#[derive(Debug, Default)]
pub struct ChartSlot {
    current: Option<ChartInstance>,
    created: u64,
}

impl ChartSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Destroys the bound instance, then binds a fresh one for `model`.
    pub fn install(&mut self, model: ProbabilityChartModel) -> &ChartInstance {
        self.current = None;
        self.created += 1;
        self.current.insert(ChartInstance {
            id: self.created,
            model,
        })
    }

    pub fn current(&self) -> Option<&ChartInstance> {
        self.current.as_ref()
    }

    pub fn bound_instances(&self) -> usize {
        usize::from(self.current.is_some())
    }

    /// Total instances ever created by this slot.
    pub fn created(&self) -> u64 {
        self.created
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}
