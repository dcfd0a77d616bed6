use serde::{Deserialize, Serialize};

/// Canonical class list served by the prediction endpoint; the index is
/// the class id.
pub const CLASS_NAMES: [&str; 2] = ["cavity", "normal"];

/// Class enumeration for the two recognized finding types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DentalClass {
    Cavity,
    Normal,
}

impl DentalClass {
    /// Maps a wire class id to a known class. Ids outside the trained
    /// set are tolerated and simply not counted per class.
    pub fn from_class_id(class_id: u32) -> Option<Self> {
        match class_id {
            0 => Some(DentalClass::Cavity),
            1 => Some(DentalClass::Normal),
            _ => None,
        }
    }

    pub fn class_id(self) -> u32 {
        match self {
            DentalClass::Cavity => 0,
            DentalClass::Normal => 1,
        }
    }

    pub fn name(self) -> &'static str {
        CLASS_NAMES[self.class_id() as usize]
    }
}

/// One recognized object instance returned by the prediction endpoint.
/// The client treats it as read-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Detection {
    pub object_id: u32,
    pub class_id: u32,
    pub class_name: String,
    pub confidence: f32,
    #[serde(default)]
    pub bbox: [i32; 4],
    pub probabilities: [f32; 2],
}

impl Detection {
    /// Builds a detection the way the endpoint does: the probability
    /// slot on the detected class carries the confidence, the other
    /// slot stays zero.
    pub fn new(object_id: u32, class: DentalClass, confidence: f32, bbox: [i32; 4]) -> Self {
        let mut probabilities = [0.0, 0.0];
        probabilities[class.class_id() as usize] = confidence;
        Self {
            object_id,
            class_id: class.class_id(),
            class_name: class.name().to_string(),
            confidence,
            bbox,
            probabilities,
        }
    }

    pub fn dental_class(&self) -> Option<DentalClass> {
        DentalClass::from_class_id(self.class_id)
    }

    pub fn cavity_probability(&self) -> f32 {
        self.probabilities[0]
    }

    pub fn normal_probability(&self) -> f32 {
        self.probabilities[1]
    }

    /// Chart/axis label for this detection.
    pub fn label(&self) -> String {
        format!("Obj {} ({})", self.object_id, self.class_name)
    }
}
