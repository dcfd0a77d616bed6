use serde::{Deserialize, Serialize};

use crate::api_interface::detection::{Detection, CLASS_NAMES};

/// JSON body returned by `POST /api/predict`.
///
/// Every field defaults so partial bodies (notably error-only replies)
/// deserialize cleanly. When `error` is populated the renderer ignores
/// every other field.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PredictionResponse {
    #[serde(default)]
    pub num_detections: usize,
    #[serde(default)]
    pub detections: Vec<Detection>,
    #[serde(default)]
    pub inference_time_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_threshold: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_image_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PredictionResponse {
    /// Error-only reply body, as the endpoint answers failed requests.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Default::default()
        }
    }
}

/// JSON body returned by `GET /api/classes`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassesResponse {
    pub classes: Vec<String>,
    pub num_classes: usize,
}

impl ClassesResponse {
    pub fn canonical() -> Self {
        Self {
            classes: CLASS_NAMES.iter().map(|name| name.to_string()).collect(),
            num_classes: CLASS_NAMES.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_only_body_deserializes_with_defaults() {
        let response: PredictionResponse =
            serde_json::from_str(r#"{"error": "model failed"}"#).unwrap();
        assert_eq!(response.error.as_deref(), Some("model failed"));
        assert_eq!(response.num_detections, 0);
        assert!(response.detections.is_empty());
    }

    #[test]
    fn success_body_round_trips() {
        let body = r#"{
            "num_detections": 1,
            "detections": [{
                "object_id": 1,
                "class_id": 0,
                "class_name": "cavity",
                "confidence": 0.8,
                "bbox": [1, 2, 3, 4],
                "probabilities": [0.8, 0.0]
            }],
            "inference_time_ms": 42.0,
            "saved_image_path": "annotated_scan_17.jpg"
        }"#;
        let response: PredictionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.num_detections, 1);
        assert_eq!(response.detections[0].class_name, "cavity");
        assert_eq!(
            response.saved_image_path.as_deref(),
            Some("annotated_scan_17.jpg")
        );

        let encoded = serde_json::to_string(&response).unwrap();
        assert!(!encoded.contains("error"));
    }

    #[test]
    fn canonical_classes_match_the_trained_set() {
        let classes = ClassesResponse::canonical();
        assert_eq!(classes.classes, vec!["cavity", "normal"]);
        assert_eq!(classes.num_classes, 2);
    }
}
