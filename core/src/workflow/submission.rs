use std::path::Path;

use crate::api_interface::{DentalClass, Detection, PredictionResponse};
use crate::prelude::{RenderOutcome, RenderSurface, WorkflowError, WorkflowResult};
use crate::telemetry::{LogManager, MetricsRecorder};
use crate::workflow::chart::ProbabilityChartModel;

/// Declared media types accepted by the selection guard, keyed by file
/// extension.
const IMAGE_MEDIA_TYPES: [(&str, &str); 6] = [
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("bmp", "image/bmp"),
    ("webp", "image/webp"),
    ("gif", "image/gif"),
];

/// Declared media type for a selection. Total over arbitrary input: any
/// non-image path yields `None` and the selection is refused without
/// touching the preview.
pub fn media_type_for(path: &str) -> Option<&'static str> {
    let extension = Path::new(path)
        .extension()
        .and_then(|extension| extension.to_str())?
        .to_ascii_lowercase();
    IMAGE_MEDIA_TYPES
        .iter()
        .find(|(known, _)| *known == extension)
        .map(|(_, media_type)| *media_type)
}

/// A single image held transiently between selection and submit.
/// Replaced or cleared by the user, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedImage {
    pub file_name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl SelectedImage {
    pub fn from_path_bytes(path: &str, bytes: Vec<u8>) -> WorkflowResult<Self> {
        let media_type = media_type_for(path)
            .ok_or_else(|| WorkflowError::UnsupportedMediaType(path.to_string()))?;
        let file_name = Path::new(path)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(path)
            .to_string();
        Ok(Self {
            file_name,
            media_type: media_type.to_string(),
            bytes,
        })
    }
}

/// Multipart payload for one submission. The confidence string travels
/// verbatim; the endpoint owns range validation.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionRequest {
    pub image: SelectedImage,
    pub confidence: String,
}

/// Per-class tally over a response's detections. Ids outside the
/// trained set land in `other`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassCounts {
    pub cavity: usize,
    pub normal: usize,
    pub other: usize,
}

pub fn class_counts(detections: &[Detection]) -> ClassCounts {
    let mut counts = ClassCounts::default();
    for detection in detections {
        match detection.dental_class() {
            Some(DentalClass::Cavity) => counts.cavity += 1,
            Some(DentalClass::Normal) => counts.normal += 1,
            None => counts.other += 1,
        }
    }
    counts
}

pub fn summary_text(num_detections: usize, counts: ClassCounts) -> String {
    if num_detections == 0 {
        "No objects detected".to_string()
    } else {
        format!(
            "{} objects detected ({} cavity, {} normal)",
            num_detections, counts.cavity, counts.normal
        )
    }
}

/// Cache-busting retrieval URL for an annotated image. The caller
/// supplies the current-time token so the URL is deterministic under
/// test.
pub fn annotated_image_url(base: &str, saved_image_path: &str, token: u128) -> String {
    format!(
        "{}/download/image/{}?t={}",
        base.trim_end_matches('/'),
        saved_image_path,
        token
    )
}

/// Routes a settled submission result onto a surface.
pub fn present(result: &WorkflowResult<RenderOutcome>, surface: &mut dyn RenderSurface) {
    match result {
        Ok(outcome) => surface.show_outcome(outcome),
        Err(error) => surface.show_failure(error),
    }
}

/// Client side of the request/response cycle: input validation,
/// response classification, and render-model derivation. Transport is
/// owned by the caller; this type never performs network activity.
pub struct SubmissionWorkflow {
    logger: LogManager,
    metrics: MetricsRecorder,
}

impl SubmissionWorkflow {
    pub fn new() -> Self {
        Self {
            logger: LogManager::new(),
            metrics: MetricsRecorder::new(),
        }
    }

    /// Validation gate ahead of the network call. Without a selected
    /// image this is a terminal, non-retryable local failure and no
    /// request value exists to send.
    pub fn prepare(
        &self,
        selected: Option<&SelectedImage>,
        confidence: &str,
    ) -> WorkflowResult<SubmissionRequest> {
        let Some(image) = selected else {
            self.metrics.record_failure();
            return Err(WorkflowError::NoImageSelected);
        };
        self.metrics.record_submission();
        self.logger.record(&format!(
            "submitting {} ({} bytes, confidence {})",
            image.file_name,
            image.bytes.len(),
            confidence
        ));
        Ok(SubmissionRequest {
            image: image.clone(),
            confidence: confidence.to_string(),
        })
    }

    /// Classifies a decoded response body. A populated `error` field is
    /// an application-level failure and nothing else is read from the
    /// response.
    pub fn render(&self, response: &PredictionResponse) -> WorkflowResult<RenderOutcome> {
        if let Some(message) = &response.error {
            self.metrics.record_failure();
            self.logger
                .record_failure(&format!("endpoint reported: {}", message));
            return Err(WorkflowError::Endpoint(message.clone()));
        }

        let counts = class_counts(&response.detections);
        let outcome = RenderOutcome {
            summary: summary_text(response.num_detections, counts),
            inference_text: format!("{} ms", response.inference_time_ms),
            chart: ProbabilityChartModel::from_detections(&response.detections),
            annotated_path: response.saved_image_path.clone(),
        };
        self.logger.record(&outcome.summary);
        Ok(outcome)
    }

    /// Typed constructor for transport-level failures (non-success
    /// status, connection error, malformed body).
    pub fn transport_failure(&self, message: String) -> WorkflowError {
        self.metrics.record_failure();
        self.logger
            .record_failure(&format!("transport failure: {}", message));
        WorkflowError::Transport(message)
    }

    pub fn metrics(&self) -> &MetricsRecorder {
        &self.metrics
    }
}

impl Default for SubmissionWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSurface {
        pending: usize,
        outcomes: Vec<RenderOutcome>,
        failures: Vec<WorkflowError>,
    }

    impl RenderSurface for RecordingSurface {
        fn show_pending(&mut self) {
            self.pending += 1;
        }

        fn show_failure(&mut self, error: &WorkflowError) {
            self.failures.push(error.clone());
        }

        fn show_outcome(&mut self, outcome: &RenderOutcome) {
            self.outcomes.push(outcome.clone());
        }
    }

    fn selected_scan() -> SelectedImage {
        SelectedImage {
            file_name: "scan.png".to_string(),
            media_type: "image/png".to_string(),
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
        }
    }

    fn success_response() -> PredictionResponse {
        PredictionResponse {
            num_detections: 2,
            detections: vec![
                Detection::new(1, DentalClass::Cavity, 0.82, [2, 2, 30, 30]),
                Detection::new(2, DentalClass::Normal, 0.64, [40, 6, 70, 38]),
            ],
            inference_time_ms: 42.0,
            ..Default::default()
        }
    }

    #[test]
    fn media_type_guard_is_total_over_non_images() {
        for path in ["notes.txt", "scan", "scan.pdf", "scan.jpg.exe", ".png"] {
            assert_eq!(media_type_for(path), None, "accepted {}", path);
        }
        assert_eq!(media_type_for("scan.PNG"), Some("image/png"));
        assert_eq!(media_type_for("x-ray.jpeg"), Some("image/jpeg"));
    }

    #[test]
    fn submit_without_a_selection_is_blocked_locally() {
        let workflow = SubmissionWorkflow::new();
        let error = workflow.prepare(None, "0.25").unwrap_err();
        assert_eq!(error, WorkflowError::NoImageSelected);
        assert_eq!(error.to_string(), "Please select an image first.");
        assert_eq!(workflow.metrics().snapshot(), (0, 1));
    }

    #[test]
    fn confidence_travels_verbatim() {
        let workflow = SubmissionWorkflow::new();
        let image = selected_scan();
        let request = workflow.prepare(Some(&image), "0.25abc").unwrap();
        assert_eq!(request.confidence, "0.25abc");
        assert_eq!(request.image, image);
        assert_eq!(workflow.metrics().snapshot(), (1, 0));
    }

    #[test]
    fn two_detections_render_counts_and_inference_time() {
        let workflow = SubmissionWorkflow::new();
        let outcome = workflow.render(&success_response()).unwrap();
        assert_eq!(outcome.summary, "2 objects detected (1 cavity, 1 normal)");
        assert_eq!(outcome.inference_text, "42 ms");
        assert_eq!(outcome.chart.bar_groups(), 2);
    }

    #[test]
    fn empty_response_renders_the_empty_summary_and_chart() {
        let workflow = SubmissionWorkflow::new();
        let outcome = workflow.render(&PredictionResponse::default()).unwrap();
        assert_eq!(outcome.summary, "No objects detected");
        assert!(outcome.chart.is_empty());
        assert_eq!(outcome.annotated_path, None);
    }

    #[test]
    fn error_field_wins_over_every_other_field() {
        let workflow = SubmissionWorkflow::new();
        let mut response = success_response();
        response.error = Some("model failed".to_string());

        let error = workflow.render(&response).unwrap_err();
        assert_eq!(error, WorkflowError::Endpoint("model failed".to_string()));
        assert!(error.to_string().contains("model failed"));
        assert_eq!(workflow.metrics().snapshot(), (0, 1));
    }

    #[test]
    fn sub_counts_sum_to_total_for_trained_ids() {
        let response = success_response();
        let counts = class_counts(&response.detections);
        assert_eq!(counts.cavity + counts.normal, response.detections.len());
        assert_eq!(counts.other, 0);
    }

    #[test]
    fn present_routes_results_onto_the_surface() {
        let workflow = SubmissionWorkflow::new();
        let mut surface = RecordingSurface::default();

        present(&workflow.render(&success_response()), &mut surface);
        present(
            &Err(workflow.transport_failure("HTTP error! status: 500".to_string())),
            &mut surface,
        );

        assert_eq!(surface.outcomes.len(), 1);
        assert_eq!(surface.failures.len(), 1);
        assert!(matches!(surface.failures[0], WorkflowError::Transport(_)));
    }

    #[test]
    fn annotated_url_carries_the_cache_token() {
        let url = annotated_image_url("http://127.0.0.1:5000/", "annotated_scan_17.jpg", 1700);
        assert_eq!(
            url,
            "http://127.0.0.1:5000/download/image/annotated_scan_17.jpg?t=1700"
        );
    }
}
