/// Idle/placeholder texts shown before any submission and after a
/// failure reset.
pub const IDLE_RESULT: &str = "-";
pub const IDLE_INFERENCE: &str = "-- ms";
pub const PENDING_RESULT: &str = "Processing...";

/// State of the result/inference-time display.
///
/// Every failure path resets to the idle texts; the pending text is
/// never left displayed once a submission has settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPanel {
    result_text: String,
    inference_text: String,
    pending: bool,
}

impl ResultPanel {
    pub fn new() -> Self {
        Self {
            result_text: IDLE_RESULT.to_string(),
            inference_text: IDLE_INFERENCE.to_string(),
            pending: false,
        }
    }

    pub fn set_pending(&mut self) {
        self.result_text = PENDING_RESULT.to_string();
        self.inference_text = IDLE_INFERENCE.to_string();
        self.pending = true;
    }

    pub fn set_rendered(&mut self, summary: &str, inference_text: &str) {
        self.result_text = summary.to_string();
        self.inference_text = inference_text.to_string();
        self.pending = false;
    }

    pub fn reset_failed(&mut self) {
        self.result_text = IDLE_RESULT.to_string();
        self.inference_text = IDLE_INFERENCE.to_string();
        self.pending = false;
    }

    pub fn result_text(&self) -> &str {
        &self.result_text
    }

    pub fn inference_text(&self) -> &str {
        &self.inference_text
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

impl Default for ResultPanel {
    fn default() -> Self {
        Self::new()
    }
}
