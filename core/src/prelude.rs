use crate::workflow::chart::ProbabilityChartModel;

/// Everything the presentation layer needs to render one finished
/// submission: the human-readable summary, the inference-time text, the
/// derived chart model, and the optional annotated-image reference.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutcome {
    pub summary: String,
    pub inference_text: String,
    pub chart: ProbabilityChartModel,
    pub annotated_path: Option<String>,
}

/// Common error type for the submission workflow.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum WorkflowError {
    #[error("Please select an image first.")]
    NoImageSelected,
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),
    #[error("endpoint error: {0}")]
    Endpoint(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("unknown section: {0}")]
    UnknownSection(String),
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Trait describing the surface a submission renders onto.
///
/// The workflow decides *what* happened; the surface decides *how* it is
/// shown. A recording stub stands in for the GUI under test.
pub trait RenderSurface {
    fn show_pending(&mut self);
    fn show_failure(&mut self, error: &WorkflowError);
    fn show_outcome(&mut self, outcome: &RenderOutcome);
}
