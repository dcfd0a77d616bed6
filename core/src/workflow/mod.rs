pub mod chart;
pub mod panel;
pub mod sections;
pub mod submission;

pub use chart::{ChartInstance, ChartSlot, ProbabilityChartModel};
pub use panel::ResultPanel;
pub use sections::Section;
pub use submission::{
    annotated_image_url, class_counts, media_type_for, present, ClassCounts, SelectedImage,
    SubmissionRequest, SubmissionWorkflow,
};
