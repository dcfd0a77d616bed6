//! Submission workflow and endpoint interface for the Rust dental screening platform.
//!
//! The modules mirror the legacy screening client while providing typed
//! errors, an owned chart handle, and a presentation seam that keeps the
//! workflow testable without a live rendering surface.

pub mod api_interface;
pub mod prelude;
pub mod telemetry;
pub mod workflow;

pub use prelude::{RenderOutcome, RenderSurface, WorkflowError, WorkflowResult};
