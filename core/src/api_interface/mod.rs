pub mod detection;
pub mod response;

pub use detection::{DentalClass, Detection, CLASS_NAMES};
pub use response::{ClassesResponse, PredictionResponse};
