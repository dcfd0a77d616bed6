use denticore::api_interface::PredictionResponse;

/// Rolling view of the bridge's activity, kept behind the state lock
/// and exposed for logs and tests.
#[derive(Debug, Clone, Default)]
pub struct ServiceSnapshot {
    pub last_response: Option<PredictionResponse>,
    pub predictions_served: usize,
}
