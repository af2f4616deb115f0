use crate::predictor::{Label, Prediction};
use serde::{Deserialize, Serialize};

pub const PING_MESSAGE: &str = "Backend is active!";

#[derive(Debug, Serialize, Deserialize)]
pub struct PingResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub result: Label,
    pub confidence: f32,
}

impl From<Prediction> for AnalysisResponse {
    fn from(prediction: Prediction) -> Self {
        let normalized = prediction.normalized();
        Self {
            result: normalized.label,
            confidence: normalized.confidence,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
