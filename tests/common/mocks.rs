use async_trait::async_trait;
use deepfake_guard::{
    Error, Result,
    predictor::{Input, Label, Modality, Prediction, Predictor},
};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// What a mock predictor saw on each call.
#[derive(Debug, Clone)]
pub struct SeenInput {
    pub path: Option<PathBuf>,
    pub existed: bool,
    pub size: Option<u64>,
    pub text: Option<String>,
}

/// Mock predictor for testing
#[derive(Debug)]
pub struct MockPredictor {
    pub modality: Modality,
    pub prediction: Prediction,
    pub error: Option<String>,
    pub calls: Arc<Mutex<Vec<SeenInput>>>,
}

impl MockPredictor {
    pub fn new(modality: Modality, label: Label, confidence: f32) -> Self {
        Self {
            modality,
            prediction: Prediction::new(label, confidence),
            error: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn calls(&self) -> Arc<Mutex<Vec<SeenInput>>> {
        self.calls.clone()
    }
}

#[async_trait]
impl Predictor for MockPredictor {
    fn modality(&self) -> Modality {
        self.modality
    }

    async fn predict(&self, input: Input<'_>) -> Result<Prediction> {
        let seen = match input {
            Input::File(path) => SeenInput {
                path: Some(path.to_path_buf()),
                existed: path.exists(),
                size: std::fs::metadata(path).ok().map(|m| m.len()),
                text: None,
            },
            Input::Text(text) => SeenInput {
                path: None,
                existed: false,
                size: None,
                text: Some(text.to_string()),
            },
        };
        self.calls.lock().unwrap().push(seen);

        if let Some(ref error) = self.error {
            return Err(Error::model(error.clone()));
        }

        Ok(self.prediction)
    }
}
