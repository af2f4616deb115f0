use super::{Input, Modality, Prediction, Predictor};
use crate::{Error, Result, model::ModelClient};
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde_json::json;
use tracing::debug;

pub const DEFAULT_MEDIA_THRESHOLD: f32 = 0.5;

/// Video or audio classifier. Decoding and feature extraction happen on the
/// model side; the staged file is shipped as base64 and the model answers with
/// a single "probability of real" score.
pub struct MediaPredictor {
    modality: Modality,
    client: Box<dyn ModelClient>,
    threshold: f32,
}

impl MediaPredictor {
    pub fn new(modality: Modality, client: Box<dyn ModelClient>, threshold: Option<f32>) -> Self {
        Self {
            modality,
            client,
            threshold: threshold.unwrap_or(DEFAULT_MEDIA_THRESHOLD),
        }
    }
}

#[async_trait]
impl Predictor for MediaPredictor {
    fn modality(&self) -> Modality {
        self.modality
    }

    async fn predict(&self, input: Input<'_>) -> Result<Prediction> {
        let path = input.expect_file(self.modality)?;
        let bytes = tokio::fs::read(path).await?;

        debug!(
            "Sending {} bytes of {} to model",
            bytes.len(),
            self.modality
        );

        let instance = json!({ "b64": STANDARD.encode(&bytes) });
        let outputs = self.client.predict(vec![instance]).await?;

        let raw_score = outputs
            .first()
            .and_then(|row| row.first())
            .copied()
            .ok_or_else(|| {
                Error::model(format!("{} model returned an empty prediction", self.modality))
            })?;

        Ok(Prediction::from_score(raw_score, self.threshold))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::Label;
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use std::sync::{Arc, Mutex};

    struct Recording {
        score: f32,
        seen: Arc<Mutex<Vec<Value>>>,
    }

    #[async_trait]
    impl ModelClient for Recording {
        async fn predict(&self, instances: Vec<Value>) -> Result<Vec<Vec<f32>>> {
            self.seen.lock().unwrap().extend(instances);
            Ok(vec![vec![self.score]])
        }
    }

    #[tokio::test]
    async fn test_media_predictor_encodes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.wav");
        std::fs::write(&path, b"RIFF....WAVE").unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let predictor = MediaPredictor::new(
            Modality::Audio,
            Box::new(Recording {
                score: 0.8,
                seen: seen.clone(),
            }),
            None,
        );

        let prediction = predictor.predict(Input::File(&path)).await.unwrap();
        assert_eq!(prediction.label, Label::Real);
        assert_eq!(predictor.modality(), Modality::Audio);

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0]["b64"], "UklGRi4uLi5XQVZF");
    }

    #[tokio::test]
    async fn test_media_predictor_missing_file_is_error() {
        let predictor = MediaPredictor::new(
            Modality::Video,
            Box::new(Recording {
                score: 0.8,
                seen: Arc::new(Mutex::new(Vec::new())),
            }),
            None,
        );

        let result = predictor
            .predict(Input::File(std::path::Path::new("/nonexistent/clip.mp4")))
            .await;
        assert!(result.is_err());
    }
}
