use super::{Input, Label, Modality, Prediction, Predictor};
use crate::Result;
use async_trait::async_trait;

/// Returns a fixed verdict for every input. Stands in for models that have not
/// been wired up yet.
pub struct PlaceholderPredictor {
    modality: Modality,
    prediction: Prediction,
}

impl PlaceholderPredictor {
    pub fn new(modality: Modality, label: Label, confidence: f32) -> Self {
        Self {
            modality,
            prediction: Prediction::new(label, confidence),
        }
    }
}

#[async_trait]
impl Predictor for PlaceholderPredictor {
    fn modality(&self) -> Modality {
        self.modality
    }

    async fn predict(&self, input: Input<'_>) -> Result<Prediction> {
        match self.modality {
            Modality::Text => {
                input.expect_text(self.modality)?;
            }
            _ => {
                input.expect_file(self.modality)?;
            }
        }
        Ok(self.prediction)
    }
}

/// Keyword stub for the text classifier: anything mentioning "fake" is FAKE.
pub struct PlaceholderTextPredictor;

#[async_trait]
impl Predictor for PlaceholderTextPredictor {
    fn modality(&self) -> Modality {
        Modality::Text
    }

    async fn predict(&self, input: Input<'_>) -> Result<Prediction> {
        let text = input.expect_text(Modality::Text)?;
        if text.to_lowercase().contains("fake") {
            Ok(Prediction::new(Label::Fake, 0.82))
        } else {
            Ok(Prediction::new(Label::Real, 0.64))
        }
    }
}
