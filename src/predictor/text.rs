use super::{Input, Label, Modality, Prediction, Predictor};
use crate::{Error, Result, model::ModelClient};
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::{debug, info};

/// Phrases that mark a message as a scam on their own.
const HIGH_RISK_PHRASES: [&str; 8] = [
    "lottery",
    "won prize",
    "claim now",
    "free money",
    "guaranteed profit",
    "registration fee",
    "crypto investment",
    "earn daily",
];

const OTP_TRIGGERS: [&str; 4] = ["click", "verify", "link", "urgent"];

/// Confidence the hybrid override forces when it fires.
pub const OVERRIDE_CONFIDENCE_FLOOR: f32 = 0.90;

static URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"http\S+|www\S+").unwrap());
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());
static SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

pub fn clean_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let without_urls = URL_RE.replace_all(&lowered, " URL ");
    let without_numbers = NUMBER_RE.replace_all(&without_urls, " NUMBER ");
    SPACE_RE
        .replace_all(&without_numbers, " ")
        .trim()
        .to_string()
}

pub fn rule_based_scam_check(text: &str) -> bool {
    let text = text.to_lowercase();

    if HIGH_RISK_PHRASES.iter().any(|p| text.contains(p)) {
        return true;
    }

    text.contains("otp") && OTP_TRIGGERS.iter().any(|w| text.contains(w))
}

/// Text classifier with the hybrid keyword override layered on top. The inner
/// classifier sees the cleaned text; the keyword check sees the raw input.
pub struct TextPredictor {
    classifier: Box<dyn Predictor>,
}

impl TextPredictor {
    pub fn new(classifier: Box<dyn Predictor>) -> Self {
        Self { classifier }
    }
}

#[async_trait]
impl Predictor for TextPredictor {
    fn modality(&self) -> Modality {
        Modality::Text
    }

    async fn predict(&self, input: Input<'_>) -> Result<Prediction> {
        let text = input.expect_text(Modality::Text)?;
        let cleaned = clean_text(text);

        let prediction = self.classifier.predict(Input::Text(&cleaned)).await?;

        if rule_based_scam_check(text) && prediction.confidence < OVERRIDE_CONFIDENCE_FLOOR {
            info!(
                "Hybrid override fired (model said {} at {:.2})",
                prediction.label, prediction.confidence
            );
            return Ok(Prediction::new(
                Label::Fake,
                prediction.confidence.max(OVERRIDE_CONFIDENCE_FLOOR),
            ));
        }

        Ok(prediction)
    }
}

/// Two-class sequence classifier behind a predict endpoint. Index 0 is
/// REAL/SAFE, index 1 is SCAM/FAKE; the endpoint returns logits.
pub struct RemoteTextClassifier {
    client: Box<dyn ModelClient>,
}

impl RemoteTextClassifier {
    pub fn new(client: Box<dyn ModelClient>) -> Self {
        Self { client }
    }
}

fn softmax(logits: &[f32]) -> Result<Vec<f32>> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    let probs: Vec<f32> = exps.into_iter().map(|e| e / sum).collect();

    if probs.iter().all(|p| p.is_finite()) {
        Ok(probs)
    } else {
        Err(Error::model(format!(
            "Text model logits {:?} do not form a probability distribution",
            logits
        )))
    }
}

#[async_trait]
impl Predictor for RemoteTextClassifier {
    fn modality(&self) -> Modality {
        Modality::Text
    }

    async fn predict(&self, input: Input<'_>) -> Result<Prediction> {
        let text = input.expect_text(Modality::Text)?;
        let outputs = self
            .client
            .predict(vec![Value::String(text.to_string())])
            .await?;

        let logits = outputs
            .into_iter()
            .next()
            .ok_or_else(|| Error::model("Text model returned no prediction"))?;

        if logits.len() != 2 {
            return Err(Error::model(format!(
                "Text model returned {} logits, expected 2",
                logits.len()
            )));
        }

        let probs = softmax(&logits)?;
        let (label, confidence) = if probs[1] > probs[0] {
            (Label::Fake, probs[1])
        } else {
            (Label::Real, probs[0])
        };

        debug!("Text model probabilities {:?}", probs);

        Ok(Prediction::new(label, confidence))
    }
}
