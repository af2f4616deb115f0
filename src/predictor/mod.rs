mod image;
mod media;
mod placeholder;
mod registry;
mod text;

pub use self::image::{DEFAULT_IMAGE_THRESHOLD, IMAGE_SIZE, ImagePredictor, preprocess_image};
pub use media::{DEFAULT_MEDIA_THRESHOLD, MediaPredictor};
pub use placeholder::{PlaceholderPredictor, PlaceholderTextPredictor};
pub use registry::{ModelRegistry, build_predictor};
pub use text::{
    OVERRIDE_CONFIDENCE_FLOOR, RemoteTextClassifier, TextPredictor, clean_text,
    rule_based_scam_check,
};

use crate::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{fmt, path::Path};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Image,
    Video,
    Audio,
    Text,
}

impl Modality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Label {
    #[serde(alias = "Real", alias = "real")]
    Real,
    #[serde(alias = "Fake", alias = "fake")]
    Fake,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Real => f.write_str("REAL"),
            Self::Fake => f.write_str("FAKE"),
        }
    }
}

/// A verdict as produced by a predictor. `confidence` is a fraction and is
/// not yet normalized for the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub label: Label,
    pub confidence: f32,
}

impl Prediction {
    pub fn new(label: Label, confidence: f32) -> Self {
        Self { label, confidence }
    }

    /// Turns a raw "probability of real" score into a verdict. Scores strictly
    /// above the threshold are REAL with the score as confidence, everything
    /// else is FAKE with the complement.
    pub fn from_score(raw_score: f32, threshold: f32) -> Self {
        if raw_score > threshold {
            Self::new(Label::Real, raw_score)
        } else {
            Self::new(Label::Fake, 1.0 - raw_score)
        }
    }

    pub fn normalized(&self) -> Self {
        Self::new(self.label, normalize_confidence(self.confidence))
    }
}

/// Coerces a confidence to a finite value in [0, 1] rounded to two decimals.
/// Non-finite values become 0.0.
pub fn normalize_confidence(confidence: f32) -> f32 {
    if !confidence.is_finite() {
        return 0.0;
    }
    let clamped = confidence.clamp(0.0, 1.0) as f64;
    ((clamped * 100.0).round() / 100.0) as f32
}

#[derive(Debug, Clone, Copy)]
pub enum Input<'a> {
    File(&'a Path),
    Text(&'a str),
}

impl<'a> Input<'a> {
    pub fn expect_file(&self, modality: Modality) -> Result<&'a Path> {
        match self {
            Self::File(path) => Ok(*path),
            Self::Text(_) => Err(Error::prediction(format!(
                "{modality} predictor expects a staged file, got text"
            ))),
        }
    }

    pub fn expect_text(&self, modality: Modality) -> Result<&'a str> {
        match self {
            Self::Text(text) => Ok(*text),
            Self::File(_) => Err(Error::prediction(format!(
                "{modality} predictor expects text, got a file"
            ))),
        }
    }
}

#[async_trait]
pub trait Predictor: Send + Sync {
    fn modality(&self) -> Modality;

    async fn predict(&self, input: Input<'_>) -> Result<Prediction>;
}
