use super::{Input, Modality, Prediction, Predictor};
use crate::{Error, Result, model::ModelClient};
use ::image::imageops::FilterType;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Side length the classifier was trained on.
pub const IMAGE_SIZE: u32 = 224;

pub const DEFAULT_IMAGE_THRESHOLD: f32 = 0.65;

/// Binary image classifier. The model outputs the probability that the image
/// is real.
pub struct ImagePredictor {
    client: Box<dyn ModelClient>,
    threshold: f32,
}

impl ImagePredictor {
    pub fn new(client: Box<dyn ModelClient>, threshold: Option<f32>) -> Self {
        Self {
            client,
            threshold: threshold.unwrap_or(DEFAULT_IMAGE_THRESHOLD),
        }
    }
}

/// Decodes an image, converts it to RGB and resizes it to
/// `IMAGE_SIZE x IMAGE_SIZE`. Returns rows of `[r, g, b]` pixels scaled to
/// [0, 1].
pub fn preprocess_image(path: &Path) -> Result<Vec<Vec<[f32; 3]>>> {
    let img = ::image::ImageReader::open(path)?
        .with_guessed_format()?
        .decode()?;

    let rgb = img
        .resize_exact(IMAGE_SIZE, IMAGE_SIZE, FilterType::Nearest)
        .to_rgb8();

    let rows: Vec<Vec<[f32; 3]>> = rgb
        .rows()
        .map(|row| {
            row.map(|px| {
                [
                    px[0] as f32 / 255.0,
                    px[1] as f32 / 255.0,
                    px[2] as f32 / 255.0,
                ]
            })
            .collect::<Vec<_>>()
        })
        .collect();

    Ok(rows)
}

#[async_trait]
impl Predictor for ImagePredictor {
    fn modality(&self) -> Modality {
        Modality::Image
    }

    async fn predict(&self, input: Input<'_>) -> Result<Prediction> {
        let path: PathBuf = input.expect_file(Modality::Image)?.to_path_buf();

        let pixels = tokio::task::spawn_blocking(move || preprocess_image(&path))
            .await
            .map_err(|e| Error::internal(format!("Image preprocessing task failed: {}", e)))??;

        let instance = serde_json::to_value(pixels)?;
        let outputs = self.client.predict(vec![instance]).await?;

        let raw_score = outputs
            .first()
            .and_then(|row| row.first())
            .copied()
            .ok_or_else(|| Error::model("Image model returned an empty prediction"))?;

        debug!(
            "Image model raw score {:.4} (threshold {})",
            raw_score, self.threshold
        );

        Ok(Prediction::from_score(raw_score, self.threshold))
    }
}
