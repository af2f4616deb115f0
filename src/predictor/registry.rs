use super::{
    ImagePredictor, Input, MediaPredictor, Modality, PlaceholderPredictor,
    PlaceholderTextPredictor, Prediction, Predictor, RemoteTextClassifier, TextPredictor,
};
use crate::{
    Error, Result,
    config::{BackendConfig, ModelsConfig},
    model::RemoteModelClient,
};
use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::sync::RwLock;
use tracing::{debug, error, info};

/// Process-scoped model handles. Each modality's predictor is built the first
/// time it is needed and kept until `shutdown`.
pub struct ModelRegistry {
    models: ModelsConfig,
    timeout: Duration,
    loaded: RwLock<HashMap<Modality, Arc<dyn Predictor>>>,
}

impl ModelRegistry {
    pub fn new(models: ModelsConfig, timeout: Duration) -> Self {
        Self {
            models,
            timeout,
            loaded: RwLock::new(HashMap::new()),
        }
    }

    /// Registry with predictors already in place. Modalities not covered fall
    /// back to the configured backends.
    pub fn with_predictors(
        models: ModelsConfig,
        timeout: Duration,
        predictors: Vec<Arc<dyn Predictor>>,
    ) -> Self {
        let loaded = predictors
            .into_iter()
            .map(|p| (p.modality(), p))
            .collect();

        Self {
            models,
            timeout,
            loaded: RwLock::new(loaded),
        }
    }

    pub async fn get(&self, modality: Modality) -> Result<Arc<dyn Predictor>> {
        if let Some(predictor) = self.loaded.read().await.get(&modality) {
            return Ok(predictor.clone());
        }

        let mut loaded = self.loaded.write().await;
        // Another request may have initialized it while we waited.
        if let Some(predictor) = loaded.get(&modality) {
            return Ok(predictor.clone());
        }

        let backend = self.backend_for(modality);
        info!("Initializing {} predictor ({})", modality, backend_name(backend));
        let predictor = build_predictor(modality, backend)?;
        loaded.insert(modality, predictor.clone());

        Ok(predictor)
    }

    /// Runs the predictor for `modality`. Load failures, inference failures
    /// and timeouts all come back as `Error::Prediction`.
    pub async fn predict(&self, modality: Modality, input: Input<'_>) -> Result<Prediction> {
        let predictor = self.get(modality).await.map_err(Error::into_prediction)?;

        let prediction = tokio::time::timeout(self.timeout, predictor.predict(input))
            .await
            .map_err(|_| {
                Error::prediction(format!(
                    "{} prediction timed out after {}s",
                    modality,
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| {
                error!("{} prediction failed: {}", modality, e);
                e.into_prediction()
            })?;

        debug!(
            "{} prediction: {} ({:.4})",
            modality, prediction.label, prediction.confidence
        );

        Ok(prediction)
    }

    pub async fn is_loaded(&self, modality: Modality) -> bool {
        self.loaded.read().await.contains_key(&modality)
    }

    /// Drops every loaded predictor.
    pub async fn shutdown(&self) {
        let mut loaded = self.loaded.write().await;
        let count = loaded.len();
        loaded.clear();
        info!("Model registry shut down, released {} predictor(s)", count);
    }

    fn backend_for(&self, modality: Modality) -> &BackendConfig {
        match modality {
            Modality::Image => &self.models.image,
            Modality::Video => &self.models.video,
            Modality::Audio => &self.models.audio,
            Modality::Text => &self.models.text,
        }
    }
}

fn backend_name(backend: &BackendConfig) -> &'static str {
    match backend {
        BackendConfig::Placeholder { .. } => "placeholder",
        BackendConfig::Remote { .. } => "remote",
    }
}

fn remote_client(
    modality: Modality,
    endpoint: &str,
    headers: &HashMap<String, String>,
) -> Result<RemoteModelClient> {
    if endpoint.is_empty() {
        return Err(Error::config(format!(
            "{} model backend has no endpoint configured",
            modality
        )));
    }
    Ok(RemoteModelClient::new(endpoint, headers.clone()))
}

pub fn build_predictor(modality: Modality, backend: &BackendConfig) -> Result<Arc<dyn Predictor>> {
    let predictor: Arc<dyn Predictor> = match (modality, backend) {
        (Modality::Text, BackendConfig::Placeholder { .. }) => {
            Arc::new(TextPredictor::new(Box::new(PlaceholderTextPredictor)))
        }
        (Modality::Text, BackendConfig::Remote {
            endpoint, headers, ..
        }) => {
            let client = remote_client(modality, endpoint, headers)?;
            Arc::new(TextPredictor::new(Box::new(RemoteTextClassifier::new(
                Box::new(client),
            ))))
        }
        (_, BackendConfig::Placeholder { result, confidence }) => {
            Arc::new(PlaceholderPredictor::new(modality, *result, *confidence))
        }
        (Modality::Image, BackendConfig::Remote {
            endpoint,
            threshold,
            headers,
        }) => {
            let client = remote_client(modality, endpoint, headers)?;
            Arc::new(ImagePredictor::new(Box::new(client), *threshold))
        }
        (Modality::Video | Modality::Audio, BackendConfig::Remote {
            endpoint,
            threshold,
            headers,
        }) => {
            let client = remote_client(modality, endpoint, headers)?;
            Arc::new(MediaPredictor::new(modality, Box::new(client), *threshold))
        }
    };

    Ok(predictor)
}
