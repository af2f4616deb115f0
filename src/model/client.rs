use crate::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Serialize)]
pub struct PredictRequest {
    pub instances: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictResponse {
    pub predictions: Vec<Value>,
}

/// A model reachable through a JSON predict call. One output row per input
/// instance.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn predict(&self, instances: Vec<Value>) -> Result<Vec<Vec<f32>>>;
}

pub struct RemoteModelClient {
    endpoint: String,
    headers: HashMap<String, String>,
    client: reqwest::Client,
}

impl RemoteModelClient {
    pub fn new(endpoint: impl Into<String>, headers: HashMap<String, String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            headers,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ModelClient for RemoteModelClient {
    async fn predict(&self, instances: Vec<Value>) -> Result<Vec<Vec<f32>>> {
        let expected = instances.len();
        debug!(
            "Sending {} instance(s) to model endpoint {}",
            expected, self.endpoint
        );

        let mut req_builder = self
            .client
            .post(&self.endpoint)
            .json(&PredictRequest { instances });

        for (key, value) in &self.headers {
            req_builder = req_builder.header(key, value);
        }

        let response = req_builder
            .send()
            .await
            .map_err(|e| Error::model(format!("Failed to reach model endpoint: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::model(format!(
                "Model endpoint returned {}: {}",
                status, body
            )));
        }

        let body: PredictResponse = response
            .json()
            .await
            .map_err(|e| Error::model(format!("Failed to parse model response: {}", e)))?;

        if body.predictions.len() != expected {
            return Err(Error::model(format!(
                "Model returned {} prediction(s) for {} instance(s)",
                body.predictions.len(),
                expected
            )));
        }

        body.predictions.iter().map(parse_row).collect()
    }
}

/// Accepts either a bare number or a flat array of numbers per prediction.
/// Values that do not fit a finite `f32` are rejected.
pub fn parse_row(value: &Value) -> Result<Vec<f32>> {
    match value {
        Value::Number(_) => Ok(vec![parse_score(value)?]),
        Value::Array(items) => items.iter().map(parse_score).collect(),
        other => Err(Error::model(format!(
            "Unexpected prediction shape: {}",
            other
        ))),
    }
}

fn parse_score(value: &Value) -> Result<f32> {
    let score = value
        .as_f64()
        .map(|v| v as f32)
        .ok_or_else(|| Error::model(format!("Unexpected prediction value: {}", value)))?;

    if !score.is_finite() {
        return Err(Error::model(format!(
            "Prediction is not a finite number: {}",
            value
        )));
    }

    Ok(score)
}
