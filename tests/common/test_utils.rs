use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use deepfake_guard::{
    config::{Config, LimitsConfig, LogsConfig, ModelsConfig, ServerConfig},
    predictor::{ModelRegistry, Predictor},
    server::{self, handlers::AppState, intake::UploadSettings},
};
use serde_json::Value;
use std::{path::Path, sync::Arc, time::Duration};
use tempfile::TempDir;

pub const BOUNDARY: &str = "deepfake-guard-test-boundary";

/// Create a test configuration with sensible defaults
pub fn create_test_config(upload_dir: &Path) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            logs: LogsConfig {
                level: "debug".to_string(),
            },
            upload_dir: Some(upload_dir.to_path_buf()),
            predict_timeout_secs: 5,
            limits: LimitsConfig::default(),
        },
        models: ModelsConfig::default(),
    }
}

/// Router wired to the given predictors; other modalities use the default
/// placeholder backends. Uploads are staged in the returned temp dir.
pub fn create_test_app(predictors: Vec<Arc<dyn Predictor>>) -> (Router, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config(temp_dir.path());

    let registry = ModelRegistry::with_predictors(
        config.models.clone(),
        Duration::from_secs(config.server.predict_timeout_secs),
        predictors,
    );

    let state = AppState {
        registry: Arc::new(registry),
        uploads: Arc::new(UploadSettings::new(
            config.server.upload_dir.clone(),
            config.server.limits.clone(),
        )),
    };

    (server::router(state), temp_dir)
}

/// Multipart body with a single part.
pub fn multipart_body(
    field: &str,
    filename: Option<&str>,
    content_type: Option<&str>,
    data: &[u8],
) -> Vec<u8> {
    multipart_parts(&[(field, filename, content_type, data)])
}

/// Multipart body with the given `(field, filename, content_type, data)` parts
/// in order.
pub fn multipart_parts(parts: &[(&str, Option<&str>, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();

    for (field, filename, content_type, data) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());

        let disposition = match filename {
            Some(name) => format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                field, name
            ),
            None => format!("Content-Disposition: form-data; name=\"{}\"\r\n", field),
        };
        body.extend_from_slice(disposition.as_bytes());

        if let Some(ct) = content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", ct).as_bytes());
        }

        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_request(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn json_request(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Encoded PNG of a solid-color square.
pub fn png_bytes(side: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(side, side, image::Rgb([120, 80, 200]));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Number of entries left in the upload staging directory.
pub fn staged_file_count(dir: &TempDir) -> usize {
    std::fs::read_dir(dir.path()).unwrap().count()
}
