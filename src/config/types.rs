use crate::predictor::Label;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub models: ModelsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub logs: LogsConfig,
    /// Directory for staged uploads. Falls back to the OS temp dir.
    #[serde(default)]
    pub upload_dir: Option<PathBuf>,
    #[serde(default = "default_predict_timeout_secs")]
    pub predict_timeout_secs: u64,
    #[serde(default)]
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Upload ceilings in megabytes (1 MB = 1024 * 1024 bytes).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_image_max_mb")]
    pub image_max_mb: u64,
    #[serde(default = "default_video_max_mb")]
    pub video_max_mb: u64,
    #[serde(default = "default_audio_max_mb")]
    pub audio_max_mb: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    #[serde(default = "default_backend")]
    pub image: BackendConfig,
    #[serde(default = "default_backend")]
    pub video: BackendConfig,
    #[serde(default = "default_backend")]
    pub audio: BackendConfig,
    #[serde(default = "default_backend")]
    pub text: BackendConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum BackendConfig {
    /// Fixed verdict. For text, `result`/`confidence` are ignored in favour of
    /// the keyword stub.
    Placeholder {
        #[serde(default = "default_placeholder_result")]
        result: Label,
        #[serde(default = "default_placeholder_confidence")]
        confidence: f32,
    },
    /// TensorFlow-Serving-style JSON predict endpoint.
    Remote {
        endpoint: String,
        #[serde(default)]
        threshold: Option<f32>,
        #[serde(default)]
        headers: HashMap<String, String>,
    },
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            logs: LogsConfig::default(),
            upload_dir: None,
            predict_timeout_secs: default_predict_timeout_secs(),
            limits: LimitsConfig::default(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            image_max_mb: default_image_max_mb(),
            video_max_mb: default_video_max_mb(),
            audio_max_mb: default_audio_max_mb(),
        }
    }
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            image: default_backend(),
            video: default_backend(),
            audio: default_backend(),
            text: default_backend(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_predict_timeout_secs() -> u64 {
    30
}

fn default_image_max_mb() -> u64 {
    10
}

fn default_video_max_mb() -> u64 {
    100
}

fn default_audio_max_mb() -> u64 {
    20
}

fn default_placeholder_result() -> Label {
    Label::Fake
}

fn default_placeholder_confidence() -> f32 {
    0.75
}

fn default_backend() -> BackendConfig {
    BackendConfig::Placeholder {
        result: default_placeholder_result(),
        confidence: default_placeholder_confidence(),
    }
}
