use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    MissingInput(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    UnsupportedMediaType(String),

    #[error("Prediction error: {0}")]
    Prediction(String),

    #[error("Model backend error: {0}")]
    Model(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Address parse error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn missing_input(msg: impl Into<String>) -> Self {
        Self::MissingInput(msg.into())
    }

    pub fn payload_too_large(msg: impl Into<String>) -> Self {
        Self::PayloadTooLarge(msg.into())
    }

    pub fn unsupported_media_type(msg: impl Into<String>) -> Self {
        Self::UnsupportedMediaType(msg.into())
    }

    pub fn prediction(msg: impl Into<String>) -> Self {
        Self::Prediction(msg.into())
    }

    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the error was caused by the client's input rather than the
    /// server or a model backend.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingInput(_) | Self::PayloadTooLarge(_) | Self::UnsupportedMediaType(_)
        )
    }

    /// Collapses any failure raised while loading or running a model into a
    /// `Prediction` error that keeps the original message.
    pub fn into_prediction(self) -> Self {
        match self {
            Self::Prediction(_) => self,
            Self::Model(msg) | Self::Internal(msg) | Self::Config(msg) => Self::Prediction(msg),
            other if other.is_client_error() => other,
            other => Self::Prediction(other.to_string()),
        }
    }
}
