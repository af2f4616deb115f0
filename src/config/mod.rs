mod types;

pub use types::*;

use crate::Result;
use std::env;
use tracing::debug;

pub async fn load() -> Result<Config> {
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

    debug!("Loading configuration from: {}", config_path);

    let config_str = tokio::fs::read_to_string(&config_path).await?;
    parse(&config_str)
}

pub fn parse(config_str: &str) -> Result<Config> {
    let config: Config = serde_yaml::from_str(config_str)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        let limits = &self.server.limits;
        if limits.image_max_mb == 0 || limits.video_max_mb == 0 || limits.audio_max_mb == 0 {
            return Err(crate::Error::config("upload limits must be greater than zero"));
        }

        if self.server.predict_timeout_secs == 0 {
            return Err(crate::Error::config(
                "predict_timeout_secs must be greater than zero",
            ));
        }

        for (name, backend) in [
            ("image", &self.models.image),
            ("video", &self.models.video),
            ("audio", &self.models.audio),
            ("text", &self.models.text),
        ] {
            match backend {
                BackendConfig::Placeholder { confidence, .. } => {
                    if !(0.0..=1.0).contains(confidence) {
                        return Err(crate::Error::config(format!(
                            "models.{name}: placeholder confidence must be within [0, 1]"
                        )));
                    }
                }
                BackendConfig::Remote {
                    endpoint,
                    threshold,
                    ..
                } => {
                    if endpoint.is_empty() {
                        return Err(crate::Error::config(format!(
                            "models.{name}: remote backend requires an endpoint"
                        )));
                    }
                    if let Some(t) = threshold {
                        if !(0.0..=1.0).contains(t) {
                            return Err(crate::Error::config(format!(
                                "models.{name}: threshold must be within [0, 1]"
                            )));
                        }
                    }
                }
            }
        }

        Ok(())
    }
}
