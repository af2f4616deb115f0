use deepfake_guard::{
    config::{self, BackendConfig, Config},
    predictor::Label,
};
use pretty_assertions::assert_eq;

/// Sample configuration YAML for testing
const SAMPLE_CONFIG_YAML: &str = r#"
server:
  host: "127.0.0.1"
  port: 9000
  upload_dir: "/var/tmp/deepfake-guard"
  predict_timeout_secs: 12
  logs:
    level: "debug"
  limits:
    image_max_mb: 5

models:
  image:
    backend: remote
    endpoint: "http://localhost:8501/v1/models/image:predict"
    threshold: 0.7
  text:
    backend: remote
    endpoint: "http://localhost:8501/v1/models/text:predict"
    headers:
      authorization: "Bearer token"
  video:
    backend: placeholder
    result: REAL
    confidence: 0.5
"#;

#[test]
fn test_empty_config_uses_defaults() {
    let config = config::parse("{}").unwrap();

    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.logs.level, "info");
    assert_eq!(config.server.predict_timeout_secs, 30);
    assert_eq!(config.server.upload_dir, None);
    assert_eq!(config.server.limits.image_max_mb, 10);
    assert_eq!(config.server.limits.video_max_mb, 100);
    assert_eq!(config.server.limits.audio_max_mb, 20);
    assert_eq!(
        config.models.audio,
        BackendConfig::Placeholder {
            result: Label::Fake,
            confidence: 0.75
        }
    );
}

#[test]
fn test_sample_config() {
    let config: Config = config::parse(SAMPLE_CONFIG_YAML).unwrap();

    assert_eq!(config.server.port, 9000);
    assert_eq!(config.server.predict_timeout_secs, 12);
    assert_eq!(config.server.limits.image_max_mb, 5);
    assert_eq!(config.server.limits.audio_max_mb, 20);
    assert_eq!(
        config.server.upload_dir.as_deref(),
        Some(std::path::Path::new("/var/tmp/deepfake-guard"))
    );

    match &config.models.image {
        BackendConfig::Remote {
            endpoint,
            threshold,
            headers,
        } => {
            assert_eq!(endpoint, "http://localhost:8501/v1/models/image:predict");
            assert_eq!(*threshold, Some(0.7));
            assert!(headers.is_empty());
        }
        other => panic!("expected remote image backend, got {:?}", other),
    }

    match &config.models.text {
        BackendConfig::Remote { headers, .. } => {
            assert_eq!(headers.get("authorization").map(String::as_str), Some("Bearer token"));
        }
        other => panic!("expected remote text backend, got {:?}", other),
    }

    assert_eq!(
        config.models.video,
        BackendConfig::Placeholder {
            result: Label::Real,
            confidence: 0.5
        }
    );
}

#[test]
fn test_invalid_backend_tag() {
    let yaml = r#"
models:
  image:
    backend: onnx
"#;
    assert!(config::parse(yaml).is_err());
}

#[test]
fn test_remote_requires_endpoint() {
    let yaml = r#"
models:
  audio:
    backend: remote
    endpoint: ""
"#;
    let err = config::parse(yaml).unwrap_err();
    assert!(err.to_string().contains("models.audio"));
}

#[test]
fn test_threshold_out_of_range() {
    let yaml = r#"
models:
  image:
    backend: remote
    endpoint: "http://localhost/predict"
    threshold: 1.5
"#;
    assert!(config::parse(yaml).is_err());
}

#[test]
fn test_zero_limit_rejected() {
    let yaml = r#"
server:
  limits:
    video_max_mb: 0
"#;
    assert!(config::parse(yaml).is_err());
}

#[test]
fn test_zero_timeout_rejected() {
    let yaml = r#"
server:
  predict_timeout_secs: 0
"#;
    assert!(config::parse(yaml).is_err());
}

#[test]
fn test_invalid_port_type() {
    let yaml = r#"
server:
  port: "not-a-number"
"#;
    assert!(config::parse(yaml).is_err());
}
