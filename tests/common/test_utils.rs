use serde_json::{Value, json};
use skinscan::{
    config::{Config, LogsConfig, PollingConfig, ServiceConfig},
    image::ImageAsset,
    poller::PollingPolicy,
};
use std::time::Duration;
use tempfile::TempDir;

/// Create a test configuration pointing at the given service
pub fn create_test_config(base_url: &str) -> Config {
    Config {
        service: ServiceConfig {
            base_url: base_url.to_string(),
            request_timeout_secs: 5,
            connect_timeout_secs: 5,
        },
        polling: PollingConfig {
            initial_delay_ms: 10,
            interval_ms: 10,
            max_attempts: 5,
        },
        logs: LogsConfig {
            level: "debug".to_string(),
        },
    }
}

pub fn fast_policy(max_attempts: u32) -> PollingPolicy {
    PollingPolicy {
        initial_delay: Duration::from_millis(5),
        interval: Duration::from_millis(5),
        max_attempts,
    }
}

pub fn create_test_image() -> ImageAsset {
    ImageAsset::new("file:///photos/arm_rash.jpg", b"fake-jpeg-bytes".to_vec())
}

/// Create a temporary directory for test files
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

pub fn sample_recommendation_body() -> Value {
    json!({
        "condition": "Eczema",
        "healthy_foods": [
            {
                "name": "Fatty fish (salmon, mackerel)",
                "benefit": "Omega-3 fatty acids calm inflammation",
                "nutrients": "EPA, DHA, Vitamin D"
            },
            {
                "name": "Oats",
                "benefit": "Soothing and rich in fibre",
                "nutrients": "Beta-glucan, zinc"
            }
        ],
        "foods_to_avoid": ["Highly processed foods", "Foods high in sugar"],
        "supplements": [
            {
                "name": "Vitamin D3",
                "benefit": "Supports the skin barrier",
                "dosage": "1000-2000 IU daily"
            }
        ]
    })
}

/// Sample configuration YAML for testing
pub const SAMPLE_CONFIG_YAML: &str = r#"
service:
  base_url: "http://10.0.2.2:8000"
  request_timeout_secs: 15
polling:
  initial_delay_ms: 10000
  interval_ms: 3000
  max_attempts: 20
logs:
  level: "debug"
"#;
