#![allow(dead_code)]

use relay_service::config::{LimitsConfig, ObservabilityConfig, RelayConfig, UpstreamConfig};
use relay_service::services::providers::mock::MockProvider;
use relay_service::startup::Application;
use secrecy::Secret;
use service_core::config::Config as CoreConfig;
use std::sync::Arc;

pub fn test_config(max_upload_bytes: usize) -> RelayConfig {
    RelayConfig {
        common: CoreConfig {
            port: 0,
            ..Default::default()
        },
        upstream: UpstreamConfig {
            api_key: Secret::new("test-key".to_string()),
            api_base: "http://127.0.0.1:1".to_string(),
            text_model: "gemini-2.5-flash".to_string(),
            image_model: "imagen-3.0-generate-002".to_string(),
            timeout: None,
        },
        limits: LimitsConfig { max_upload_bytes },
        static_dir: None,
        observability: ObservabilityConfig {
            log_level: "warn".to_string(),
            otlp_endpoint: None,
        },
    }
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub provider: Arc<MockProvider>,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(MockProvider::echo(), 1024).await
    }

    pub async fn spawn_with(provider: MockProvider, max_upload_bytes: usize) -> Self {
        let provider = Arc::new(provider);
        let app = Application::build_with_provider(test_config(max_upload_bytes), provider.clone())
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to accept connections
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            provider,
            client,
        }
    }

    pub async fn post_prompt(&self, path: &str, prompt: &str) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .json(&serde_json::json!({ "prompt": prompt }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn upload(&self, filename: &str, mime: &str, bytes: Vec<u8>) -> reqwest::Response {
        let form = reqwest::multipart::Form::new().part(
            "file",
            reqwest::multipart::Part::bytes(bytes)
                .file_name(filename.to_string())
                .mime_str(mime)
                .unwrap(),
        );

        self.client
            .post(format!("{}/api/upload", self.address))
            .multipart(form)
            .send()
            .await
            .expect("Failed to execute request")
    }
}
