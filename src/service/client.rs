use super::types::*;
use crate::{Error, Result, config::ServiceConfig, image::ImageAsset};
use async_trait::async_trait;
use reqwest::{
    StatusCode,
    multipart::{Form, Part},
};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Submits the image for analysis. Never retried.
    async fn upload(&self, asset: ImageAsset) -> Result<UploadAck>;

    /// Issues one status request for a running job.
    async fn status(&self, handle: &JobHandle) -> Result<JobStatus>;

    async fn recommend(&self, condition: &str, allergies: &[String]) -> Result<RecommendationSet>;

    async fn health(&self) -> Result<String>;
}

pub struct HttpInferenceClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpInferenceClient {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.bytes().await?;
        parse_body(status, &body)
    }
}

#[async_trait]
impl InferenceClient for HttpInferenceClient {
    async fn upload(&self, asset: ImageAsset) -> Result<UploadAck> {
        let url = self.endpoint("/upload");
        debug!(
            "Uploading '{}' ({}, {} bytes) to {}",
            asset.filename,
            asset.mime_type,
            asset.bytes.len(),
            url
        );

        let part = Part::bytes(asset.bytes)
            .file_name(asset.filename)
            .mime_str(&asset.mime_type)
            .map_err(|e| Error::protocol(format!("invalid image type '{}': {}", asset.mime_type, e)))?;
        let form = Form::new().part("image", part);

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await?;

        let body: UploadResponse = Self::read_json(response).await?;
        let ack = UploadAck::try_from(body)?;

        debug!("Upload acknowledged, job handle: {}", ack.handle);
        Ok(ack)
    }

    async fn status(&self, handle: &JobHandle) -> Result<JobStatus> {
        let url = self.endpoint(&handle.status_path());
        debug!("Checking job status at {}", url);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        // Some deployments answer an unknown job with 404 and a regular status body.
        if !status.is_success() {
            if let Ok(reported) = serde_json::from_slice::<StatusResponse>(&body) {
                debug!("Status {} carried a job status body", status);
                return JobStatus::try_from(reported);
            }
        }

        let body: StatusResponse = parse_body(status, &body)?;
        JobStatus::try_from(body)
    }

    async fn recommend(&self, condition: &str, allergies: &[String]) -> Result<RecommendationSet> {
        let condition = condition.trim();
        if condition.is_empty() {
            return Err(Error::protocol(
                "cannot request recommendations without a condition",
            ));
        }

        let url = self.endpoint("/recommend");
        debug!(
            "Requesting recommendations for '{}' with {} allergies",
            condition,
            allergies.len()
        );

        let response = self
            .client
            .post(&url)
            .json(&RecommendRequest {
                skin_disease: condition,
                allergies,
            })
            .send()
            .await?;

        let body: RecommendResponse = Self::read_json(response).await?;
        let set = RecommendationSet::try_from(body)?;
        debug!(
            "Received {} healthy foods, {} foods to avoid, {} supplements",
            set.healthy_foods.len(),
            set.foods_to_avoid.len(),
            set.supplements.len()
        );
        Ok(set)
    }

    async fn health(&self) -> Result<String> {
        let response = self.client.get(self.endpoint("/health")).send().await?;
        let body: HealthResponse = Self::read_json(response).await?;
        Ok(body.status)
    }
}

fn parse_body<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T> {
    if !status.is_success() {
        let text = String::from_utf8_lossy(body);
        warn!("Service responded with {}: {}", status, text.trim());
        return Err(Error::server(status.as_u16(), error_message(&text, status)));
    }

    serde_json::from_slice(body)
        .map_err(|e| Error::protocol(format!("unexpected response body from service: {}", e)))
}

/// Picks the most useful message out of an error response body.
fn error_message(body: &str, status: StatusCode) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "message", "detail"] {
            if let Some(message) = value.get(key).and_then(|v| v.as_str()) {
                return message.to_string();
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn create_test_config(base_url: &str) -> ServiceConfig {
        ServiceConfig {
            base_url: base_url.to_string(),
            request_timeout_secs: 5,
            connect_timeout_secs: 5,
        }
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let client = HttpInferenceClient::new(&create_test_config("http://10.0.0.2:8000/")).unwrap();
        assert_eq!(client.base_url(), "http://10.0.0.2:8000");
        assert_eq!(client.endpoint("/upload"), "http://10.0.0.2:8000/upload");
        assert_eq!(client.endpoint("status/abc"), "http://10.0.0.2:8000/status/abc");
        assert_eq!(
            client.endpoint("https://jobs.example.com/status/abc"),
            "https://jobs.example.com/status/abc"
        );
    }

    #[test]
    fn test_error_message_from_json_body() {
        assert_eq!(
            error_message(r#"{"error": "No image uploaded"}"#, StatusCode::BAD_REQUEST),
            "No image uploaded"
        );
    }

    #[test]
    fn test_error_message_from_plain_body() {
        assert_eq!(
            error_message("model overloaded\n", StatusCode::INTERNAL_SERVER_ERROR),
            "model overloaded"
        );
    }

    #[test]
    fn test_error_message_empty_body_uses_reason() {
        assert_eq!(
            error_message("", StatusCode::BAD_GATEWAY),
            "Bad Gateway"
        );
    }
}
