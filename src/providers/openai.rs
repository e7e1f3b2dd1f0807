use crate::{
    config::OpenAiConfig,
    error::AppError,
    models::openai::{ResponsesRequest, ResponsesResponse},
    provider_trait::ResponsesApi,
};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// OpenAI Responses API client
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    timeout: Option<Duration>,
}

impl OpenAiClient {
    pub fn new(client: Client, config: &OpenAiConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            timeout: config.timeout_seconds.map(Duration::from_secs),
        }
    }

    fn responses_url(&self) -> String {
        format!("{}/responses", self.base_url)
    }
}

#[async_trait]
impl ResponsesApi for OpenAiClient {
    fn provider_type(&self) -> &str {
        "openai"
    }

    async fn create_response(
        &self,
        request: &ResponsesRequest,
    ) -> Result<ResponsesResponse, AppError> {
        let mut builder = self
            .client
            .post(self.responses_url())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;

        // Check for HTTP errors
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::UpstreamError {
                status,
                message: error_text,
            });
        }

        let body = response.bytes().await?;
        let decoded: ResponsesResponse = serde_json::from_slice(&body)?;

        let usage = decoded.usage.as_ref();
        tracing::debug!(
            response_id = %decoded.id,
            model = %decoded.model,
            status = ?decoded.status,
            input_tokens = usage.map(|u| u.input_tokens),
            output_tokens = usage.map(|u| u.output_tokens),
            total_tokens = usage.map(|u| u.total_tokens),
            output_items = decoded.output.len(),
            "Received response"
        );

        Ok(decoded)
    }
}
