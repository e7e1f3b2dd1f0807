use crate::error::AppError;
use crate::models::openai::{ResponsesRequest, ResponsesResponse};
use async_trait::async_trait;

/// Completion provider speaking the Responses protocol.
///
/// The pipeline only talks to this trait, so tests can script responses
/// without a network.
#[async_trait]
pub trait ResponsesApi: Send + Sync + 'static {
    /// Provider name used in logs and metrics
    fn provider_type(&self) -> &str;

    /// Send one request and return the decoded response.
    ///
    /// Non-success statuses are returned as `AppError::UpstreamError`.
    async fn create_response(
        &self,
        request: &ResponsesRequest,
    ) -> Result<ResponsesResponse, AppError>;
}
