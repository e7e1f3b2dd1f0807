//! Two-stage appraisal: identify the item, then search comparable listings.
//!
//! The second call depends on the first call's output, so the stages always
//! run sequentially. Only the search stage recovers from provider failures.

pub mod identify;
pub mod listings;
pub mod price;
pub mod queries;

use crate::{
    config::OpenAiConfig,
    error::AppError,
    metrics,
    models::{
        appraisal::{Appraisal, Identification, ListingsReport},
        openai::ResponsesResponse,
    },
    provider_trait::ResponsesApi,
    schema::StructuredOutput,
};
use std::sync::Arc;
use std::time::Instant;

pub use identify::IdentifyInput;

/// Decode a structured-output body, treating refusals and empty output as errors
pub fn decode_structured<T: StructuredOutput>(response: &ResponsesResponse) -> Result<T, AppError> {
    let text = response.output_text();
    if text.trim().is_empty() {
        return Err(match response.refusal() {
            Some(refusal) => AppError::Refused(refusal.to_string()),
            None => AppError::MalformedOutput(format!("{} response had no output text", T::NAME)),
        });
    }

    serde_json::from_str(&text).map_err(|e| AppError::MalformedOutput(format!("{}: {}", T::NAME, e)))
}

/// Pipeline handle: provider plus the model names for each stage
#[derive(Clone)]
pub struct AppraisalPipeline {
    api: Arc<dyn ResponsesApi>,
    identification_model: String,
    search_model: String,
    max_results: usize,
}

impl AppraisalPipeline {
    pub fn new(api: Arc<dyn ResponsesApi>, config: &OpenAiConfig) -> Self {
        Self {
            api,
            identification_model: config.identification_model.clone(),
            search_model: config.search_model.clone(),
            max_results: config.max_results,
        }
    }

    /// Identify the item in the supplied images. Errors propagate.
    pub async fn identify(&self, input: &IdentifyInput) -> Result<Identification, AppError> {
        let request = identify::build_identify_request(&self.identification_model, input);

        let start = Instant::now();
        let result = self.api.create_response(&request).await;
        metrics::record_upstream_duration("identify", start.elapsed());

        let ident: Identification = decode_structured(&result?)?;

        tracing::info!(
            brand = %ident.brand,
            model = %ident.model,
            category = %ident.category,
            confidence = ident.confidence,
            "Item identified"
        );

        Ok(ident)
    }

    /// Search comparable listings for `ident`. Never fails.
    pub async fn search_listings(&self, ident: &Identification) -> ListingsReport {
        let queries = queries::build_search_queries(ident);

        let start = Instant::now();
        let report = listings::search_listings(
            self.api.as_ref(),
            &self.search_model,
            ident,
            queries,
            self.max_results,
        )
        .await;
        metrics::record_upstream_duration("search", start.elapsed());
        metrics::record_listings_search(if report.is_degraded() { "degraded" } else { "success" });

        tracing::info!(
            listings = report.results.len(),
            queries = report.queries_used.len(),
            degraded = report.is_degraded(),
            "Listings search finished"
        );

        report
    }

    /// Run both stages in order
    pub async fn run(&self, input: &IdentifyInput) -> Result<Appraisal, AppError> {
        let identification = self.identify(input).await?;
        let listings = self.search_listings(&identification).await;

        Ok(Appraisal {
            identification,
            listings,
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted provider for pipeline and handler tests

    use super::*;
    use crate::models::openai::ResponsesRequest;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    pub struct ScriptedApi {
        replies: Mutex<VecDeque<Result<Value, AppError>>>,
        pub requests: Mutex<Vec<ResponsesRequest>>,
    }

    impl ScriptedApi {
        pub fn new(replies: Vec<Result<Value, AppError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn call_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    /// Wrap a structured payload the way the provider returns it
    pub fn message(payload: &Value) -> Value {
        json!({
            "id": "resp_test",
            "model": "gpt-4.1-mini",
            "output": [{
                "type": "message",
                "content": [{"type": "output_text", "text": payload.to_string()}]
            }]
        })
    }

    #[async_trait]
    impl ResponsesApi for ScriptedApi {
        fn provider_type(&self) -> &str {
            "scripted"
        }

        async fn create_response(
            &self,
            request: &ResponsesRequest,
        ) -> Result<ResponsesResponse, AppError> {
            self.requests.lock().unwrap().push(request.clone());
            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(AppError::InternalError("no scripted reply".to_string())))?;
            Ok(serde_json::from_value(reply)?)
        }
    }

    pub fn identification_json() -> Value {
        json!({
            "brand": "Chanel",
            "model": "Classic Flap",
            "category": "handbag",
            "aliases": ["11.12"],
            "confidence": 0.82,
            "attributes": {
                "primary_color": "black",
                "material": "caviar leather",
                "metal_finish": "gold",
                "closure": "CC turn-lock",
                "notable_markings": "not visible"
            },
            "typical_price_range_usd": {"low": 4000, "high": 6500},
            "estimated_market_value_usd": 4800,
            "suggested_queries": ["chanel classic flap medium caviar"],
            "rationale": "Diamond quilting and CC turn-lock."
        })
    }

    pub fn listings_json() -> Value {
        json!({
            "queries_used": ["chanel classic flap medium caviar"],
            "results": [
                {
                    "title": "Chanel Medium Classic Flap Black Caviar",
                    "url": "https://example.com/a",
                    "source": "Example Resale",
                    "price_text": "$5,150",
                    "date_text": "2024-05",
                    "notes": ""
                },
                {
                    "title": "Chanel 11.12 Flap",
                    "url": "https://example.com/b",
                    "source": "Example Auctions",
                    "price_text": "£3,900.00",
                    "date_text": "",
                    "notes": "hammer price"
                }
            ]
        })
    }
}
