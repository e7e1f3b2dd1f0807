use crate::{
    error::AppError,
    models::{
        appraisal::{Identification, Listing, ListingsPayload, ListingsReport},
        openai::{InputContent, ResponsesRequest, Tool},
    },
    provider_trait::ResponsesApi,
    schema::StructuredOutput,
};
use axum::http::StatusCode;
use thiserror::Error;

use super::{decode_structured, price::parse_price};

/// Why the listings search produced no data
#[derive(Debug, Error)]
pub enum SearchFailure {
    #[error("{0}")]
    Network(String),
    #[error("{0}")]
    RateLimited(String),
    #[error("status {status}: {message}")]
    Upstream { status: StatusCode, message: String },
    #[error("{0}")]
    MalformedOutput(String),
    #[error("{0}")]
    Refused(String),
    #[error("{0}")]
    Other(String),
}

impl SearchFailure {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "NetworkError",
            Self::RateLimited(_) => "RateLimited",
            Self::Upstream { .. } => "UpstreamError",
            Self::MalformedOutput(_) => "MalformedOutput",
            Self::Refused(_) => "Refused",
            Self::Other(_) => "Other",
        }
    }

    /// Value of `ListingsReport::error`
    pub fn describe(&self) -> String {
        format!("web_search unavailable or failed: {}: {}", self.kind(), self)
    }
}

impl From<AppError> for SearchFailure {
    fn from(err: AppError) -> Self {
        match err {
            AppError::HttpRequest(e) => Self::Network(e.to_string()),
            AppError::UpstreamError { status, message } if status == StatusCode::TOO_MANY_REQUESTS => {
                Self::RateLimited(message)
            }
            AppError::UpstreamError { status, message } => Self::Upstream { status, message },
            AppError::MalformedOutput(msg) => Self::MalformedOutput(msg),
            AppError::Refused(msg) => Self::Refused(msg),
            other => Self::Other(other.to_string()),
        }
    }
}

fn json_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

/// Build the web-search research request for an identified item
pub fn build_search_request(
    model: &str,
    ident: &Identification,
    queries: &[String],
    max_results: usize,
) -> ResponsesRequest {
    let prompt = format!(
        "You are a research agent.\n\
         Use web search to find comparable listings/sales for the identified luxury product.\n\
         Return up to 12 results (or fewer if low quality) with title, url, source, price_text, date_text if visible, notes.\n\
         Rules:\n\
         - Prefer official brand/retailer pages and major resale marketplaces.\n\
         - Avoid generic blogs unless they include an actual listing with price.\n\
         - Do not invent prices or dates; if missing, leave empty and explain in notes.\n\
         - Target up to {max_results} results.\n\n\
         Item:\nBrand: {brand}\nModel: {model}\nCategory: {category}\nAliases: {aliases}\n\n\
         Queries:\n{queries}",
        max_results = max_results,
        brand = ident.brand.trim(),
        model = ident.model.trim(),
        category = ident.category.trim(),
        aliases = json_list(&ident.aliases),
        queries = json_list(queries),
    );

    ResponsesRequest::user(model, vec![InputContent::text(prompt)])
        .with_tool(Tool::WebSearch)
        .with_format(ListingsPayload::response_format())
}

/// Annotate each record with its parsed price
pub fn annotate(payload: ListingsPayload) -> ListingsReport {
    let results = payload
        .results
        .into_iter()
        .map(|record| Listing {
            parsed_price: parse_price(&record.price_text),
            record,
        })
        .collect();

    ListingsReport {
        queries_used: payload.queries_used,
        results,
        error: None,
    }
}

async fn try_search(
    api: &dyn ResponsesApi,
    request: &ResponsesRequest,
) -> Result<ListingsPayload, SearchFailure> {
    let response = api.create_response(request).await?;
    Ok(decode_structured::<ListingsPayload>(&response)?)
}

/// Search for comparable listings. Never fails: on any provider error the
/// report carries the intended queries, no results and an error string.
pub async fn search_listings(
    api: &dyn ResponsesApi,
    model: &str,
    ident: &Identification,
    queries: Vec<String>,
    max_results: usize,
) -> ListingsReport {
    let request = build_search_request(model, ident, &queries, max_results);

    match try_search(api, &request).await {
        Ok(payload) => annotate(payload),
        Err(failure) => {
            tracing::warn!(
                provider = api.provider_type(),
                kind = failure.kind(),
                error = %failure,
                "Listings search degraded"
            );
            ListingsReport {
                queries_used: queries,
                results: Vec::new(),
                error: Some(failure.describe()),
            }
        }
    }
}
