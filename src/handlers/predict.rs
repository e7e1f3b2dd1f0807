use crate::{
    error::AppError,
    image_utils::{bytes_to_data_url, is_image_content_type},
    metrics,
    models::appraisal::Appraisal,
    pipeline::{AppraisalPipeline, IdentifyInput},
};
use axum::{
    extract::{Multipart, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

const UPLOAD_REQUIRED: &str = "Upload an image file.";

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: AppraisalPipeline,
}

/// Body of a successful /predict response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub predicted_price: f64,
    pub currency: String,
    pub confidence: f64,
    pub brand: String,
    pub model: String,
    pub category: String,
    pub similar_listings: Vec<SimilarListing>,
    /// Present only when the listings search degraded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listings_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarListing {
    /// Zero-based position, as a string
    pub id: String,
    pub title: String,
    pub price_text: String,
    pub url: String,
    pub source: String,
}

impl From<Appraisal> for PredictResponse {
    fn from(appraisal: Appraisal) -> Self {
        let ident = appraisal.identification;
        let similar_listings = appraisal
            .listings
            .results
            .into_iter()
            .enumerate()
            .map(|(i, listing)| SimilarListing {
                id: i.to_string(),
                title: listing.record.title,
                price_text: listing.record.price_text,
                url: listing.record.url,
                source: listing.record.source,
            })
            .collect();

        Self {
            predicted_price: ident.estimated_market_value_usd,
            currency: "USD".to_string(),
            confidence: ident.confidence,
            brand: ident.brand,
            model: ident.model,
            category: ident.category,
            similar_listings,
            listings_error: appraisal.listings.error,
        }
    }
}

/// Read the multipart form. Rejects a non-image upload as soon as its
/// header is seen, before any body bytes are buffered.
async fn read_upload(mut multipart: Multipart) -> Result<IdentifyInput, AppError> {
    let mut input = IdentifyInput::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidUpload(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                if !is_image_content_type(&content_type) {
                    tracing::info!(content_type = %content_type, "Rejected non-image upload");
                    return Err(AppError::InvalidUpload(UPLOAD_REQUIRED.to_string()));
                }

                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidUpload(e.body_text()))?;

                tracing::debug!(bytes = bytes.len(), content_type = %content_type, "Received image");
                input.image_urls.push(bytes_to_data_url(&bytes, &content_type));
            }
            "description" | "classifier_hint" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::InvalidUpload(e.body_text()))?;
                if name == "description" {
                    input.description = Some(text);
                } else {
                    input.classifier_hint = Some(text);
                }
            }
            _ => {
                tracing::debug!(field = %name, "Ignoring unknown form field");
            }
        }
    }

    if input.image_urls.is_empty() {
        return Err(AppError::InvalidUpload(UPLOAD_REQUIRED.to_string()));
    }

    Ok(input)
}

async fn predict(state: &AppState, multipart: Multipart) -> Result<PredictResponse, AppError> {
    let input = read_upload(multipart).await?;
    let appraisal = state.pipeline.run(&input).await?;
    Ok(PredictResponse::from(appraisal))
}

/// Handle POST /predict
pub async fn handle_predict(State(state): State<AppState>, multipart: Multipart) -> Response {
    let request_id = Uuid::new_v4();
    let start = Instant::now();

    let result = predict(&state, multipart)
        .instrument(tracing::info_span!("predict", %request_id))
        .await;

    let response = match result {
        Ok(body) => {
            tracing::info!(
                request_id = %request_id,
                brand = %body.brand,
                listings = body.similar_listings.len(),
                duration_ms = start.elapsed().as_millis() as u64,
                "Prediction complete"
            );
            Json(body).into_response()
        }
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Prediction failed");
            e.into_response()
        }
    };

    metrics::record_request(response.status().as_u16());
    response
}
