//! Records exchanged with the model and returned by the pipeline.
//!
//! Payloads the model produces deserialize with `deny_unknown_fields`, the
//! inbound mirror of `additionalProperties: false` in [`crate::schema`].

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Structured identification of a single item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Identification {
    pub brand: String,
    pub model: String,
    pub category: String,
    pub aliases: Vec<String>,
    /// Provider-assigned, no enforced range
    pub confidence: f64,
    pub attributes: ItemAttributes,
    pub typical_price_range_usd: PriceRange,
    pub estimated_market_value_usd: f64,
    pub suggested_queries: Vec<String>,
    pub rationale: String,
}

/// Visible attributes. "not visible" is a valid value for each.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ItemAttributes {
    pub primary_color: String,
    pub material: String,
    pub metal_finish: String,
    pub closure: String,
    pub notable_markings: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PriceRange {
    pub low: f64,
    pub high: f64,
}

/// Listing exactly as the search model returns it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListingRecord {
    pub title: String,
    pub url: String,
    pub source: String,
    pub price_text: String,
    pub date_text: String,
    pub notes: String,
}

/// Search model output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListingsPayload {
    pub queries_used: Vec<String>,
    pub results: Vec<ListingRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
    Cad,
    Aud,
    Jpy,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Cad => "CAD",
            Currency::Aud => "AUD",
            Currency::Jpy => "JPY",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Price recovered from free-form `price_text`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParsedPrice {
    pub currency: Currency,
    pub amount: f64,
}

/// A listing annotated with its parsed price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    #[serde(flatten)]
    pub record: ListingRecord,
    pub parsed_price: Option<ParsedPrice>,
}

/// Outcome of the listings search step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingsReport {
    pub queries_used: Vec<String>,
    pub results: Vec<Listing>,
    /// Set only when the search degraded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ListingsReport {
    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

/// Combined pipeline output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appraisal {
    pub identification: Identification,
    pub listings: ListingsReport,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identification_rejects_extra_fields() {
        let value = json!({
            "brand": "Chanel",
            "model": "Classic Flap",
            "category": "handbag",
            "aliases": [],
            "confidence": 0.8,
            "attributes": {
                "primary_color": "black",
                "material": "lambskin",
                "metal_finish": "gold",
                "closure": "CC turn-lock",
                "notable_markings": "not visible"
            },
            "typical_price_range_usd": {"low": 4000, "high": 6000},
            "estimated_market_value_usd": 4800,
            "suggested_queries": [],
            "rationale": "quilting",
            "serial": "12345678"
        });

        assert!(serde_json::from_value::<Identification>(value).is_err());
    }

    #[test]
    fn test_listing_flattens_record() {
        let listing = Listing {
            record: ListingRecord {
                title: "Chanel Classic Flap Medium".to_string(),
                url: "https://example.com/1".to_string(),
                source: "Example Resale".to_string(),
                price_text: "$5,200".to_string(),
                date_text: "".to_string(),
                notes: "".to_string(),
            },
            parsed_price: Some(ParsedPrice {
                currency: Currency::Usd,
                amount: 5200.0,
            }),
        };

        let value = serde_json::to_value(&listing).unwrap();
        assert_eq!(value["title"], "Chanel Classic Flap Medium");
        assert_eq!(value["parsed_price"]["currency"], "USD");
        assert_eq!(value["parsed_price"]["amount"], 5200.0);
    }

    #[test]
    fn test_report_error_omitted_when_absent() {
        let report = ListingsReport {
            queries_used: vec!["q".to_string()],
            results: vec![],
            error: None,
        };
        let value = serde_json::to_value(&report).unwrap();
        assert!(value.get("error").is_none());
        assert!(!report.is_degraded());
    }
}
