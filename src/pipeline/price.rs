use crate::models::appraisal::{Currency, ParsedPrice};
use regex::Regex;
use std::sync::LazyLock;

const AMOUNT: &str = r"([0-9][0-9,]*(?:\.[0-9]{2})?)";

/// Checked in order; the first pattern that matches anywhere wins.
static PRICE_PATTERNS: LazyLock<Vec<(Regex, Currency)>> = LazyLock::new(|| {
    let patterns = [
        (r"(USD|US\s?\$|\$)\s*", AMOUNT, Currency::Usd),
        (r"(EUR|€)\s*", AMOUNT, Currency::Eur),
        (r"(GBP|£)\s*", AMOUNT, Currency::Gbp),
        (r"(CAD|C\$)\s*", AMOUNT, Currency::Cad),
        (r"(AUD|A\$)\s*", AMOUNT, Currency::Aud),
        // No fractional yen
        (r"(JPY|¥)\s*", r"([0-9][0-9,]*)", Currency::Jpy),
    ];

    patterns
        .into_iter()
        .map(|(marker, amount, currency)| {
            let pattern = format!("(?i){}{}", marker, amount);
            (Regex::new(&pattern).unwrap(), currency)
        })
        .collect()
});

/// Recover a currency and amount from free-form listing text.
///
/// Only western grouping is understood: `"€2.000,00"` reads as EUR 2.0.
pub fn parse_price(price_text: &str) -> Option<ParsedPrice> {
    if price_text.is_empty() {
        return None;
    }

    PRICE_PATTERNS.iter().find_map(|(regex, currency)| {
        let captures = regex.captures(price_text)?;
        let amount = captures.get(2)?.as_str().replace(',', "").parse::<f64>().ok()?;
        Some(ParsedPrice {
            currency: *currency,
            amount,
        })
    })
}
