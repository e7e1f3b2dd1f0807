use crate::models::appraisal::Identification;

/// Suggested queries kept from the identification step
pub const MAX_SUGGESTED_QUERIES: usize = 8;
/// Upper bound on the final query list
pub const MAX_QUERIES: usize = 10;

/// Build the search query list for an identified item.
///
/// Up to eight model-suggested queries come first, then fallbacks built from
/// brand, model, category and the first alias. Blank entries are dropped and
/// the list is capped at [`MAX_QUERIES`].
pub fn build_search_queries(ident: &Identification) -> Vec<String> {
    let brand = ident.brand.trim();
    let model = ident.model.trim();
    let category = ident.category.trim();

    let mut fallbacks = vec![
        format!("{} \"{}\" price", brand, model),
        format!("{} \"{}\" {} listing", brand, model, category),
    ];
    if let Some(alias) = ident.aliases.first() {
        fallbacks.push(format!("{} \"{}\" {} listing", brand, alias, category));
    }

    ident
        .suggested_queries
        .iter()
        .take(MAX_SUGGESTED_QUERIES)
        .cloned()
        .chain(fallbacks)
        .filter(|query| !query.trim().is_empty())
        .take(MAX_QUERIES)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::appraisal::{ItemAttributes, PriceRange};

    fn ident(suggested: &[&str], aliases: &[&str]) -> Identification {
        Identification {
            brand: " Chanel ".to_string(),
            model: "Classic Flap".to_string(),
            category: "handbag".to_string(),
            aliases: aliases.iter().map(|s| s.to_string()).collect(),
            confidence: 0.82,
            attributes: ItemAttributes {
                primary_color: "black".to_string(),
                material: "caviar leather".to_string(),
                metal_finish: "gold".to_string(),
                closure: "CC turn-lock".to_string(),
                notable_markings: "not visible".to_string(),
            },
            typical_price_range_usd: PriceRange {
                low: 4000.0,
                high: 6000.0,
            },
            estimated_market_value_usd: 4800.0,
            suggested_queries: suggested.iter().map(|s| s.to_string()).collect(),
            rationale: "quilted leather with CC lock".to_string(),
        }
    }

    #[test]
    fn test_fallbacks_only() {
        let queries = build_search_queries(&ident(&[], &[]));
        assert_eq!(
            queries,
            vec![
                "Chanel \"Classic Flap\" price".to_string(),
                "Chanel \"Classic Flap\" handbag listing".to_string(),
            ]
        );
    }

    #[test]
    fn test_alias_fallback_uses_first_alias() {
        let queries = build_search_queries(&ident(&["chanel flap bag"], &["11.12", "Timeless"]));
        assert_eq!(queries.len(), 4);
        assert_eq!(queries[0], "chanel flap bag");
        assert_eq!(queries[3], "Chanel \"11.12\" handbag listing");
    }

    #[test]
    fn test_blank_suggestions_dropped() {
        let queries = build_search_queries(&ident(&["", "  ", "chanel medium flap"], &[]));
        assert_eq!(queries[0], "chanel medium flap");
        assert!(queries.iter().all(|q| !q.trim().is_empty()));
    }

    #[test]
    fn test_capped_at_ten_with_suggestions_first() {
        let suggested: Vec<String> = (0..12).map(|i| format!("query {}", i)).collect();
        let refs: Vec<&str> = suggested.iter().map(|s| s.as_str()).collect();
        let queries = build_search_queries(&ident(&refs, &["Timeless"]));

        assert_eq!(queries.len(), MAX_QUERIES);
        assert_eq!(queries[7], "query 7");
        // Only eight suggestions survive, leaving room for two fallbacks
        assert_eq!(queries[8], "Chanel \"Classic Flap\" price");
        assert_eq!(queries[9], "Chanel \"Classic Flap\" handbag listing");
    }

    #[test]
    fn test_deterministic() {
        let item = ident(&["a", "b"], &["Timeless"]);
        assert_eq!(build_search_queries(&item), build_search_queries(&item));
    }
}
