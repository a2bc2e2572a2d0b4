//! Keyword scoring and suggestion selection.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::category::ExpenseCategory;

/// Categories must score strictly above this to be suggested.
pub const MIN_CONFIDENCE: Decimal = dec!(0.15);

/// Confidence of the fallback suggestion.
pub const FALLBACK_CONFIDENCE: Decimal = dec!(0.2);

/// Description of the fallback suggestion.
pub const FALLBACK_DESCRIPTION: &str = "Automatic classification - review manually";

/// Maximum number of suggestions returned.
pub const MAX_SUGGESTIONS: usize = 3;

const MULTI_HIT_BOOST: Decimal = dec!(1.2);
const DESCRIPTION_HIT_BOOST: Decimal = dec!(1.5);
const FISCAL_TEXT_ONLY_PENALTY: Decimal = dec!(0.1);
const FISCAL_PRODUCT_PENALTY: Decimal = dec!(0.2);
const FULL_PERCENTAGE: Decimal = dec!(100.00);

/// Terms suggesting a description lists goods rather than taxes.
const PRODUCT_INDICATORS: &[&str] = &[
    "litros",
    "unidade",
    "pc",
    "kg",
    "ton",
    "m",
    "cm",
    "mm",
    "quantidade",
    "valor unitário",
    "código",
    "ncm",
    "l de",
    "granel",
    "tubo",
    "kit",
    "cabo",
    "parafuso",
    "din",
];

/// A suggested expense classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationSuggestion {
    /// Suggested category.
    pub category: ExpenseCategory,
    /// Label followed by the first matched keywords.
    pub description: String,
    /// Share of the invoice assigned to the category.
    pub percentage: Decimal,
    /// Heuristic confidence in `[0, 1]`.
    pub confidence: Decimal,
}

/// Lowercased inputs, computed once per classification.
struct Haystack {
    description: String,
    text: String,
}

impl Haystack {
    fn new(description: &str, text: &str) -> Self {
        Self {
            description: description.to_lowercase(),
            text: text.to_lowercase(),
        }
    }

    fn score(&self, category: ExpenseCategory) -> Decimal {
        let keywords = category.keywords();
        if keywords.is_empty() {
            return Decimal::ZERO;
        }

        let mut description_hits = 0usize;
        let mut text_hits = 0usize;
        for keyword in keywords {
            if self.description.contains(keyword) {
                description_hits += 1;
            } else if self.text.contains(keyword) {
                text_hits += 1;
            }
        }

        let found = description_hits + text_hits;
        if found == 0 {
            return Decimal::ZERO;
        }

        let mut confidence = Decimal::from(found) / Decimal::from(keywords.len());
        if found > 1 {
            confidence *= MULTI_HIT_BOOST;
        }
        if description_hits > 0 {
            confidence *= DESCRIPTION_HIT_BOOST;
        }

        if category.is_fiscal() {
            if description_hits == 0 {
                confidence *= FISCAL_TEXT_ONLY_PENALTY;
            } else if self.describes_products() {
                confidence *= FISCAL_PRODUCT_PENALTY;
            }
        }

        confidence.min(Decimal::ONE)
    }

    fn describes_products(&self) -> bool {
        PRODUCT_INDICATORS
            .iter()
            .any(|indicator| self.description.contains(indicator))
    }

    fn matched_keywords(&self, category: ExpenseCategory) -> Vec<&'static str> {
        category
            .keywords()
            .iter()
            .copied()
            .filter(|k| self.text.contains(k) || self.description.contains(k))
            .take(MAX_SUGGESTIONS)
            .collect()
    }
}

/// Scores a single category against a product description and invoice text.
#[must_use]
pub fn score_category(category: ExpenseCategory, description: &str, text: &str) -> Decimal {
    Haystack::new(description, text).score(category)
}

/// Suggests up to three categories, highest confidence first.
///
/// Never returns an empty list: when nothing scores above
/// [`MIN_CONFIDENCE`] a single administrative suggestion is returned.
#[must_use]
pub fn classify(description: &str, text: &str) -> Vec<ClassificationSuggestion> {
    let haystack = Haystack::new(description, text);

    let scored: Vec<(ExpenseCategory, Decimal)> = ExpenseCategory::ALL
        .into_iter()
        .map(|category| {
            let confidence = haystack.score(category);
            debug!(category = %category, confidence = %confidence, "Category scored");
            (category, confidence)
        })
        .collect();

    let ranked = rank(scored);
    if ranked.is_empty() {
        return vec![ClassificationSuggestion {
            category: ExpenseCategory::Administrative,
            description: FALLBACK_DESCRIPTION.to_string(),
            percentage: FULL_PERCENTAGE,
            confidence: FALLBACK_CONFIDENCE,
        }];
    }

    ranked
        .into_iter()
        .map(|(category, confidence)| ClassificationSuggestion {
            category,
            description: format!(
                "{} - {}",
                category.label(),
                haystack.matched_keywords(category).join(", ")
            ),
            percentage: FULL_PERCENTAGE,
            confidence: confidence.round_dp(4),
        })
        .collect()
}

/// Keeps scores above the threshold, best first, at most [`MAX_SUGGESTIONS`].
///
/// Ordering uses the unrounded scores; ties keep catalog order.
fn rank(mut scored: Vec<(ExpenseCategory, Decimal)>) -> Vec<(ExpenseCategory, Decimal)> {
    scored.retain(|(_, confidence)| *confidence > MIN_CONFIDENCE);
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.truncate(MAX_SUGGESTIONS);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_keywords_scores_zero() {
        assert_eq!(
            score_category(ExpenseCategory::HumanResources, "xyz", "qwerty"),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_single_description_hit() {
        // 1 / 19 * 1.5
        let score = score_category(ExpenseCategory::HumanResources, "diarista", "");
        assert_eq!(score, Decimal::ONE / Decimal::from(19) * dec!(1.5));
    }

    #[test]
    fn test_text_hits_are_not_boosted_by_description() {
        // "frete" and "silo" only in text: 2 / 19 * 1.2
        let score = score_category(ExpenseCategory::OperationalServices, "", "frete silo");
        assert_eq!(score, Decimal::from(2) / Decimal::from(19) * dec!(1.2));
    }

    #[test]
    fn test_fiscal_penalty_without_description_hit() {
        // "icms" and "ipi" in text only: 2 / 16 * 1.2 * 0.1
        let score = score_category(ExpenseCategory::TaxesFees, "", "icms ipi");
        assert_eq!(score, dec!(0.015));
    }

    #[test]
    fn test_fiscal_penalty_for_product_description() {
        // 1 / 16 * 1.5
        let plain = score_category(ExpenseCategory::TaxesFees, "taxa", "");
        assert_eq!(plain, dec!(0.09375));

        let with_product = score_category(ExpenseCategory::TaxesFees, "taxa 10 kg", "");
        assert_eq!(with_product, dec!(0.01875));
    }

    #[test]
    fn test_confidence_is_clamped() {
        let all = ExpenseCategory::Administrative.keywords().join(" ");
        assert_eq!(
            score_category(ExpenseCategory::Administrative, &all, &all),
            Decimal::ONE
        );
    }

    #[test]
    fn test_fallback_suggestion() {
        let suggestions = classify("produto genérico", "nada relevante");
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].category, ExpenseCategory::Administrative);
        assert_eq!(suggestions[0].confidence, dec!(0.2));
        assert_eq!(suggestions[0].description, FALLBACK_DESCRIPTION);
        assert_eq!(suggestions[0].percentage, dec!(100));
    }

    #[test]
    fn test_diesel_invoice_is_maintenance() {
        let description = "Óleo Diesel S10 aditivado 500 litros";
        let suggestions = classify(description, "Nota fiscal de combustível. ICMS incluso.");

        let top = &suggestions[0];
        assert_eq!(top.category, ExpenseCategory::MaintenanceOperation);
        assert_eq!(top.description, "MANUTENÇÃO E OPERAÇÃO - combustível, diesel, óleo");
        assert!(top.confidence > MIN_CONFIDENCE);
        assert!(
            suggestions
                .iter()
                .all(|s| s.category != ExpenseCategory::TaxesFees)
        );
    }

    #[test]
    fn test_results_sorted_and_limited() {
        let text = [
            ExpenseCategory::AgriculturalInputs,
            ExpenseCategory::HumanResources,
            ExpenseCategory::OperationalServices,
            ExpenseCategory::Administrative,
        ]
        .iter()
        .flat_map(|c| c.keywords().iter().copied())
        .collect::<Vec<_>>()
        .join(" ");

        let suggestions = classify(&text, "");
        assert_eq!(suggestions.len(), MAX_SUGGESTIONS);
        assert!(
            suggestions
                .windows(2)
                .all(|w| w[0].confidence >= w[1].confidence)
        );
    }

    #[test]
    fn test_repeated_keywords_count_twice() {
        // 6 hits (three fasteners, each listed twice) / 46 * 1.2 * 1.5
        let score = score_category(
            ExpenseCategory::MaintenanceOperation,
            "parafuso porca arruela",
            "",
        );
        assert_eq!(score, Decimal::from(6) / Decimal::from(46) * dec!(1.2) * dec!(1.5));

        let suggestions = classify("Parafuso, porca e arruela", "");
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].category, ExpenseCategory::MaintenanceOperation);
        assert_eq!(suggestions[0].confidence, dec!(0.2348));
        assert_eq!(
            suggestions[0].description,
            "MANUTENÇÃO E OPERAÇÃO - parafuso, porca, arruela"
        );
    }

    #[test]
    fn test_rank_orders_on_unrounded_scores() {
        let ranked = rank(vec![
            (ExpenseCategory::AgriculturalInputs, dec!(0.30001)),
            (ExpenseCategory::MaintenanceOperation, dec!(0.30004)),
            (ExpenseCategory::HumanResources, dec!(0.15)),
            (ExpenseCategory::Administrative, dec!(0.2)),
            (ExpenseCategory::Investments, dec!(0.16)),
        ]);
        assert_eq!(
            ranked,
            vec![
                (ExpenseCategory::MaintenanceOperation, dec!(0.30004)),
                (ExpenseCategory::AgriculturalInputs, dec!(0.30001)),
                (ExpenseCategory::Administrative, dec!(0.2)),
            ]
        );
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let upper = score_category(ExpenseCategory::AgriculturalInputs, "SEMENTES DE SOJA", "");
        let lower = score_category(ExpenseCategory::AgriculturalInputs, "sementes de soja", "");
        assert_eq!(upper, lower);
        assert!(upper > Decimal::ZERO);
    }
}
