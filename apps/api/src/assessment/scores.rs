//! Read-side views over the append-only trait score history.

use std::collections::BTreeMap;

use crate::models::assessment::TraitScoreRow;

/// The Big Five traits, in the order reports and trend views present them.
pub const BIG_FIVE_TRAITS: [&str; 5] = [
    "Openness",
    "Conscientiousness",
    "Extraversion",
    "Agreeableness",
    "Neuroticism",
];

/// Collapses a score history into the most recent score per trait.
///
/// Rows must be ordered oldest first, which is how every store returns them.
pub fn latest_by_trait(rows: &[TraitScoreRow]) -> BTreeMap<String, f64> {
    let mut latest = BTreeMap::new();
    for row in rows {
        latest.insert(row.trait_name.clone(), row.score);
    }
    latest
}

/// Rounds to two decimal places, ties away from zero (`f64::round` on the
/// value scaled by 100). A tie such as 0.125 becomes 0.13, where banker's
/// rounding would give 0.12.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
