//! Material composition parsing and projection onto a category vocabulary.

use std::collections::BTreeMap;

use crate::emissions::MaterialVocabulary;
use crate::errors::RecommendError;

/// Material name (trimmed, lowercased) to percentage share.
pub type ParsedComposition = BTreeMap<String, f64>;

/// Parses `"material:percentage"` segments separated by commas.
///
/// Each segment is split on its first colon. A material listed twice keeps
/// its last percentage. Empty input is rejected, as is any segment without a
/// colon or with a non-numeric or non-finite percentage. An empty material
/// name is kept as a key that no vocabulary contains. Percentages are not
/// required to sum to 100.
pub fn parse_composition(text: &str) -> Result<ParsedComposition, RecommendError> {
    if text.trim().is_empty() {
        return Err(RecommendError::malformed(text, "composition is empty"));
    }

    let mut parsed = ParsedComposition::new();
    for segment in text.split(',') {
        let Some((material, percentage)) = segment.split_once(':') else {
            return Err(RecommendError::malformed(segment, "expected `material:percentage`"));
        };

        let material = material.trim().to_lowercase();

        let percentage = percentage.trim().parse::<f64>().map_err(|_| {
            RecommendError::malformed(segment, format!("`{}` is not a number", percentage.trim()))
        })?;
        if !percentage.is_finite() {
            return Err(RecommendError::malformed(segment, "percentage must be finite"));
        }

        parsed.insert(material, percentage);
    }

    Ok(parsed)
}

/// Fraction (`percentage / 100`) per vocabulary entry, in vocabulary order.
///
/// Materials missing from the vocabulary are ignored; vocabulary entries
/// missing from the text contribute `0.0`. No clamping or normalisation.
pub fn vectorize(text: &str, vocabulary: &MaterialVocabulary) -> Result<Vec<f64>, RecommendError> {
    let parsed = parse_composition(text)?;
    Ok(vocabulary
        .iter()
        .map(|material| parsed.get(material).map_or(0.0, |percentage| percentage / 100.0))
        .collect())
}
