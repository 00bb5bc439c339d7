//! Console rendering of recommendation results.

use crate::domain::product::sanitize_display_name;
use crate::recommend::Recommendation;

pub const NOT_FOUND_NOTICE: &str = "Selected item ID not found.";

/// Renders the operator-facing text report. Product names go through
/// [`sanitize_display_name`]; nothing else is altered.
pub fn render_text(recommendation: &Recommendation) -> String {
    let report = match recommendation {
        Recommendation::Found(report) => report,
        Recommendation::NotFound { .. } => return NOT_FOUND_NOTICE.to_string(),
    };

    let mut lines = vec![
        format!(
            "Selected Item: {} (GHG: {} kg CO2e)",
            sanitize_display_name(&report.selected.name),
            format_emission(report.selected.ghg_emission)
        ),
        String::new(),
        "Recommended Greener Alternatives:".to_string(),
        String::new(),
    ];

    if report.alternatives.is_empty() {
        lines.push("(none found among the nearest neighbors)".to_string());
    }
    for alternative in &report.alternatives {
        lines.push(format!(
            "{} | GHG: {} kg CO2e",
            sanitize_display_name(&alternative.product.name),
            format_emission(alternative.product.ghg_emission)
        ));
    }

    lines.join("\n")
}

/// Whole numbers keep one decimal place (`65.0`), others print as-is.
pub fn format_emission(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::{format_emission, render_text, NOT_FOUND_NOTICE};
    use crate::domain::category::Category;
    use crate::domain::product::{Product, ProductId};
    use crate::recommend::{GreenerAlternative, Recommendation, RecommendationReport};

    fn product(id: i64, name: &str, emission: f64) -> Product {
        Product {
            id: ProductId(id),
            name: name.to_string(),
            subcategory: "jacket".to_string(),
            material_composition: "leather:100".to_string(),
            ghg_emission: emission,
        }
    }

    #[test]
    fn report_lists_alternatives_with_sanitized_names() {
        let recommendation = Recommendation::Found(RecommendationReport {
            category: Category::new("clothing"),
            selected: product(1, "Leather Jacket", 65.0),
            k: 3,
            neighbors_considered: 3,
            alternatives: vec![GreenerAlternative {
                product: product(2, "Faux\u{2011}Leather Jacket", 15.8),
                distance: 49.2,
                emission_saving: 49.2,
            }],
        });

        let text = render_text(&recommendation);

        assert_eq!(
            text,
            "Selected Item: Leather Jacket (GHG: 65.0 kg CO2e)\n\n\
             Recommended Greener Alternatives:\n\n\
             Faux-Leather Jacket | GHG: 15.8 kg CO2e"
        );
    }

    #[test]
    fn not_found_renders_notice() {
        let recommendation = Recommendation::NotFound {
            category: Category::new("clothing"),
            selected_id: ProductId(404),
        };
        assert_eq!(render_text(&recommendation), NOT_FOUND_NOTICE);
    }

    #[test]
    fn emission_values_print_like_decimal_literals() {
        assert_eq!(format_emission(65.0), "65.0");
        assert_eq!(format_emission(6.15), "6.15");
        assert_eq!(format_emission(2.3), "2.3");
    }
}
