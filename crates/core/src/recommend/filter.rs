use serde::Serialize;

use crate::domain::product::Product;
use crate::errors::RecommendError;

use super::neighbors::Neighbor;

/// A neighbor that emits strictly less than the selected product.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GreenerAlternative {
    pub product: Product,
    /// Feature-space distance to the selected product.
    pub distance: f64,
    /// `selected.ghg_emission - product.ghg_emission`, always positive.
    pub emission_saving: f64,
}

/// Drops the self-match and every neighbor that is not strictly greener,
/// keeping the neighbor order (nearest first). An empty result is a normal
/// outcome, e.g. when the selected product is the category's lowest emitter.
pub fn filter_and_rank(
    neighbors: &[Neighbor],
    products: &[Product],
    query_row: usize,
) -> Result<Vec<GreenerAlternative>, RecommendError> {
    let rows = products.len();
    let selected =
        products.get(query_row).ok_or(RecommendError::IndexOutOfRange { index: query_row, rows })?;

    let mut alternatives = Vec::new();
    for neighbor in neighbors.iter().filter(|neighbor| neighbor.row != query_row) {
        let candidate = products
            .get(neighbor.row)
            .ok_or(RecommendError::IndexOutOfRange { index: neighbor.row, rows })?;
        if candidate.ghg_emission < selected.ghg_emission {
            alternatives.push(GreenerAlternative {
                product: candidate.clone(),
                distance: neighbor.distance,
                emission_saving: selected.ghg_emission - candidate.ghg_emission,
            });
        }
    }

    Ok(alternatives)
}

#[cfg(test)]
mod tests {
    use super::filter_and_rank;
    use crate::domain::product::{Product, ProductId};
    use crate::errors::RecommendError;
    use crate::recommend::neighbors::Neighbor;

    fn product(id: i64, emission: f64) -> Product {
        Product {
            id: ProductId(id),
            name: format!("Item {id}"),
            subcategory: "pan".to_string(),
            material_composition: "aluminum:100".to_string(),
            ghg_emission: emission,
        }
    }

    fn neighbors(rows: &[(usize, f64)]) -> Vec<Neighbor> {
        rows.iter().map(|(row, distance)| Neighbor { row: *row, distance: *distance }).collect()
    }

    #[test]
    fn self_match_and_higher_emitters_are_dropped() {
        let products = vec![product(1, 10.0), product(2, 12.0), product(3, 4.0), product(4, 9.9)];
        let found = neighbors(&[(0, 0.0), (1, 2.0), (3, 3.0), (2, 6.0)]);

        let alternatives = filter_and_rank(&found, &products, 0).expect("filter");

        let ids: Vec<i64> = alternatives.iter().map(|alt| alt.product.id.0).collect();
        assert_eq!(ids, vec![4, 3], "distance order is kept, not emission order");
        assert!(alternatives.iter().all(|alt| alt.product.ghg_emission < 10.0));
        assert!((alternatives[0].emission_saving - 0.1).abs() < 1e-9);
    }

    #[test]
    fn equal_emission_is_not_greener() {
        let products = vec![product(1, 5.0), product(2, 5.0)];
        let alternatives =
            filter_and_rank(&neighbors(&[(0, 0.0), (1, 0.5)]), &products, 0).expect("filter");
        assert!(alternatives.is_empty());
    }

    #[test]
    fn lowest_emitter_gets_no_alternatives() {
        let products = vec![product(1, 8.0), product(2, 1.0), product(3, 3.0)];
        let alternatives =
            filter_and_rank(&neighbors(&[(1, 0.0), (2, 2.0), (0, 7.0)]), &products, 1)
                .expect("filter");
        assert_eq!(alternatives, Vec::new());
    }

    #[test]
    fn neighbor_rows_must_exist() {
        let products = vec![product(1, 8.0)];
        let error = filter_and_rank(&neighbors(&[(0, 0.0), (5, 1.0)]), &products, 0)
            .expect_err("row 5 is not a product");
        assert_eq!(error, RecommendError::IndexOutOfRange { index: 5, rows: 1 });
    }
}
