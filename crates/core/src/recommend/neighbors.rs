//! Brute-force Euclidean k-nearest-neighbor search over a feature matrix.

use std::cmp::Ordering;

use serde::Serialize;

use crate::errors::RecommendError;

use super::features::FeatureMatrix;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Neighbor {
    pub row: usize,
    pub distance: f64,
}

/// Index over the rows of one feature matrix. Fitting only borrows the
/// matrix; every query scans all rows.
#[derive(Clone, Copy, Debug)]
pub struct NeighborIndex<'a> {
    matrix: &'a FeatureMatrix,
}

impl<'a> NeighborIndex<'a> {
    pub fn fit(matrix: &'a FeatureMatrix) -> Result<Self, RecommendError> {
        if matrix.is_empty() {
            return Err(RecommendError::InsufficientData { requested: 1, available: 0 });
        }
        Ok(Self { matrix })
    }

    pub fn len(&self) -> usize {
        self.matrix.rows()
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }

    /// The `k + 1` rows nearest to `query_row`, nearest first, clamped to the
    /// number of indexed rows.
    ///
    /// The query row itself is part of the result at distance `0.0`; callers
    /// drop it. Ties are ordered query row first, then by row index, so the
    /// self-match survives the cut even among exact duplicates.
    pub fn query(&self, query_row: usize, k: usize) -> Result<Vec<Neighbor>, RecommendError> {
        let rows = self.matrix.rows();
        let query = self
            .matrix
            .row(query_row)
            .ok_or(RecommendError::IndexOutOfRange { index: query_row, rows })?;

        let mut neighbors: Vec<Neighbor> = self
            .matrix
            .iter_rows()
            .enumerate()
            .map(|(row, candidate)| Neighbor { row, distance: euclidean_distance(query, candidate) })
            .collect();

        neighbors.sort_by(|left, right| {
            left.distance
                .total_cmp(&right.distance)
                .then_with(|| self_first(left.row, right.row, query_row))
                .then_with(|| left.row.cmp(&right.row))
        });
        neighbors.truncate(k.saturating_add(1).min(rows));

        Ok(neighbors)
    }
}

fn self_first(left: usize, right: usize, query_row: usize) -> Ordering {
    (right == query_row).cmp(&(left == query_row))
}

pub fn euclidean_distance(left: &[f64], right: &[f64]) -> f64 {
    left.iter().zip(right).map(|(a, b)| (a - b) * (a - b)).sum::<f64>().sqrt()
}
