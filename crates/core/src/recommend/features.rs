//! Feature space construction.
//!
//! Every product becomes one row:
//! `[one-hot subcategory] ++ [material fractions in vocabulary order] ++ [ghg emission]`.
//! The subcategory encoding is discovered from the product set on every call;
//! column identities are never compared across calls.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::Catalog;
use crate::domain::category::Category;
use crate::emissions::{EmissionTable, MaterialVocabulary};
use crate::errors::RecommendError;

use super::composition::vectorize;

/// Optional per-column rescaling applied after the matrix is assembled.
///
/// `None` keeps the raw emission scalar, which usually dominates distances
/// because it is not on the 0..1 scale of the other columns. `MinMax` maps
/// every column to `[0, 1]` over the current product set and changes which
/// neighbors are returned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureScaling {
    #[default]
    None,
    MinMax,
}

impl FeatureScaling {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::MinMax => "min_max",
        }
    }
}

impl std::str::FromStr for FeatureScaling {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "min_max" | "minmax" => Ok(Self::MinMax),
            other => Err(format!("unsupported feature scaling `{other}` (expected none|min_max)")),
        }
    }
}

/// Subcategory label to one-hot column, in sorted label order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubcategoryEncoding {
    columns: BTreeMap<String, usize>,
}

impl SubcategoryEncoding {
    pub fn fit<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let distinct: std::collections::BTreeSet<&str> = labels.into_iter().collect();
        let columns =
            distinct.into_iter().enumerate().map(|(column, label)| (label.to_owned(), column)).collect();
        Self { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column(&self, label: &str) -> Option<usize> {
        self.columns.get(label).copied()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// One-hot vector for `label`; an unseen label encodes as all zeros.
    pub fn encode(&self, label: &str) -> Vec<f64> {
        let mut encoded = vec![0.0; self.columns.len()];
        if let Some(column) = self.column(label) {
            encoded[column] = 1.0;
        }
        encoded
    }
}

/// Dense row-major matrix of feature rows.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureMatrix {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

impl FeatureMatrix {
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, RecommendError> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in &rows {
            if row.len() != cols {
                return Err(RecommendError::DimensionMismatch { expected: cols, found: row.len() });
            }
            data.extend_from_slice(row);
        }
        Ok(Self { data, rows: rows.len(), cols })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn row(&self, index: usize) -> Option<&[f64]> {
        (index < self.rows).then(|| &self.data[index * self.cols..(index + 1) * self.cols])
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        (0..self.rows).filter_map(move |index| self.row(index))
    }

    fn rescale_min_max(&mut self) {
        for col in 0..self.cols {
            let column = (0..self.rows).map(|row| self.data[row * self.cols + col]);
            let (min, max) = column.fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), value| {
                (min.min(value), max.max(value))
            });
            let span = max - min;
            for row in 0..self.rows {
                let cell = &mut self.data[row * self.cols + col];
                *cell = if span > 0.0 { (*cell - min) / span } else { 0.0 };
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct FeatureBuilder {
    vocabulary: MaterialVocabulary,
    scaling: FeatureScaling,
}

impl FeatureBuilder {
    pub fn new(vocabulary: MaterialVocabulary) -> Self {
        Self { vocabulary, scaling: FeatureScaling::None }
    }

    pub fn for_category(table: &EmissionTable, category: &Category) -> Result<Self, RecommendError> {
        table.vocabulary(category).map(Self::new)
    }

    pub fn with_scaling(mut self, scaling: FeatureScaling) -> Self {
        self.scaling = scaling;
        self
    }

    /// Row `i` of the result belongs to `catalog.products()[i]`.
    pub fn build(&self, catalog: &Catalog) -> Result<FeatureMatrix, RecommendError> {
        if catalog.is_empty() {
            return Err(RecommendError::EmptyProductSet(catalog.category().to_string()));
        }

        let products = catalog.products();
        let encoding = SubcategoryEncoding::fit(products.iter().map(|p| p.subcategory.as_str()));

        let rows = products
            .iter()
            .map(|product| -> Result<Vec<f64>, RecommendError> {
                let mut row = encoding.encode(&product.subcategory);
                row.extend(vectorize(&product.material_composition, &self.vocabulary)?);
                row.push(product.ghg_emission);
                Ok(row)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut matrix = FeatureMatrix::from_rows(rows)?;
        let expected = encoding.len() + self.vocabulary.len() + 1;
        if matrix.cols() != expected {
            return Err(RecommendError::DimensionMismatch { expected, found: matrix.cols() });
        }
        if self.scaling == FeatureScaling::MinMax {
            matrix.rescale_min_max();
        }

        debug!(
            event_name = "recommend.features.built",
            category = %catalog.category(),
            rows = matrix.rows(),
            cols = matrix.cols(),
            subcategories = encoding.len(),
            materials = self.vocabulary.len(),
            "feature matrix assembled"
        );

        Ok(matrix)
    }
}
