//! Greener-alternative recommendation pipeline.
//!
//! parse -> vectorize -> build feature matrix -> k-NN query -> greener filter.
//! Every call builds its own feature space from the catalog snapshot it is
//! given and drops it on return; nothing is cached between calls.

pub mod composition;
pub mod features;
pub mod filter;
pub mod neighbors;
pub mod service;

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::catalog::Catalog;
use crate::domain::category::Category;
use crate::domain::product::{Product, ProductId};
use crate::emissions::EmissionTable;
use crate::errors::RecommendError;

pub use composition::{parse_composition, vectorize, ParsedComposition};
pub use features::{FeatureBuilder, FeatureMatrix, FeatureScaling, SubcategoryEncoding};
pub use filter::{filter_and_rank, GreenerAlternative};
pub use neighbors::{euclidean_distance, Neighbor, NeighborIndex};
pub use service::RecommendationService;

/// Neighbor count used when the caller does not pick one.
pub const DEFAULT_K: usize = 3;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecommendationReport {
    pub category: Category,
    pub selected: Product,
    pub k: usize,
    /// Neighbors returned by the index, self-match included.
    pub neighbors_considered: usize,
    pub alternatives: Vec<GreenerAlternative>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Recommendation {
    Found(RecommendationReport),
    /// The selected id is not part of the fetched catalog.
    NotFound { category: Category, selected_id: ProductId },
}

impl Recommendation {
    pub fn alternatives(&self) -> &[GreenerAlternative] {
        match self {
            Self::Found(report) => &report.alternatives,
            Self::NotFound { .. } => &[],
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

#[derive(Clone, Debug)]
pub struct RecommendationEngine {
    table: Arc<EmissionTable>,
    scaling: FeatureScaling,
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new(Arc::new(EmissionTable::reference()))
    }
}

impl RecommendationEngine {
    pub fn new(table: Arc<EmissionTable>) -> Self {
        Self { table, scaling: FeatureScaling::None }
    }

    pub fn with_scaling(mut self, scaling: FeatureScaling) -> Self {
        self.scaling = scaling;
        self
    }

    pub fn table(&self) -> &EmissionTable {
        &self.table
    }

    pub fn scaling(&self) -> FeatureScaling {
        self.scaling
    }

    /// Greener alternatives for `selected_id` among its `k` nearest neighbors.
    ///
    /// The feature matrix is built before the selected id is looked up, so a
    /// malformed composition anywhere in the catalog fails the call even when
    /// the id is absent.
    pub fn recommend(
        &self,
        catalog: &Catalog,
        selected_id: ProductId,
        k: usize,
    ) -> Result<Recommendation, RecommendError> {
        let builder =
            FeatureBuilder::for_category(&self.table, catalog.category())?.with_scaling(self.scaling);
        let matrix = builder.build(catalog)?;

        let Some(query_row) = catalog.position(selected_id) else {
            return Ok(Recommendation::NotFound {
                category: catalog.category().clone(),
                selected_id,
            });
        };

        let index = NeighborIndex::fit(&matrix)?;
        let neighbors = index.query(query_row, k)?;
        let alternatives = filter_and_rank(&neighbors, catalog.products(), query_row)?;

        debug!(
            event_name = "recommend.engine.ranked",
            category = %catalog.category(),
            product_id = %selected_id,
            neighbors = neighbors.len(),
            alternatives = alternatives.len(),
            "neighbors filtered to greener alternatives"
        );

        Ok(Recommendation::Found(RecommendationReport {
            category: catalog.category().clone(),
            selected: catalog.products()[query_row].clone(),
            k,
            neighbors_considered: neighbors.len(),
            alternatives,
        }))
    }
}
