use tracing::{info, warn};

use crate::catalog::{Catalog, ProductStore};
use crate::domain::category::Category;
use crate::domain::product::ProductId;
use crate::errors::ApplicationError;

use super::{Recommendation, RecommendationEngine};

/// Fetches a category snapshot from a [`ProductStore`] and runs the engine
/// on it. Each call fetches its own snapshot; nothing is shared between
/// concurrent calls except the immutable emission table.
pub struct RecommendationService<S> {
    store: S,
    engine: RecommendationEngine,
}

impl<S: ProductStore> RecommendationService<S> {
    pub fn new(store: S, engine: RecommendationEngine) -> Self {
        Self { store, engine }
    }

    pub fn engine(&self) -> &RecommendationEngine {
        &self.engine
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn recommend(
        &self,
        category: &Category,
        selected_id: ProductId,
        k: usize,
    ) -> Result<Recommendation, ApplicationError> {
        info!(
            event_name = "recommend.request.start",
            category = %category,
            product_id = %selected_id,
            k,
            "recommendation requested"
        );

        // Unknown categories fail before any store I/O.
        self.engine.table().vocabulary(category)?;

        let products = self.store.fetch(category).await.map_err(|error| {
            warn!(
                event_name = "recommend.request.store_failed",
                category = %category,
                error = %error,
                "product store fetch failed"
            );
            error
        })?;
        let catalog = Catalog::new(category.clone(), products);

        let recommendation = self.engine.recommend(&catalog, selected_id, k)?;
        match &recommendation {
            Recommendation::Found(report) => info!(
                event_name = "recommend.request.completed",
                category = %category,
                product_id = %selected_id,
                catalog_size = catalog.len(),
                alternatives = report.alternatives.len(),
                "recommendation completed"
            ),
            Recommendation::NotFound { .. } => warn!(
                event_name = "recommend.request.not_found",
                category = %category,
                product_id = %selected_id,
                catalog_size = catalog.len(),
                "selected product not found in category"
            ),
        }

        Ok(recommendation)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::RecommendationService;
    use crate::catalog::{ProductStore, StoreError};
    use crate::domain::category::Category;
    use crate::domain::product::{Product, ProductId};
    use crate::errors::{ApplicationError, RecommendError};
    use crate::recommend::{Recommendation, RecommendationEngine};

    #[derive(Default)]
    struct KitchenwareStore {
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl ProductStore for KitchenwareStore {
        async fn fetch(&self, category: &Category) -> Result<Vec<Product>, StoreError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            match category.as_str() {
                "kitchenware" => Ok(vec![
                    product(1, "aluminum:100", 18.5),
                    product(2, "stainless steel:100", 6.15),
                    product(3, "polypropylene:100", 2.3),
                ]),
                "clothing" => Ok(Vec::new()),
                other => Err(StoreError::UnsupportedCategory(other.to_string())),
            }
        }
    }

    fn product(id: i64, composition: &str, emission: f64) -> Product {
        Product {
            id: ProductId(id),
            name: format!("Pan {id}"),
            subcategory: "pan".to_string(),
            material_composition: composition.to_string(),
            ghg_emission: emission,
        }
    }

    fn service() -> RecommendationService<KitchenwareStore> {
        RecommendationService::new(KitchenwareStore::default(), RecommendationEngine::default())
    }

    #[tokio::test]
    async fn recommends_greener_pans_from_the_store() {
        let service = service();
        let recommendation = service
            .recommend(&Category::new("kitchenware"), ProductId(1), 2)
            .await
            .expect("recommend");

        let ids: Vec<i64> =
            recommendation.alternatives().iter().map(|alt| alt.product.id.0).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[tokio::test]
    async fn unknown_category_never_reaches_the_store() {
        let service = service();
        let error = service
            .recommend(&Category::new("furniture"), ProductId(1), 3)
            .await
            .expect_err("no vocabulary for furniture");

        assert_eq!(
            error,
            ApplicationError::Recommend(RecommendError::UnknownCategory("furniture".to_string()))
        );
        assert_eq!(service.store().fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_store_result_is_an_error() {
        let error = service()
            .recommend(&Category::new("clothing"), ProductId(1), 3)
            .await
            .expect_err("clothing store is empty");
        assert_eq!(
            error,
            ApplicationError::Recommend(RecommendError::EmptyProductSet("clothing".to_string()))
        );
    }

    #[tokio::test]
    async fn missing_product_is_not_found() {
        let recommendation = service()
            .recommend(&Category::new("kitchenware"), ProductId(77), 3)
            .await
            .expect("not found is not an error");
        assert!(matches!(recommendation, Recommendation::NotFound { selected_id: ProductId(77), .. }));
    }
}
