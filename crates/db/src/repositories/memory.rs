use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use greenswap_core::catalog::{ProductStore, StoreError};
use greenswap_core::domain::category::Category;
use greenswap_core::domain::product::Product;

/// Product store backed by process memory. Only categories that were
/// registered (even with no products) are served.
#[derive(Default)]
pub struct InMemoryProductStore {
    catalogs: RwLock<BTreeMap<Category, BTreeMap<i64, Product>>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(
        mut self,
        category: impl Into<Category>,
        products: impl IntoIterator<Item = Product>,
    ) -> Self {
        let entry = self.catalogs.get_mut().entry(category.into()).or_default();
        for product in products {
            entry.insert(product.id.0, product);
        }
        self
    }

    /// Inserts or replaces a product by id.
    pub async fn save(&self, category: &Category, product: Product) {
        let mut catalogs = self.catalogs.write().await;
        catalogs.entry(category.clone()).or_default().insert(product.id.0, product);
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn fetch(&self, category: &Category) -> Result<Vec<Product>, StoreError> {
        let catalogs = self.catalogs.read().await;
        catalogs
            .get(category)
            .map(|products| products.values().cloned().collect())
            .ok_or_else(|| StoreError::UnsupportedCategory(category.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use greenswap_core::catalog::{ProductStore, StoreError};
    use greenswap_core::domain::category::Category;
    use greenswap_core::domain::product::{Product, ProductId};

    use super::InMemoryProductStore;

    fn product(id: i64, emission: f64) -> Product {
        Product {
            id: ProductId(id),
            name: format!("Shirt {id}"),
            subcategory: "t-shirt".to_string(),
            material_composition: "cotton:100".to_string(),
            ghg_emission: emission,
        }
    }

    #[tokio::test]
    async fn fetch_returns_products_ordered_by_id() {
        let store = InMemoryProductStore::new()
            .with_category("clothing", vec![product(3, 5.9), product(1, 9.5)]);

        let products = store.fetch(&Category::new("clothing")).await.expect("fetch");
        let ids: Vec<i64> = products.iter().map(|product| product.id.0).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn save_replaces_existing_product() {
        let clothing = Category::new("clothing");
        let store = InMemoryProductStore::new().with_category("clothing", vec![product(1, 9.5)]);

        store.save(&clothing, product(1, 4.0)).await;
        store.save(&clothing, product(2, 7.0)).await;

        let products = store.fetch(&clothing).await.expect("fetch");
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].ghg_emission, 4.0);
    }

    #[tokio::test]
    async fn unregistered_category_is_unsupported() {
        let store = InMemoryProductStore::new().with_category("clothing", Vec::new());

        assert!(store.fetch(&Category::new("clothing")).await.expect("fetch").is_empty());
        assert_eq!(
            store.fetch(&Category::new("kitchenware")).await,
            Err(StoreError::UnsupportedCategory("kitchenware".to_string()))
        );
    }
}
