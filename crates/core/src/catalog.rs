use async_trait::async_trait;
use thiserror::Error;

use crate::domain::category::Category;
use crate::domain::product::{Product, ProductId};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("unsupported category: `{0}`")]
    UnsupportedCategory(String),
    #[error("product store failure: {0}")]
    Backend(String),
}

/// Source of product rows for one category.
///
/// Implementations return every product of the category in a stable order;
/// that order becomes the row order of the feature matrix.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn fetch(&self, category: &Category) -> Result<Vec<Product>, StoreError>;
}

/// Snapshot of one category's products, fetched once per recommendation call.
#[derive(Clone, Debug)]
pub struct Catalog {
    category: Category,
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(category: Category, products: Vec<Product>) -> Self {
        Self { category, products }
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Row index of the first product carrying `product_id`.
    pub fn position(&self, product_id: ProductId) -> Option<usize> {
        self.products.iter().position(|product| product.id == product_id)
    }
}
