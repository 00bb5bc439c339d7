use thiserror::Error;

use greenswap_core::catalog::StoreError;
use greenswap_core::domain::category::Category;

pub mod memory;
pub mod product;

pub use memory::InMemoryProductStore;
pub use product::SqlProductStore;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for StoreError {
    fn from(error: RepositoryError) -> Self {
        StoreError::Backend(error.to_string())
    }
}

/// Physical table holding one product category. Table names cannot be bound
/// as query parameters, so only these are ever interpolated into SQL.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CatalogTable {
    Clothing,
    Kitchenware,
}

impl CatalogTable {
    pub const ALL: [CatalogTable; 2] = [CatalogTable::Clothing, CatalogTable::Kitchenware];

    pub fn for_category(category: &Category) -> Result<Self, StoreError> {
        match category.as_str() {
            "clothing" => Ok(Self::Clothing),
            "kitchenware" => Ok(Self::Kitchenware),
            other => Err(StoreError::UnsupportedCategory(other.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Clothing => "clothing",
            Self::Kitchenware => "kitchenware",
        }
    }

    pub(crate) fn select_all_sql(self) -> &'static str {
        match self {
            Self::Clothing => {
                "SELECT id, product_name, subcategory, material_composition, ghg_emission \
                 FROM clothing ORDER BY id"
            }
            Self::Kitchenware => {
                "SELECT id, product_name, subcategory, material_composition, ghg_emission \
                 FROM kitchenware ORDER BY id"
            }
        }
    }
}
