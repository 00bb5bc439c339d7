use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::debug;

use greenswap_core::catalog::{ProductStore, StoreError};
use greenswap_core::domain::category::Category;
use greenswap_core::domain::product::{Product, ProductId};

use super::{CatalogTable, RepositoryError};
use crate::DbPool;

pub struct SqlProductStore {
    pool: DbPool,
}

impl SqlProductStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Full snapshot of one table, ordered by id.
    pub async fn list(&self, table: CatalogTable) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query(table.select_all_sql()).fetch_all(&self.pool).await?;
        let products = rows.iter().map(product_from_row).collect::<Result<Vec<_>, _>>()?;

        debug!(
            event_name = "db.product_store.fetched",
            table = table.name(),
            rows = products.len(),
            "loaded product catalog snapshot"
        );
        Ok(products)
    }
}

#[async_trait]
impl ProductStore for SqlProductStore {
    async fn fetch(&self, category: &Category) -> Result<Vec<Product>, StoreError> {
        let table = CatalogTable::for_category(category)?;
        Ok(self.list(table).await?)
    }
}

fn product_from_row(row: &SqliteRow) -> Result<Product, RepositoryError> {
    let id: i64 = row.try_get("id")?;
    let ghg_emission: f64 = row.try_get("ghg_emission")?;
    if !ghg_emission.is_finite() {
        return Err(RepositoryError::Decode(format!(
            "product {id} has a non-finite ghg_emission"
        )));
    }

    Ok(Product {
        id: ProductId(id),
        name: row.try_get("product_name")?,
        subcategory: row.try_get("subcategory")?,
        material_composition: row.try_get("material_composition")?,
        ghg_emission,
    })
}
