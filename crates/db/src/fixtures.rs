use sqlx::Executor;
use tracing::info;

use crate::connection::DbPool;
use crate::repositories::{CatalogTable, RepositoryError};

/// Expected contents of the demo catalog, per table.
struct SeedTableContract {
    table: CatalogTable,
    product_ids: &'static [i64],
    /// Every subcategory must appear at least once.
    subcategories: &'static [&'static str],
}

const SEED_TABLES: &[SeedTableContract] = &[
    SeedTableContract {
        table: CatalogTable::Clothing,
        product_ids: &[1, 2, 3, 4, 5, 6, 7, 8],
        subcategories: &["belt", "jacket", "t-shirt"],
    },
    SeedTableContract {
        table: CatalogTable::Kitchenware,
        product_ids: &[1, 2, 3, 4, 5, 6, 7, 8],
        subcategories: &["frying pan", "mixing bowl", "saucepan", "spatula"],
    },
];

/// Deterministic demo catalog covering both categories.
///
/// Rows are written with `INSERT OR REPLACE`, so loading twice leaves the
/// same data behind.
pub struct CatalogSeedDataset;

impl CatalogSeedDataset {
    pub const SQL: &str = include_str!("../../../config/fixtures/catalog_seed.sql");

    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;

        tx.execute(sqlx::query(Self::SQL)).await?;
        tx.commit().await?;

        let tables_seeded = SEED_TABLES
            .iter()
            .map(|contract| TableSeedInfo {
                table: contract.table.name(),
                rows: contract.product_ids.len(),
            })
            .collect::<Vec<_>>();

        info!(
            event_name = "db.seed.loaded",
            tables = tables_seeded.len(),
            rows = tables_seeded.iter().map(|table| table.rows).sum::<usize>(),
            "demo catalog loaded"
        );
        Ok(SeedResult { tables_seeded })
    }

    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::new();

        for contract in SEED_TABLES {
            let table = contract.table.name();
            let ids = sql_array_from_ids(contract.product_ids);

            let present: i64 = sqlx::query_scalar(&format!(
                "SELECT COUNT(1) FROM {table} WHERE id IN {ids}"
            ))
            .fetch_one(pool)
            .await?;
            checks.push((table, present == contract.product_ids.len() as i64));

            for subcategory in contract.subcategories {
                let exists: i64 = sqlx::query_scalar(&format!(
                    "SELECT EXISTS(SELECT 1 FROM {table} WHERE subcategory = ?1)"
                ))
                .bind(*subcategory)
                .fetch_one(pool)
                .await?;
                checks.push((*subcategory, exists == 1));
            }
        }

        let all_present = checks.iter().all(|(_, exists)| *exists);
        Ok(VerificationResult { all_present, checks })
    }
}

fn sql_array_from_ids(ids: &[i64]) -> String {
    let joined = ids.iter().map(i64::to_string).collect::<Vec<_>>().join(",");
    format!("({joined})")
}

#[derive(Debug)]
pub struct SeedResult {
    pub tables_seeded: Vec<TableSeedInfo>,
}

#[derive(Debug)]
pub struct TableSeedInfo {
    pub table: &'static str,
    pub rows: usize,
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{connect_with_settings, migrations};

    async fn migrated_pool() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30)
            .await
            .expect("connect to test database");
        migrations::run_pending(&pool).await.expect("run migrations");
        pool
    }

    #[tokio::test]
    async fn seed_load_is_idempotent() {
        let pool = migrated_pool().await;

        let first = CatalogSeedDataset::load(&pool).await.expect("load seed fixtures");
        let first_verification =
            CatalogSeedDataset::verify(&pool).await.expect("verify seed fixtures");
        assert!(first_verification.all_present);
        assert_eq!(first.tables_seeded.len(), 2);

        let second = CatalogSeedDataset::load(&pool).await.expect("reload seed fixtures");
        let second_verification =
            CatalogSeedDataset::verify(&pool).await.expect("re-verify seed fixtures");
        assert!(second_verification.all_present);
        assert_eq!(second.tables_seeded.len(), 2);
        assert_eq!(first_verification.checks, second_verification.checks);

        let clothing_rows: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM clothing")
            .fetch_one(&pool)
            .await
            .expect("count clothing");
        assert_eq!(clothing_rows, 8);
    }

    #[tokio::test]
    async fn verify_reports_missing_rows_on_empty_catalog() {
        let pool = migrated_pool().await;

        let verification = CatalogSeedDataset::verify(&pool).await.expect("verify");
        assert!(!verification.all_present);
        assert!(verification.checks.contains(&("kitchenware", false)));
    }

    #[tokio::test]
    async fn seed_keeps_non_breaking_hyphen_in_stored_names() {
        let pool = migrated_pool().await;
        CatalogSeedDataset::load(&pool).await.expect("load seed fixtures");

        let name: String = sqlx::query_scalar("SELECT product_name FROM clothing WHERE id = 2")
            .fetch_one(&pool)
            .await
            .expect("faux leather jacket");
        assert_eq!(name, "Faux\u{2011}Leather Jacket");
    }

    #[test]
    fn seed_sql_covers_every_contract_row() {
        for contract in SEED_TABLES {
            assert!(
                CatalogSeedDataset::SQL
                    .contains(&format!("INSERT OR REPLACE INTO {}", contract.table.name())),
                "seed SQL should insert into {}",
                contract.table.name()
            );
            for subcategory in contract.subcategories {
                assert!(CatalogSeedDataset::SQL.contains(&format!("'{subcategory}'")));
            }
        }
    }
}
