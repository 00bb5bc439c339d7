pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;

pub use connection::{connect_with_config, connect_with_settings, DbPool};
pub use fixtures::{CatalogSeedDataset, SeedResult, TableSeedInfo, VerificationResult};
pub use repositories::{CatalogTable, InMemoryProductStore, RepositoryError, SqlProductStore};
