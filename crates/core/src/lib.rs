pub mod catalog;
pub mod config;
pub mod domain;
pub mod emissions;
pub mod errors;
pub mod recommend;
pub mod report;

pub use catalog::{Catalog, ProductStore, StoreError};
pub use domain::category::Category;
pub use domain::product::{Product, ProductId};
pub use emissions::{EmissionTable, MaterialVocabulary};
pub use errors::{ApplicationError, InterfaceError, RecommendError};
pub use recommend::{
    GreenerAlternative, Recommendation, RecommendationEngine, RecommendationReport,
    RecommendationService,
};
