use std::sync::Arc;

use greenswap_core::catalog::StoreError;
use greenswap_core::config::AppConfig;
use greenswap_core::domain::category::Category;
use greenswap_core::domain::product::ProductId;
use greenswap_core::emissions::EmissionTable;
use greenswap_core::errors::ApplicationError;
use greenswap_core::recommend::{Recommendation, RecommendationEngine, RecommendationService};
use greenswap_core::report::render_text;
use greenswap_db::{connect_with_config, SqlProductStore};

use crate::commands::{build_runtime, load_config, CommandResult};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecommendArgs {
    pub category: String,
    pub product_id: i64,
    /// Falls back to `recommend.default_k` when unset.
    pub k: Option<usize>,
    pub json: bool,
}

pub fn run(args: RecommendArgs) -> CommandResult {
    let config = match load_config("recommend") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let engine = match build_engine(&config) {
        Ok(engine) => engine,
        Err(message) => {
            return CommandResult::failure("recommend", "emission_table", message, 2);
        }
    };
    let runtime = match build_runtime("recommend") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let category = Category::new(args.category.as_str());
    let k = args.k.unwrap_or(config.recommend.default_k);

    let result = runtime.block_on(async {
        let pool = connect_with_config(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
        let service = RecommendationService::new(SqlProductStore::new(pool.clone()), engine);

        let outcome = service.recommend(&category, ProductId(args.product_id), k).await;
        pool.close().await;

        outcome.map_err(|error| {
            let (error_class, exit_code) = classify(&error);
            (error_class, error.to_string(), exit_code)
        })
    });

    match result {
        Ok(recommendation) => render(&recommendation, args.json),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("recommend", error_class, message, exit_code)
        }
    }
}

fn build_engine(config: &AppConfig) -> Result<RecommendationEngine, String> {
    let table =
        EmissionTable::reference_with_overrides(config.recommend.emission_table_path.as_deref())
            .map_err(|error| format!("emission table issue: {error}"))?;
    Ok(RecommendationEngine::new(Arc::new(table)).with_scaling(config.recommend.feature_scaling))
}

fn render(recommendation: &Recommendation, json: bool) -> CommandResult {
    if !json {
        return CommandResult { exit_code: 0, output: render_text(recommendation) };
    }

    match serde_json::to_string(recommendation) {
        Ok(output) => CommandResult { exit_code: 0, output },
        Err(error) => CommandResult::failure(
            "recommend",
            "serialization",
            format!("failed to serialize recommendation: {error}"),
            3,
        ),
    }
}

fn classify(error: &ApplicationError) -> (&'static str, u8) {
    match error {
        ApplicationError::Recommend(_) => ("recommendation", 7),
        ApplicationError::Store(StoreError::UnsupportedCategory(_)) => ("recommendation", 7),
        ApplicationError::Store(StoreError::Backend(_)) => ("db_query", 4),
        ApplicationError::Configuration(_) => ("config_validation", 2),
    }
}
