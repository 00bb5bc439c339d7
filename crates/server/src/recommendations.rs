use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use greenswap_core::catalog::ProductStore;
use greenswap_core::domain::category::Category;
use greenswap_core::domain::product::ProductId;
use greenswap_core::errors::InterfaceError;
use greenswap_core::recommend::{Recommendation, RecommendationService};
use serde::{Deserialize, Serialize};
use tracing::{info_span, warn, Instrument};
use uuid::Uuid;

pub struct RecommendationState<S> {
    service: Arc<RecommendationService<S>>,
    default_k: usize,
}

impl<S> Clone for RecommendationState<S> {
    fn clone(&self) -> Self {
        Self { service: Arc::clone(&self.service), default_k: self.default_k }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RecommendQuery {
    pub k: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ApiError {
    pub error: &'static str,
    pub message: &'static str,
    pub detail: String,
    pub correlation_id: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

pub fn router<S>(service: Arc<RecommendationService<S>>, default_k: usize) -> Router
where
    S: ProductStore + 'static,
{
    Router::new()
        .route("/api/v1/recommendations/{category}/{product_id}", get(recommend::<S>))
        .with_state(RecommendationState { service, default_k })
}

pub async fn recommend<S>(
    State(state): State<RecommendationState<S>>,
    Path((category, product_id)): Path<(String, i64)>,
    Query(query): Query<RecommendQuery>,
) -> ApiResult<Recommendation>
where
    S: ProductStore + 'static,
{
    let correlation_id = Uuid::new_v4().to_string();
    let category = Category::new(category);
    let selected_id = ProductId(product_id);
    let k = query.k.unwrap_or(state.default_k);

    let span = info_span!("recommendation_request", correlation_id = %correlation_id);
    let outcome = state.service.recommend(&category, selected_id, k).instrument(span).await;

    match outcome {
        Ok(Recommendation::NotFound { .. }) => Err(error_response(InterfaceError::not_found(
            format!("product {selected_id} is not in category `{category}`"),
            correlation_id,
        ))),
        Ok(recommendation) => Ok(Json(recommendation)),
        Err(error) => {
            let mapped = error.into_interface(correlation_id);
            warn!(
                event_name = "server.recommendations.failed",
                correlation_id = mapped.correlation_id(),
                category = %category,
                product_id = %selected_id,
                error = %mapped,
                "recommendation request failed"
            );
            Err(error_response(mapped))
        }
    }
}

fn error_response(error: InterfaceError) -> (StatusCode, Json<ApiError>) {
    let (status, kind) = match &error {
        InterfaceError::BadRequest { .. } => (StatusCode::BAD_REQUEST, "bad_request"),
        InterfaceError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
        InterfaceError::ServiceUnavailable { .. } => {
            (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable")
        }
        InterfaceError::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
    };

    let detail = match &error {
        InterfaceError::BadRequest { message, .. }
        | InterfaceError::NotFound { message, .. }
        | InterfaceError::ServiceUnavailable { message, .. }
        | InterfaceError::Internal { message, .. } => message.clone(),
    };

    (
        status,
        Json(ApiError {
            error: kind,
            message: error.user_message(),
            detail,
            correlation_id: error.correlation_id().to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use greenswap_core::domain::product::{Product, ProductId};
    use greenswap_core::recommend::{RecommendationEngine, RecommendationService};
    use greenswap_db::{connect_with_settings, InMemoryProductStore, SqlProductStore};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::router;

    fn pan(id: i64, name: &str, composition: &str, emission: f64) -> Product {
        Product {
            id: ProductId(id),
            name: name.to_string(),
            subcategory: "pan".to_string(),
            material_composition: composition.to_string(),
            ghg_emission: emission,
        }
    }

    fn memory_router() -> axum::Router {
        let store = InMemoryProductStore::new()
            .with_category(
                "kitchenware",
                vec![
                    pan(1, "Aluminum Pan", "aluminum:100", 18.5),
                    pan(2, "Steel Pan", "stainless steel:100", 6.15),
                    pan(3, "Polypropylene Pan", "polypropylene:100", 2.3),
                ],
            )
            .with_category("clothing", Vec::new());
        let service = RecommendationService::new(store, RecommendationEngine::default());
        router(Arc::new(service), 3)
    }

    async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn found_returns_alternatives_nearest_first() {
        let (status, body) = get(memory_router(), "/api/v1/recommendations/kitchenware/2?k=3").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "found");
        assert_eq!(body["selected"]["id"], 2);
        let ids: Vec<i64> = body["alternatives"]
            .as_array()
            .expect("alternatives")
            .iter()
            .filter_map(|alt| alt["product"]["id"].as_i64())
            .collect();
        assert_eq!(ids, vec![3]);
    }

    #[tokio::test]
    async fn malformed_catalog_row_is_a_bad_request() {
        let store = InMemoryProductStore::new().with_category(
            "kitchenware",
            vec![
                pan(1, "Aluminum Pan", "aluminum:100", 18.5),
                pan(4, "Broken Pan", "aluminum", 9.0),
            ],
        );
        let app = router(
            Arc::new(RecommendationService::new(store, RecommendationEngine::default())),
            3,
        );

        let (status, body) = get(app, "/api/v1/recommendations/kitchenware/1").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_request");
        assert!(body["detail"].as_str().unwrap_or_default().contains("aluminum"));
    }

    #[tokio::test]
    async fn missing_product_is_not_found() {
        let store = InMemoryProductStore::new()
            .with_category("kitchenware", vec![pan(1, "Aluminum Pan", "aluminum:100", 18.5)]);
        let app = router(
            Arc::new(RecommendationService::new(store, RecommendationEngine::default())),
            3,
        );

        let (status, body) = get(app, "/api/v1/recommendations/kitchenware/99").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
        assert!(!body["correlation_id"].as_str().unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn unknown_category_and_empty_catalog_are_bad_requests() {
        let (status, body) = get(memory_router(), "/api/v1/recommendations/furniture/1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_request");

        let (status, _) = get(memory_router(), "/api/v1/recommendations/clothing/1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn store_failure_is_service_unavailable() {
        let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("connect");
        let service =
            RecommendationService::new(SqlProductStore::new(pool), RecommendationEngine::default());
        let app = router(Arc::new(service), 3);

        let (status, body) = get(app, "/api/v1/recommendations/clothing/1").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "service_unavailable");
    }

    #[tokio::test]
    async fn non_numeric_k_is_rejected() {
        let (status, _) = get(memory_router(), "/api/v1/recommendations/kitchenware/2?k=many").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
