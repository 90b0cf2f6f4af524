use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

use crate::middleware::logging::{to_response, ApiError};
use crate::read_model::{ProductListResponse, ProductResponse, ReadModelError};
use crate::repository::{ProductRepository, RepositoryError};

pub fn product_router(repository: Arc<dyn ProductRepository>) -> Router {
    Router::new()
        .route("/products", get(get_products))
        .route("/products/:id", get(get_product))
        .layer(Extension(repository))
}

async fn get_products(Extension(repository): Extension<Arc<dyn ProductRepository>>) -> Response {
    let aggregates = match repository.list_products().await {
        Ok(aggregates) => aggregates,
        Err(err) => return repository_failure(err),
    };

    match ProductListResponse::assemble(aggregates) {
        Ok(listing) => to_response((StatusCode::OK, Json(listing)), Ok(())),
        Err(err) => integrity_failure(err),
    }
}

async fn get_product(
    Path(id): Path<i32>,
    Extension(repository): Extension<Arc<dyn ProductRepository>>,
) -> Response {
    let aggregate = match repository.find_product(id).await {
        Ok(Some(aggregate)) => aggregate,
        Ok(None) => {
            let tmp = format!("No product with {id} id was found.");
            return to_response(
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({
                        "error": tmp
                    })),
                ),
                Err(ApiError::General(tmp)),
            );
        }
        Err(err) => return repository_failure(err),
    };

    match ProductResponse::assemble(aggregate) {
        Ok(product) => to_response(
            (
                StatusCode::OK,
                Json(json!({
                    "product": product
                })),
            ),
            Ok(()),
        ),
        Err(err) => integrity_failure(err),
    }
}

fn repository_failure(err: RepositoryError) -> Response {
    to_response(
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error"
            })),
        ),
        Err(ApiError::DbError(err.to_string())),
    )
}

// A broken aggregate is never papered over with a partial record.
fn integrity_failure(err: ReadModelError) -> Response {
    to_response(
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error"
            })),
        ),
        Err(ApiError::Integrity(err.to_string())),
    )
}
