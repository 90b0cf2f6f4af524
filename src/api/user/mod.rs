pub mod product;

use axum::{middleware::from_fn_with_state, Router};

use crate::middleware::auth::{auth_middleware, AuthState};
use crate::repository::ProductRepository;
use product::product_router;
use std::sync::Arc;

pub fn user_api_router(state: AuthState, repository: Arc<dyn ProductRepository>) -> Router {
    Router::new()
        .merge(product_router(repository))
        .route_layer(from_fn_with_state(state, auth_middleware))
}
