pub mod public;
pub mod user;

use axum::{middleware::from_fn, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use public::{health_router, public_api_router};
use user::user_api_router;

use crate::middleware::{
    auth::{AuthKeys, AuthState},
    logging::logging_middleware,
};
use crate::repository::{ProductRepository, SeaOrmProductRepository};

pub fn create_api_router(shared_db: Arc<DatabaseConnection>, keys: AuthKeys) -> Router {
    let repository: Arc<dyn ProductRepository> =
        Arc::new(SeaOrmProductRepository::new(shared_db.clone()));
    create_api_router_with(shared_db, keys, repository)
}

/// Same router as [`create_api_router`] with the product store supplied by the caller.
pub fn create_api_router_with(
    shared_db: Arc<DatabaseConnection>,
    keys: AuthKeys,
    repository: Arc<dyn ProductRepository>,
) -> Router {
    let keys = Arc::new(keys);
    let auth_state = AuthState {
        db: shared_db.clone(),
        keys: keys.clone(),
    };

    Router::new()
        .merge(health_router())
        .nest(
            "/api",
            public_api_router(shared_db, keys).merge(user_api_router(auth_state, repository)),
        )
        .layer(from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}
