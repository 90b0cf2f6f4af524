pub mod auth;

use axum::{http::StatusCode, response::Response, routing::get, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use auth::auth_router;

use crate::middleware::{auth::AuthKeys, logging::to_response};

pub fn public_api_router(db: Arc<DatabaseConnection>, keys: Arc<AuthKeys>) -> Router {
    Router::new().merge(auth_router(db, keys))
}

pub fn health_router() -> Router {
    Router::new().route("/", get(health_check))
}

async fn health_check() -> Response {
    to_response((StatusCode::OK, "OK"), Ok(()))
}
