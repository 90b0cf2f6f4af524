pub mod api;
pub mod config;
pub mod entities;
pub mod middleware;
pub mod migrations;
pub mod read_model;
pub mod repository;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::sync::Arc;
use thiserror::Error;

use crate::api::create_api_router;
use crate::config::Config;
use crate::entities::{primary_setup, setup_schema, SetupError};
use crate::middleware::auth::AuthKeys;

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("Failed to connect to database: {0}")]
    Connect(#[from] DbErr),
    #[error(transparent)]
    Setup(#[from] SetupError),
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options.sqlx_logging(false);
    // Every pooled connection would get its own private in-memory database.
    if database_url.contains(":memory:") {
        options.max_connections(1).min_connections(1);
    }
    Database::connect(options).await
}

pub async fn serve(config: Config) -> Result<(), ServeError> {
    let db = connect(&config.database_url).await?;
    setup_schema(&db).await?;
    if let Some(seed) = &config.seed_account {
        primary_setup(&db, seed).await?;
    }

    let shared_db = Arc::new(db);
    let keys = AuthKeys {
        secret: config.jwt_secret.clone(),
        token_ttl_hours: config.token_ttl_hours,
    };
    let app = create_api_router(shared_db, keys);

    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening");
    axum::serve(listener, app).await?;
    Ok(())
}
