use axum::{
    extract::Extension,
    http::StatusCode,
    response::Response,
    routing::post,
    Json, Router,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::entities::user::{self, Entity as UserEntity};
use crate::middleware::{
    auth::{generate_token, AuthError, AuthKeys},
    logging::{to_response, ApiError},
};

pub fn auth_router(db: Arc<DatabaseConnection>, keys: Arc<AuthKeys>) -> Router {
    Router::new()
        .route("/login", post(login))
        .layer(Extension(db))
        .layer(Extension(keys))
}

async fn login(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(keys): Extension<Arc<AuthKeys>>,
    Json(payload): Json<UserLogin>,
) -> Response {
    if let Err(errors) = payload.validate() {
        return to_response(
            (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Username and password are required"
                })),
            ),
            Err(ApiError::ValidationFail(errors.to_string())),
        );
    }

    let result = UserEntity::find()
        .filter(user::Column::Username.eq(payload.username.as_str()))
        .one(&*db)
        .await;

    let model = match result {
        Ok(Some(model)) => model,
        Ok(None) => return invalid_credentials(AuthError::InvalidCredentials),
        Err(err) => {
            return to_response(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error"
                    })),
                ),
                Err(ApiError::DbError(err.to_string())),
            );
        }
    };

    match model.check_hash(&payload.password) {
        Ok(()) => {}
        // A stored hash that cannot be parsed is broken data, not a wrong password.
        Err(AuthError::CorruptedHash) => {
            return to_response(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error"
                    })),
                ),
                Err(ApiError::Integrity(format!(
                    "{} for user {}",
                    AuthError::CorruptedHash,
                    model.id
                ))),
            );
        }
        Err(err) => return invalid_credentials(err),
    }

    match generate_token(model.id, &keys) {
        Ok(token) => to_response(
            (
                StatusCode::OK,
                Json(json!({
                    "token": token
                })),
            ),
            Ok(()),
        ),
        Err(err) => to_response(
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            ),
            Err(ApiError::TokenGenerationFailed(err.to_string())),
        ),
    }
}

fn invalid_credentials(err: AuthError) -> Response {
    to_response(
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "Invalid username or password"
            })),
        ),
        Err(ApiError::Unauthorized(err.to_string())),
    )
}

#[derive(Deserialize, Validate)]
struct UserLogin {
    #[validate(length(min = 1))]
    username: String,
    #[validate(length(min = 1))]
    password: String,
}
