use crate::entities::user::Entity as UserEntity;
use crate::middleware::logging::{to_response, ApiError};
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let token = match auth_header.and_then(|header| header.strip_prefix("Bearer ")) {
        Some(token) => token,
        None => return unauthorized(AuthError::MissingToken),
    };

    let claims = match validate_token(&state.db, token, &state.keys).await {
        Ok(claims) => claims,
        Err(err) => return unauthorized(err),
    };
    tracing::debug!(user_id = claims.user_id, "Authenticated request");

    req.extensions_mut().insert(claims);
    next.run(req).await
}

fn unauthorized(err: AuthError) -> Response {
    let status = match err {
        AuthError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::UNAUTHORIZED,
    };
    let message = match status {
        StatusCode::UNAUTHORIZED => "Unauthorized",
        _ => "Internal server error",
    };
    to_response(
        (status, Json(json!({ "error": message }))),
        Err(ApiError::Unauthorized(err.to_string())),
    )
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i32,
    pub exp: usize,
}

/// Signing material for API tokens.
#[derive(Clone, Debug)]
pub struct AuthKeys {
    pub secret: String,
    pub token_ttl_hours: i64,
}

#[derive(Clone, Debug)]
pub struct AuthState {
    pub db: Arc<DatabaseConnection>,
    pub keys: Arc<AuthKeys>,
}

pub fn generate_token(user_id: i32, keys: &AuthKeys) -> Result<String, AuthError> {
    let exp = Utc::now()
        .checked_add_signed(Duration::hours(keys.token_ttl_hours))
        .ok_or(AuthError::GenerationFail)?
        .timestamp() as usize;

    let claims = Claims { user_id, exp };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(keys.secret.as_bytes()),
    )
    .map_err(|_| AuthError::GenerationFail)
}

pub async fn validate_token(
    db: &DatabaseConnection,
    token: &str,
    keys: &AuthKeys,
) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(keys.secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AuthError::ValidationFail)?
    .claims;

    match UserEntity::find_by_id(claims.user_id).one(db).await {
        Ok(Some(_)) => Ok(claims),
        Ok(None) => Err(AuthError::InvalidUser),
        Err(_) => Err(AuthError::InternalServerError),
    }
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,
    #[error("Invalid user id")]
    InvalidUser,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Stored password hash is malformed")]
    CorruptedHash,
    #[error("Failed to validate token")]
    ValidationFail,
    #[error("Failed to generate token")]
    GenerationFail,
    #[error("Internal server error")]
    InternalServerError,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> AuthKeys {
        AuthKeys {
            secret: "test-secret".to_owned(),
            token_ttl_hours: 1,
        }
    }

    #[test]
    fn generated_token_decodes_with_same_secret() {
        let token = generate_token(42, &keys()).unwrap();

        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"test-secret"),
            &Validation::new(Algorithm::HS256),
        )
        .unwrap();
        assert_eq!(decoded.claims.user_id, 42);
        assert!(decoded.claims.exp > Utc::now().timestamp() as usize);
    }

    #[test]
    fn generated_token_is_rejected_with_other_secret() {
        let token = generate_token(42, &keys()).unwrap();

        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"another-secret"),
            &Validation::new(Algorithm::HS256),
        );
        assert!(decoded.is_err());
    }
}
