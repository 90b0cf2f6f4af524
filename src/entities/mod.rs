pub mod category;
pub mod category_product;
pub mod image;
pub mod product;
pub mod schema_migration;
pub mod tax;
pub mod user;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use thiserror::Error;

use crate::config::SeedAccount;
use crate::migrations::{MigrationError, Migrator};

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Failed to migrate schema: {0}")]
    Migration(#[from] MigrationError),
    #[error("Failed to hash password: {0}")]
    PasswordHash(String),
    #[error("Database error: {0}")]
    Db(#[from] DbErr),
}

pub async fn setup_schema(db: &DatabaseConnection) -> Result<(), SetupError> {
    let applied = Migrator::up(db).await?;
    for name in applied {
        tracing::info!(migration = %name, "Applied migration");
    }
    Ok(())
}

pub fn hash_password(password: &str) -> Result<String, SetupError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| SetupError::PasswordHash(err.to_string()))
}

/// Creates the bootstrap API account if it does not exist yet.
pub async fn primary_setup(db: &DatabaseConnection, seed: &SeedAccount) -> Result<(), SetupError> {
    let txn = db.begin().await?;

    let existing = user::Entity::find()
        .filter(user::Column::Username.eq(seed.username.as_str()))
        .one(&txn)
        .await?;
    if existing.is_some() {
        txn.rollback().await?;
        return Ok(());
    }

    let new_user = user::ActiveModel {
        username: Set(seed.username.clone()),
        password: Set(hash_password(&seed.password)?),
        ..Default::default()
    };

    match user::Entity::insert(new_user).exec(&txn).await {
        Ok(_) => {
            txn.commit().await?;
            tracing::info!(username = %seed.username, "Seeded API account");
            Ok(())
        }
        Err(err) => {
            let _ = txn.rollback().await;
            Err(err.into())
        }
    }
}
