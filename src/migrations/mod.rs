//! Ordered schema migrations with a bookkeeping table.
//!
//! Each migration knows how to apply and revert itself. [`Migrator`] keeps
//! track of what has been applied in `schema_migrations`, so `up` only runs
//! pending steps and `down` unwinds the most recent ones in reverse order.

mod add_tax_id_to_products;
mod create_catalog_tables;

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Schema, Set,
};
use thiserror::Error;

use crate::entities::schema_migration::{self, Entity as SchemaMigration};

pub use add_tax_id_to_products::AddTaxIdToProducts;
pub use create_catalog_tables::CreateCatalogTables;

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("Migration `{name}` failed to apply: {source}")]
    Up { name: &'static str, source: DbErr },
    #[error("Migration `{name}` failed to revert: {source}")]
    Down { name: &'static str, source: DbErr },
    #[error("Database error: {0}")]
    Db(#[from] DbErr),
}

#[async_trait]
pub trait Migration: Send + Sync {
    fn name(&self) -> &'static str;

    async fn up(&self, db: &DatabaseConnection) -> Result<(), DbErr>;

    async fn down(&self, db: &DatabaseConnection) -> Result<(), DbErr>;
}

pub struct Migrator;

impl Migrator {
    pub fn migrations() -> Vec<Box<dyn Migration>> {
        vec![Box::new(CreateCatalogTables), Box::new(AddTaxIdToProducts)]
    }

    /// Applies every pending migration, returning the names that ran.
    pub async fn up(db: &DatabaseConnection) -> Result<Vec<&'static str>, MigrationError> {
        let applied = Self::applied(db).await?;
        let mut ran = Vec::new();

        for migration in Self::migrations() {
            let name = migration.name();
            if applied.contains(name) {
                continue;
            }
            migration
                .up(db)
                .await
                .map_err(|source| MigrationError::Up { name, source })?;

            let record = schema_migration::ActiveModel {
                name: Set(name.to_owned()),
                applied_at: Set(Utc::now().timestamp()),
            };
            SchemaMigration::insert(record).exec(db).await?;
            ran.push(name);
        }

        Ok(ran)
    }

    /// Reverts up to `steps` of the most recently applied migrations.
    pub async fn down(
        db: &DatabaseConnection,
        steps: usize,
    ) -> Result<Vec<&'static str>, MigrationError> {
        let applied = Self::applied(db).await?;
        let mut reverted = Vec::new();

        let pending_revert = Self::migrations()
            .into_iter()
            .rev()
            .filter(|migration| applied.contains(migration.name()))
            .take(steps);

        for migration in pending_revert {
            let name = migration.name();
            migration
                .down(db)
                .await
                .map_err(|source| MigrationError::Down { name, source })?;

            SchemaMigration::delete_many()
                .filter(schema_migration::Column::Name.eq(name))
                .exec(db)
                .await?;
            reverted.push(name);
        }

        Ok(reverted)
    }

    /// Names of applied migrations; creates the bookkeeping table on first use.
    pub async fn applied(db: &DatabaseConnection) -> Result<HashSet<String>, MigrationError> {
        let backend = db.get_database_backend();
        let mut create_table = Schema::new(backend).create_table_from_entity(SchemaMigration);
        create_table.if_not_exists();
        db.execute(backend.build(&create_table)).await?;

        let applied = SchemaMigration::find()
            .all(db)
            .await?
            .into_iter()
            .map(|record| record.name)
            .collect();
        Ok(applied)
    }
}
