use async_trait::async_trait;
use sea_orm::sea_query::{ColumnDef, IntoTableRef, Table, TableCreateStatement, TableDropStatement};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, DeriveIden, EntityTrait, Schema};

use super::Migration;
use crate::entities::{category, category_product, image, tax, user};

#[derive(DeriveIden)]
pub(super) enum Products {
    Table,
    Id,
    Name,
    Price,
    Sku,
    Stock,
    Active,
    TaxId,
}

/// The `products` table as it looked before taxes were attached to it.
pub(super) fn products_table<T: IntoTableRef>(table: T) -> TableCreateStatement {
    Table::create()
        .table(table)
        .col(
            ColumnDef::new(Products::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(Products::Name).string().not_null())
        .col(ColumnDef::new(Products::Price).double().not_null())
        .col(ColumnDef::new(Products::Sku).string().not_null().unique_key())
        .col(ColumnDef::new(Products::Stock).integer().not_null())
        .col(ColumnDef::new(Products::Active).boolean().not_null().default(true))
        .to_owned()
}

fn drop_table<E: EntityTrait>(entity: E) -> TableDropStatement {
    Table::drop().table(entity).if_exists().to_owned()
}

pub struct CreateCatalogTables;

#[async_trait]
impl Migration for CreateCatalogTables {
    fn name(&self) -> &'static str {
        "create_catalog_tables"
    }

    async fn up(&self, db: &DatabaseConnection) -> Result<(), DbErr> {
        let backend = db.get_database_backend();
        let schema = Schema::new(backend);

        let statements = [
            schema.create_table_from_entity(tax::Entity),
            products_table(Products::Table),
            schema.create_table_from_entity(category::Entity),
            schema.create_table_from_entity(category_product::Entity),
            schema.create_table_from_entity(image::Entity),
            schema.create_table_from_entity(user::Entity),
        ];

        for statement in statements.iter() {
            db.execute(backend.build(statement)).await?;
        }
        Ok(())
    }

    async fn down(&self, db: &DatabaseConnection) -> Result<(), DbErr> {
        let backend = db.get_database_backend();

        let statements = [
            drop_table(user::Entity),
            drop_table(image::Entity),
            drop_table(category_product::Entity),
            drop_table(category::Entity),
            Table::drop().table(Products::Table).if_exists().to_owned(),
            drop_table(tax::Entity),
        ];

        for statement in statements.iter() {
            db.execute(backend.build(statement)).await?;
        }
        Ok(())
    }
}
