use async_trait::async_trait;
use sea_orm::sea_query::{Alias, ColumnDef, Table, TableForeignKey};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, DbErr, DeriveIden};

use super::create_catalog_tables::{products_table, Products};
use super::Migration;

const TAX_FOREIGN_KEY: &str = "products_tax_id_foreign";
const ROLLBACK_TABLE: &str = "products_rollback";

#[derive(DeriveIden)]
enum Taxes {
    Table,
    Id,
}

/// Adds the nullable `products.tax_id -> taxes.id` reference.
pub struct AddTaxIdToProducts;

#[async_trait]
impl Migration for AddTaxIdToProducts {
    fn name(&self) -> &'static str {
        "2019_01_26_194853_add_tax_id_products_table"
    }

    async fn up(&self, db: &DatabaseConnection) -> Result<(), DbErr> {
        match db.get_database_backend() {
            // SQLite only accepts a foreign key on ALTER as an inline column constraint.
            DbBackend::Sqlite => {
                db.execute_unprepared(
                    r#"ALTER TABLE "products" ADD COLUMN "tax_id" integer NULL REFERENCES "taxes" ("id")"#,
                )
                .await?;
            }
            backend => {
                let add_column = Table::alter()
                    .table(Products::Table)
                    .add_column(ColumnDef::new(Products::TaxId).integer().null())
                    .add_foreign_key(
                        TableForeignKey::new()
                            .name(TAX_FOREIGN_KEY)
                            .from_tbl(Products::Table)
                            .from_col(Products::TaxId)
                            .to_tbl(Taxes::Table)
                            .to_col(Taxes::Id),
                    )
                    .to_owned();
                db.execute(backend.build(&add_column)).await?;
            }
        }
        Ok(())
    }

    async fn down(&self, db: &DatabaseConnection) -> Result<(), DbErr> {
        match db.get_database_backend() {
            // SQLite refuses to drop a column that takes part in a foreign key,
            // so the table is rebuilt without it. Everything runs in one call to
            // stay on one connection while foreign keys are switched off.
            DbBackend::Sqlite => {
                let create = DbBackend::Sqlite
                    .build(&products_table(Alias::new(ROLLBACK_TABLE)))
                    .sql;
                let columns = r#""id", "name", "price", "sku", "stock", "active""#;
                let rebuild = format!(
                    r#"PRAGMA foreign_keys = OFF;
BEGIN;
{create};
INSERT INTO "{ROLLBACK_TABLE}" ({columns}) SELECT {columns} FROM "products";
DROP TABLE "products";
ALTER TABLE "{ROLLBACK_TABLE}" RENAME TO "products";
COMMIT;
PRAGMA foreign_keys = ON;"#
                );
                db.execute_unprepared(&rebuild).await?;
            }
            backend => {
                let drop_foreign = Table::alter()
                    .table(Products::Table)
                    .drop_foreign_key(Alias::new(TAX_FOREIGN_KEY))
                    .to_owned();
                db.execute(backend.build(&drop_foreign)).await?;

                let drop_column = Table::alter()
                    .table(Products::Table)
                    .drop_column(Products::TaxId)
                    .to_owned();
                db.execute(backend.build(&drop_column)).await?;
            }
        }
        Ok(())
    }
}
