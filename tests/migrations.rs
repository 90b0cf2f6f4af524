mod common;

use baranki_catalog::{
    connect,
    entities::{category_product, product},
    migrations::Migrator,
};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait, PaginatorTrait,
    Set, Statement,
};

use common::*;

async fn product_columns(db: &DatabaseConnection) -> Vec<String> {
    db.query_all(Statement::from_string(
        DbBackend::Sqlite,
        "PRAGMA table_info(products)",
    ))
    .await
    .expect("Failed to read table info")
    .into_iter()
    .map(|row| row.try_get::<String>("", "name").expect("Missing column name"))
    .collect()
}

#[tokio::test]
async fn test_up_applies_each_migration_once() {
    let db = connect("sqlite::memory:").await.expect("Failed to connect");

    let first = Migrator::up(&db).await.expect("Failed to migrate");
    assert_eq!(first.len(), Migrator::migrations().len());

    let second = Migrator::up(&db).await.expect("Failed to migrate again");
    assert!(second.is_empty());

    assert!(product_columns(&db).await.contains(&"tax_id".to_owned()));
}

#[tokio::test]
async fn test_tax_id_references_taxes() {
    let db = fresh_database().await;

    let orphan = product::ActiveModel {
        name: Set("Orphan".to_owned()),
        price: Set(1.0),
        sku: Set("ORPHAN".to_owned()),
        stock: Set(1),
        active: Set(true),
        tax_id: Set(Some(9999)),
        ..Default::default()
    }
    .insert(db.as_ref())
    .await;
    assert!(orphan.is_err(), "foreign key should reject unknown tax");

    // The column itself is nullable.
    create_product_with_tax(&db, None).await;
}

#[tokio::test]
async fn test_down_drops_tax_id_and_keeps_rows() {
    let db = fresh_database().await;
    let created = create_products(&db, 3).await;
    let categories = create_categories(&db, 2).await;
    sync_categories(&db, created[0].id, &categories).await;

    let reverted = Migrator::down(&db, 1).await.expect("Failed to revert");
    assert_eq!(reverted, vec!["2019_01_26_194853_add_tax_id_products_table"]);

    let columns = product_columns(&db).await;
    assert!(!columns.contains(&"tax_id".to_owned()));
    assert!(columns.contains(&"sku".to_owned()));

    let count = db
        .query_all(Statement::from_string(
            DbBackend::Sqlite,
            "SELECT id FROM products",
        ))
        .await
        .expect("Failed to count products")
        .len();
    assert_eq!(count, 3);

    // Pivot rows still point at the rebuilt table.
    let links = category_product::Entity::find()
        .count(db.as_ref())
        .await
        .expect("Failed to count links");
    assert_eq!(links, 2);

    let reapplied = Migrator::up(&db).await.expect("Failed to reapply");
    assert_eq!(reapplied, vec!["2019_01_26_194853_add_tax_id_products_table"]);
    assert!(product_columns(&db).await.contains(&"tax_id".to_owned()));

    let restored = product::Entity::find()
        .all(db.as_ref())
        .await
        .expect("Failed to load products");
    assert_eq!(restored.len(), 3);
    assert!(restored.iter().all(|product| product.tax_id.is_none()));
}

#[tokio::test]
async fn test_down_everything_then_up_again() {
    let db = fresh_database().await;

    let reverted = Migrator::down(&db, usize::MAX).await.expect("Failed to revert");
    assert_eq!(reverted.len(), Migrator::migrations().len());
    assert!(Migrator::applied(&db).await.expect("Failed to read").is_empty());

    let reapplied = Migrator::up(&db).await.expect("Failed to reapply");
    assert_eq!(reapplied.len(), Migrator::migrations().len());
    create_product(&db).await;
}
