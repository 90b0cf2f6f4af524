use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use thiserror::Error;

use crate::entities::{
    category, category_product,
    image::{self, ImageableType},
    product, tax,
};
use crate::read_model::ProductAggregate;

/// Product ids bound per relation query.
pub const RELATION_CHUNK_SIZE: usize = 500;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Db(#[from] DbErr),
}

/// Read access to products together with their relations.
///
/// Handlers receive this through an `Extension`, so tests and alternative
/// stores can swap the implementation without touching routing.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// All products ordered by id.
    async fn list_products(&self) -> Result<Vec<ProductAggregate>, RepositoryError>;

    async fn find_product(&self, id: i32) -> Result<Option<ProductAggregate>, RepositoryError>;
}

#[derive(Clone)]
pub struct SeaOrmProductRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmProductRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> SeaOrmProductRepository {
        SeaOrmProductRepository { db }
    }
}

#[async_trait]
impl ProductRepository for SeaOrmProductRepository {
    async fn list_products(&self) -> Result<Vec<ProductAggregate>, RepositoryError> {
        let txn = self.db.begin().await?;

        let products = product::Entity::find()
            .find_also_related(tax::Entity)
            .order_by_asc(product::Column::Id)
            .all(&txn)
            .await?;
        let aggregates = load_relations(&txn, products).await?;

        txn.commit().await?;
        Ok(aggregates)
    }

    async fn find_product(&self, id: i32) -> Result<Option<ProductAggregate>, RepositoryError> {
        let txn = self.db.begin().await?;

        let found = product::Entity::find_by_id(id)
            .find_also_related(tax::Entity)
            .one(&txn)
            .await?;
        let aggregate = match found {
            Some(row) => load_relations(&txn, vec![row]).await?.pop(),
            None => None,
        };

        txn.commit().await?;
        Ok(aggregate)
    }
}

/// Attaches images and categories to already fetched products, querying each
/// relation in chunks of ids to stay under the bound-parameter limit. Images
/// are keyed by the `(product, id)` owner reference and the lowest image id
/// wins; categories keep pivot insertion order.
async fn load_relations<C: ConnectionTrait>(
    conn: &C,
    products: Vec<(product::Model, Option<tax::Model>)>,
) -> Result<Vec<ProductAggregate>, DbErr> {
    if products.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i32> = products.iter().map(|(product, _)| product.id).collect();

    // A product's rows always land in the same chunk, so per-chunk ordering is enough.
    let mut images: HashMap<i32, image::Model> = HashMap::new();
    let mut categories: HashMap<i32, Vec<category::Model>> = HashMap::new();
    for chunk in ids.chunks(RELATION_CHUNK_SIZE) {
        let found_images = image::Entity::find()
            .filter(image::Column::ImageableType.eq(ImageableType::Product))
            .filter(image::Column::ImageableId.is_in(chunk.iter().copied()))
            .order_by_asc(image::Column::Id)
            .all(conn)
            .await?;
        for image in found_images {
            images.entry(image.imageable_id).or_insert(image);
        }

        let links = category_product::Entity::find()
            .filter(category_product::Column::ProductId.is_in(chunk.iter().copied()))
            .find_also_related(category::Entity)
            .order_by_asc(category_product::Column::Id)
            .all(conn)
            .await?;
        for (link, category) in links {
            if let Some(category) = category {
                categories.entry(link.product_id).or_default().push(category);
            }
        }
    }

    let aggregates = products
        .into_iter()
        .map(|(product, tax)| ProductAggregate {
            image: images.remove(&product.id),
            categories: categories.remove(&product.id).unwrap_or_default(),
            product,
            tax,
        })
        .collect();
    Ok(aggregates)
}
