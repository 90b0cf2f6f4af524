#![allow(dead_code)]

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use baranki_catalog::{
    api::{create_api_router, create_api_router_with},
    config::SeedAccount,
    connect,
    entities::{
        category, category_product,
        image::{self, ImageableType},
        primary_setup, product, setup_schema, tax,
    },
    middleware::auth::AuthKeys,
    repository::ProductRepository,
};
use axum::Router;
use reqwest::{Client, StatusCode};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde_json::json;

pub const JWT_SECRET: &str = "test-secret";
pub const USERNAME: &str = "user";
pub const PASSWORD: &str = "12345";

static SEQUENCE: AtomicI32 = AtomicI32::new(1);

fn next_sequence() -> i32 {
    SEQUENCE.fetch_add(1, Ordering::Relaxed)
}

pub fn auth_keys() -> AuthKeys {
    AuthKeys {
        secret: JWT_SECRET.to_owned(),
        token_ttl_hours: 1,
    }
}

/// A fresh in-memory database with the schema applied and the API account seeded.
pub async fn fresh_database() -> Arc<DatabaseConnection> {
    let db = connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    setup_schema(&db).await.expect("Failed to migrate schema");
    primary_setup(
        &db,
        &SeedAccount {
            username: USERNAME.to_owned(),
            password: PASSWORD.to_owned(),
        },
    )
    .await
    .expect("Failed to seed API account");
    Arc::new(db)
}

pub struct TestServer {
    pub base_url: String,
    pub db: Arc<DatabaseConnection>,
    pub client: Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn() -> Self {
        let db = fresh_database().await;
        let app = create_api_router(db.clone(), auth_keys());
        Self::serve(db, app).await
    }

    pub async fn spawn_with(repository: Arc<dyn ProductRepository>) -> Self {
        let db = fresh_database().await;
        let app = create_api_router_with(db.clone(), auth_keys(), repository);
        Self::serve(db, app).await
    }

    async fn serve(db: Arc<DatabaseConnection>, app: Router) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind ephemeral port");
        let addr = listener.local_addr().expect("Failed to read local address");
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server crashed");
        });

        Self {
            base_url,
            db,
            client: Client::new(),
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn login(&self) -> String {
        let response = self
            .client
            .post(self.url("/api/login"))
            .json(&json!({
                "username": USERNAME,
                "password": PASSWORD
            }))
            .send()
            .await
            .expect("Failed to send login request");
        assert_eq!(response.status(), StatusCode::OK);

        let body = response
            .json::<serde_json::Value>()
            .await
            .expect("Failed to parse login response JSON");
        body["token"]
            .as_str()
            .expect("Token not found in login response")
            .to_owned()
    }

    /// Logs in and fetches `path`, returning status and parsed body.
    pub async fn get_json(&self, path: &str) -> (StatusCode, serde_json::Value) {
        let token = self.login().await;
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to send request");
        let status = response.status();
        let body = response
            .json::<serde_json::Value>()
            .await
            .expect("Failed to parse response JSON");
        (status, body)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// Fixture factories

pub async fn create_tax(db: &DatabaseConnection) -> tax::Model {
    tax::ActiveModel {
        name: Set(format!("VAT {}", next_sequence())),
        value: Set(21.0),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert tax")
}

pub async fn create_product_with_tax(db: &DatabaseConnection, tax_id: Option<i32>) -> product::Model {
    let n = next_sequence();
    product::ActiveModel {
        name: Set(format!("Bagel {n}")),
        price: Set(2.5),
        sku: Set(format!("BGL-{n:05}")),
        stock: Set(10),
        active: Set(true),
        tax_id: Set(tax_id),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert product")
}

pub async fn create_product(db: &DatabaseConnection) -> product::Model {
    let tax = create_tax(db).await;
    create_product_with_tax(db, Some(tax.id)).await
}

pub async fn create_products(db: &DatabaseConnection, count: usize) -> Vec<product::Model> {
    let mut products = Vec::with_capacity(count);
    for _ in 0..count {
        products.push(create_product(db).await);
    }
    products
}

pub async fn create_image(
    db: &DatabaseConnection,
    imageable_type: ImageableType,
    imageable_id: i32,
) -> image::Model {
    image::ActiveModel {
        imageable_type: Set(imageable_type),
        imageable_id: Set(imageable_id),
        path: Set(format!("images/{}-{}.png", imageable_type, next_sequence())),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert image")
}

pub async fn create_categories(db: &DatabaseConnection, count: usize) -> Vec<category::Model> {
    let mut categories = Vec::with_capacity(count);
    for _ in 0..count {
        let n = next_sequence();
        let category = category::ActiveModel {
            name: Set(format!("Category {n}")),
            description: Set(format!("Description of category {n}")),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to insert category");
        categories.push(category);
    }
    categories
}

/// Links the product to exactly the given categories.
pub async fn sync_categories(db: &DatabaseConnection, product_id: i32, categories: &[category::Model]) {
    use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

    category_product::Entity::delete_many()
        .filter(category_product::Column::ProductId.eq(product_id))
        .exec(db)
        .await
        .expect("Failed to clear category links");

    for category in categories {
        category_product::ActiveModel {
            product_id: Set(product_id),
            category_id: Set(category.id),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to link category");
    }
}
