//! The shape products take on the wire.
//!
//! A [`ProductAggregate`] is what the repository hands over: a product row and
//! whatever relations were found for it. [`ProductResponse::assemble`] turns it
//! into the JSON record clients consume. The rules clients rely on:
//!
//! * `tax` is always an object. A product without a resolvable tax is a broken
//!   row, and assembling it fails instead of emitting `null`.
//! * `image` is always present as a key, `null` when there is no image.
//! * `categories` is always a list, empty when there are none.

use serde::Serialize;
use thiserror::Error;

use crate::entities::{
    category,
    image::{self, ImageableType},
    product, tax,
};

#[derive(Clone, Debug, PartialEq)]
pub struct ProductAggregate {
    pub product: product::Model,
    pub tax: Option<tax::Model>,
    pub image: Option<image::Model>,
    pub categories: Vec<category::Model>,
}

#[derive(Error, Debug, PartialEq)]
pub enum ReadModelError {
    #[error("Product {product_id} has no resolvable tax")]
    MissingTax { product_id: i32 },
    #[error("Product {product_id} references tax {expected:?} but tax {found} was supplied")]
    TaxMismatch {
        product_id: i32,
        expected: Option<i32>,
        found: i32,
    },
    #[error("Image {image_id} belongs to {owner_type} {owner_id}, not product {product_id}")]
    ForeignImage {
        product_id: i32,
        image_id: i32,
        owner_type: ImageableType,
        owner_id: i32,
    },
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ProductListResponse {
    pub products: Vec<ProductResponse>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ProductResponse {
    pub id: i32,
    pub name: String,
    pub price: f64,
    pub sku: String,
    pub stock: i32,
    pub active: bool,
    pub tax: TaxResponse,
    pub image: Option<ImageResponse>,
    pub categories: Vec<CategoryResponse>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct TaxResponse {
    pub id: i32,
    pub name: String,
    pub value: f64,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ImageResponse {
    pub id: i32,
    pub imageable_id: i32,
    pub imageable_type: ImageableType,
    pub path: String,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct CategoryResponse {
    pub id: i32,
    pub name: String,
    pub description: String,
}

impl ProductResponse {
    pub fn assemble(aggregate: ProductAggregate) -> Result<ProductResponse, ReadModelError> {
        let ProductAggregate {
            product,
            tax,
            image,
            categories,
        } = aggregate;

        let tax = match tax {
            Some(tax) if product.tax_id == Some(tax.id) => TaxResponse::new(tax),
            Some(tax) => {
                return Err(ReadModelError::TaxMismatch {
                    product_id: product.id,
                    expected: product.tax_id,
                    found: tax.id,
                })
            }
            None => return Err(ReadModelError::MissingTax { product_id: product.id }),
        };

        let image = match image {
            Some(image)
                if image.imageable_type == ImageableType::Product
                    && image.imageable_id == product.id =>
            {
                Some(ImageResponse::new(image))
            }
            Some(image) => {
                return Err(ReadModelError::ForeignImage {
                    product_id: product.id,
                    image_id: image.id,
                    owner_type: image.imageable_type,
                    owner_id: image.imageable_id,
                })
            }
            None => None,
        };

        Ok(ProductResponse {
            id: product.id,
            name: product.name,
            price: product.price,
            sku: product.sku,
            stock: product.stock,
            active: product.active,
            tax,
            image,
            categories: categories.into_iter().map(CategoryResponse::new).collect(),
        })
    }
}

impl ProductListResponse {
    /// Assembles every product, failing on the first broken one.
    pub fn assemble(aggregates: Vec<ProductAggregate>) -> Result<ProductListResponse, ReadModelError> {
        let products = aggregates
            .into_iter()
            .map(ProductResponse::assemble)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ProductListResponse { products })
    }
}

impl TaxResponse {
    fn new(value: tax::Model) -> TaxResponse {
        TaxResponse {
            id: value.id,
            name: value.name,
            value: value.value,
        }
    }
}

impl ImageResponse {
    fn new(value: image::Model) -> ImageResponse {
        ImageResponse {
            id: value.id,
            imageable_id: value.imageable_id,
            imageable_type: value.imageable_type,
            path: value.path,
        }
    }
}

impl CategoryResponse {
    fn new(value: category::Model) -> CategoryResponse {
        CategoryResponse {
            id: value.id,
            name: value.name,
            description: value.description,
        }
    }
}
