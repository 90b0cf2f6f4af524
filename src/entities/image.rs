use sea_orm::entity::prelude::*;
use serde::Serialize;
use std::fmt;

/// An image attached to some owner row. The owner is a tagged reference:
/// `imageable_type` says which table `imageable_id` points into, so there is
/// no database-level foreign key on it.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "images")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub imageable_type: ImageableType,
    #[sea_orm(indexed)]
    pub imageable_id: i32,
    pub path: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, EnumIter, DeriveActiveEnum, Serialize)]
#[sea_orm(
    enum_name = "imageable_type_enum",
    db_type = "String(StringLen::N(255))",
    rs_type = "String"
)]
#[serde(rename_all = "lowercase")]
pub enum ImageableType {
    #[sea_orm(string_value = "product")]
    Product,
    #[sea_orm(string_value = "category")]
    Category,
}

impl ImageableType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageableType::Product => "product",
            ImageableType::Category => "category",
        }
    }
}

impl fmt::Display for ImageableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
