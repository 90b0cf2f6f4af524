use sea_orm::entity::prelude::*;
use serde::Serialize;
use crate::entities::tax::Entity as Tax;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub price: f64,
    #[sea_orm(unique)]
    pub sku: String,
    pub stock: i32,
    pub active: bool,
    // Nullable in the schema while older rows are backfilled; the read path
    // refuses to serve a product without one.
    pub tax_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Tax",
        from = "crate::entities::product::Column::TaxId",
        to = "crate::entities::tax::Column::Id",
    )]
    Tax,
}

impl ActiveModelBehavior for ActiveModel {}

impl Related<crate::entities::tax::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tax.def()
    }
}
