//! `SeaORM` Entity for revenue_types table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "revenue_types")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub description: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::receivable_account_revenue_classifications::Entity")]
    ReceivableAccountRevenueClassifications,
}

impl Related<super::receivable_account_revenue_classifications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReceivableAccountRevenueClassifications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
