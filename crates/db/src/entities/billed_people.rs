//! `SeaORM` Entity for billed_people table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "billed_people")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub full_name: String,
    #[sea_orm(unique)]
    pub document_id: String,
    pub active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::payable_accounts::Entity")]
    PayableAccounts,
}

impl Related<super::payable_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PayableAccounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
