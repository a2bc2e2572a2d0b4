//! `SeaORM` Entity for receivable_account_revenue_classifications table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "receivable_account_revenue_classifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub receivable_account_id: Uuid,
    pub revenue_type_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub percentage: Decimal,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::receivable_accounts::Entity",
        from = "Column::ReceivableAccountId",
        to = "super::receivable_accounts::Column::Id"
    )]
    ReceivableAccounts,
    #[sea_orm(
        belongs_to = "super::revenue_types::Entity",
        from = "Column::RevenueTypeId",
        to = "super::revenue_types::Column::Id"
    )]
    RevenueTypes,
}

impl Related<super::receivable_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReceivableAccounts.def()
    }
}

impl Related<super::revenue_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RevenueTypes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
