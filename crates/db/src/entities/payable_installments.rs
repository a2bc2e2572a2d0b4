//! `SeaORM` Entity for payable_installments table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payable_installments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub payable_account_id: Uuid,
    pub installment_number: i32,
    pub due_date: Date,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub installment_amount: Decimal,
    pub payment_date: Option<Date>,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))", nullable)]
    pub paid_amount: Option<Decimal>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::payable_accounts::Entity",
        from = "Column::PayableAccountId",
        to = "super::payable_accounts::Column::Id"
    )]
    PayableAccounts,
}

impl Related<super::payable_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PayableAccounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
