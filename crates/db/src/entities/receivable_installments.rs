//! `SeaORM` Entity for receivable_installments table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "receivable_installments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub receivable_account_id: Uuid,
    pub installment_number: i32,
    pub due_date: Date,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub installment_amount: Decimal,
    pub receipt_date: Option<Date>,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))", nullable)]
    pub received_amount: Option<Decimal>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::receivable_accounts::Entity",
        from = "Column::ReceivableAccountId",
        to = "super::receivable_accounts::Column::Id"
    )]
    ReceivableAccounts,
}

impl Related<super::receivable_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReceivableAccounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
