//! `SeaORM` Entity for receivable_accounts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "receivable_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub document_number: Option<String>,
    pub issue_date: Date,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub total_amount: Decimal,
    pub customer_id: Uuid,
    pub active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customers::Entity",
        from = "Column::CustomerId",
        to = "super::customers::Column::Id"
    )]
    Customers,
    #[sea_orm(has_many = "super::receivable_installments::Entity")]
    ReceivableInstallments,
    #[sea_orm(has_many = "super::receivable_account_revenue_classifications::Entity")]
    ReceivableAccountRevenueClassifications,
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customers.def()
    }
}

impl Related<super::receivable_installments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReceivableInstallments.def()
    }
}

impl Related<super::receivable_account_revenue_classifications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReceivableAccountRevenueClassifications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
