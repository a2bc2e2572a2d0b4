//! `SeaORM` Entity for payable_accounts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payable_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub invoice_number: Option<String>,
    pub issue_date: Date,
    #[sea_orm(column_type = "Text")]
    pub product_description: String,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub total_amount: Decimal,
    pub supplier_id: Uuid,
    pub billed_person_id: Option<Uuid>,
    pub active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::suppliers::Entity",
        from = "Column::SupplierId",
        to = "super::suppliers::Column::Id"
    )]
    Suppliers,
    #[sea_orm(
        belongs_to = "super::billed_people::Entity",
        from = "Column::BilledPersonId",
        to = "super::billed_people::Column::Id"
    )]
    BilledPeople,
    #[sea_orm(has_many = "super::payable_installments::Entity")]
    PayableInstallments,
    #[sea_orm(has_many = "super::payable_account_expense_classifications::Entity")]
    PayableAccountExpenseClassifications,
}

impl Related<super::suppliers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Suppliers.def()
    }
}

impl Related<super::billed_people::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BilledPeople.def()
    }
}

impl Related<super::payable_installments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PayableInstallments.def()
    }
}

impl Related<super::payable_account_expense_classifications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PayableAccountExpenseClassifications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
