//! `SeaORM` Entity for expense_types table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::ExpenseCategory;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expense_types")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub description: String,
    pub category: ExpenseCategory,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::payable_account_expense_classifications::Entity")]
    PayableAccountExpenseClassifications,
}

impl Related<super::payable_account_expense_classifications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PayableAccountExpenseClassifications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
