//! `SeaORM` Entity for payable_account_expense_classifications table.
//!
//! Link rows belong to their account and are replaced, never soft-deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payable_account_expense_classifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub payable_account_id: Uuid,
    pub expense_type_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub percentage: Decimal,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::payable_accounts::Entity",
        from = "Column::PayableAccountId",
        to = "super::payable_accounts::Column::Id"
    )]
    PayableAccounts,
    #[sea_orm(
        belongs_to = "super::expense_types::Entity",
        from = "Column::ExpenseTypeId",
        to = "super::expense_types::Column::Id"
    )]
    ExpenseTypes,
}

impl Related<super::payable_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PayableAccounts.def()
    }
}

impl Related<super::expense_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExpenseTypes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
