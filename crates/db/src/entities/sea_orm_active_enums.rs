//! `SeaORM` active enums mapped to PostgreSQL enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use finadmin_core::classification::ExpenseCategory as CoreCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "expense_category")]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    #[sea_orm(string_value = "agricultural_inputs")]
    AgriculturalInputs,
    #[sea_orm(string_value = "maintenance_operation")]
    MaintenanceOperation,
    #[sea_orm(string_value = "human_resources")]
    HumanResources,
    #[sea_orm(string_value = "operational_services")]
    OperationalServices,
    #[sea_orm(string_value = "infrastructure_utilities")]
    InfrastructureUtilities,
    #[sea_orm(string_value = "administrative")]
    Administrative,
    #[sea_orm(string_value = "insurance_protection")]
    InsuranceProtection,
    #[sea_orm(string_value = "taxes_fees")]
    TaxesFees,
    #[sea_orm(string_value = "investments")]
    Investments,
}

impl From<CoreCategory> for ExpenseCategory {
    fn from(category: CoreCategory) -> Self {
        match category {
            CoreCategory::AgriculturalInputs => Self::AgriculturalInputs,
            CoreCategory::MaintenanceOperation => Self::MaintenanceOperation,
            CoreCategory::HumanResources => Self::HumanResources,
            CoreCategory::OperationalServices => Self::OperationalServices,
            CoreCategory::InfrastructureUtilities => Self::InfrastructureUtilities,
            CoreCategory::Administrative => Self::Administrative,
            CoreCategory::InsuranceProtection => Self::InsuranceProtection,
            CoreCategory::TaxesFees => Self::TaxesFees,
            CoreCategory::Investments => Self::Investments,
        }
    }
}

impl From<ExpenseCategory> for CoreCategory {
    fn from(category: ExpenseCategory) -> Self {
        match category {
            ExpenseCategory::AgriculturalInputs => Self::AgriculturalInputs,
            ExpenseCategory::MaintenanceOperation => Self::MaintenanceOperation,
            ExpenseCategory::HumanResources => Self::HumanResources,
            ExpenseCategory::OperationalServices => Self::OperationalServices,
            ExpenseCategory::InfrastructureUtilities => Self::InfrastructureUtilities,
            ExpenseCategory::Administrative => Self::Administrative,
            ExpenseCategory::InsuranceProtection => Self::InsuranceProtection,
            ExpenseCategory::TaxesFees => Self::TaxesFees,
            ExpenseCategory::Investments => Self::Investments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_values_match_core_codes() {
        for core in CoreCategory::ALL {
            let db = ExpenseCategory::from(core);
            assert_eq!(db.to_value(), core.code());
            assert_eq!(CoreCategory::from(db), core);
        }
    }
}
