//! Expense type repository for database operations.
//!
//! Every expense type belongs to one of the nine catalog categories. The
//! invoice import reuses the oldest active type of a category before
//! creating a new one.

use finadmin_shared::types::{ExpenseTypeId, PageRequest, PageResponse};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::info;
use uuid::Uuid;

use super::common::{active_filter, contains_ci, fetch_page, now};
use crate::entities::{expense_types, sea_orm_active_enums::ExpenseCategory};

/// Error types for expense type operations.
#[derive(Debug, thiserror::Error)]
pub enum ExpenseTypeError {
    /// Expense type not found or inactive.
    #[error("Expense type not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating an expense type.
#[derive(Debug, Clone)]
pub struct CreateExpenseTypeInput {
    /// Description.
    pub description: String,
    /// Catalog category.
    pub category: ExpenseCategory,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Input for updating an expense type.
#[derive(Debug, Clone, Default)]
pub struct UpdateExpenseTypeInput {
    /// Description.
    pub description: Option<String>,
    /// Catalog category.
    pub category: Option<ExpenseCategory>,
    /// Notes; `Some(None)` clears them.
    pub notes: Option<Option<String>>,
}

/// Filter options for listing expense types.
#[derive(Debug, Clone, Default)]
pub struct ExpenseTypeFilter {
    /// Catalog category.
    pub category: Option<ExpenseCategory>,
    /// Case-insensitive substring of the description.
    pub description: Option<String>,
    /// Active status; `None` lists active types.
    pub active: Option<bool>,
}

/// Expense type repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct ExpenseTypeRepository {
    db: DatabaseConnection,
}

impl ExpenseTypeRepository {
    /// Creates a new expense type repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an expense type.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create(
        &self,
        input: CreateExpenseTypeInput,
    ) -> Result<expense_types::Model, ExpenseTypeError> {
        let expense_type = insert(&self.db, input).await?;
        info!(
            expense_type_id = %expense_type.id,
            category = ?expense_type.category,
            "Expense type created"
        );
        Ok(expense_type)
    }

    /// Finds an active expense type by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<expense_types::Model>, DbErr> {
        expense_types::Entity::find_by_id(id)
            .filter(expense_types::Column::Active.eq(true))
            .one(&self.db)
            .await
    }

    /// Gets an active expense type by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for missing or inactive types.
    pub async fn get(&self, id: Uuid) -> Result<expense_types::Model, ExpenseTypeError> {
        self.find_by_id(id)
            .await?
            .ok_or(ExpenseTypeError::NotFound(id))
    }

    /// Lists active expense types of one category, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_active_by_category(
        &self,
        category: ExpenseCategory,
    ) -> Result<Vec<expense_types::Model>, DbErr> {
        by_category(category).all(&self.db).await
    }

    /// Lists expense types.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: ExpenseTypeFilter,
        page: PageRequest,
    ) -> Result<PageResponse<expense_types::Model>, DbErr> {
        let mut condition =
            Condition::all().add(active_filter(expense_types::Column::Active, filter.active));
        if let Some(category) = filter.category {
            condition = condition.add(expense_types::Column::Category.eq(category));
        }
        if let Some(description) = filter.description.as_deref() {
            condition = condition.add(contains_ci(expense_types::Column::Description, description));
        }

        let select = expense_types::Entity::find()
            .filter(condition)
            .order_by_asc(expense_types::Column::Description)
            .order_by_asc(expense_types::Column::Id);
        fetch_page(&self.db, select, page).await
    }

    /// Searches active expense types by description.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn search(
        &self,
        term: &str,
        page: PageRequest,
    ) -> Result<PageResponse<expense_types::Model>, DbErr> {
        let select = expense_types::Entity::find()
            .filter(expense_types::Column::Active.eq(true))
            .filter(contains_ci(expense_types::Column::Description, term))
            .order_by_asc(expense_types::Column::Description)
            .order_by_asc(expense_types::Column::Id);
        fetch_page(&self.db, select, page).await
    }

    /// Updates an active expense type.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for missing or inactive types.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateExpenseTypeInput,
    ) -> Result<expense_types::Model, ExpenseTypeError> {
        let existing = self.get(id).await?;

        let mut expense_type: expense_types::ActiveModel = existing.into();
        if let Some(description) = input.description {
            expense_type.description = Set(description);
        }
        if let Some(category) = input.category {
            expense_type.category = Set(category);
        }
        if let Some(notes) = input.notes {
            expense_type.notes = Set(notes);
        }
        expense_type.updated_at = Set(now());

        let expense_type = expense_type.update(&self.db).await?;
        info!(expense_type_id = %expense_type.id, "Expense type updated");
        Ok(expense_type)
    }

    /// Soft-deletes an active expense type.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for missing or inactive types.
    pub async fn soft_delete(&self, id: Uuid) -> Result<(), ExpenseTypeError> {
        let existing = self.get(id).await?;

        let mut expense_type: expense_types::ActiveModel = existing.into();
        expense_type.active = Set(false);
        expense_type.updated_at = Set(now());
        expense_type.update(&self.db).await?;

        info!(expense_type_id = %id, "Expense type deactivated");
        Ok(())
    }

    /// Reactivates an expense type.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no expense type has this ID.
    pub async fn reactivate(&self, id: Uuid) -> Result<expense_types::Model, ExpenseTypeError> {
        let existing = expense_types::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ExpenseTypeError::NotFound(id))?;
        if existing.active {
            return Ok(existing);
        }

        let mut expense_type: expense_types::ActiveModel = existing.into();
        expense_type.active = Set(true);
        expense_type.updated_at = Set(now());
        let expense_type = expense_type.update(&self.db).await?;

        info!(expense_type_id = %id, "Expense type reactivated");
        Ok(expense_type)
    }
}

fn by_category(category: ExpenseCategory) -> sea_orm::Select<expense_types::Entity> {
    expense_types::Entity::find()
        .filter(expense_types::Column::Category.eq(category))
        .filter(expense_types::Column::Active.eq(true))
        .order_by_asc(expense_types::Column::CreatedAt)
        .order_by_asc(expense_types::Column::Id)
}

pub(crate) async fn insert<C: ConnectionTrait>(
    db: &C,
    input: CreateExpenseTypeInput,
) -> Result<expense_types::Model, DbErr> {
    let now = now();
    expense_types::ActiveModel {
        id: Set(ExpenseTypeId::new().into_inner()),
        description: Set(input.description),
        category: Set(input.category),
        notes: Set(input.notes),
        active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
}

/// Returns the oldest active expense type of `category`, creating one
/// described by the category label when none exists.
pub(crate) async fn get_or_create_for_category<C: ConnectionTrait>(
    db: &C,
    category: ExpenseCategory,
) -> Result<(expense_types::Model, bool), DbErr> {
    if let Some(existing) = by_category(category).one(db).await? {
        return Ok((existing, false));
    }

    let core = finadmin_core::classification::ExpenseCategory::from(category);
    let created = insert(
        db,
        CreateExpenseTypeInput {
            description: core.label().to_string(),
            category,
            notes: Some(core.description().to_string()),
        },
    )
    .await?;
    Ok((created, true))
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;

    fn expense_type(category: ExpenseCategory) -> expense_types::Model {
        let now = now();
        expense_types::Model {
            id: Uuid::new_v4(),
            description: "Fertilizantes".to_string(),
            category,
            notes: None,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_get_or_create_reuses_existing() {
        let existing = expense_type(ExpenseCategory::AgriculturalInputs);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing.clone()]])
            .into_connection();

        let (found, created) =
            get_or_create_for_category(&db, ExpenseCategory::AgriculturalInputs)
                .await
                .unwrap();
        assert_eq!(found, existing);
        assert!(!created);
    }

    #[tokio::test]
    async fn test_get_or_create_uses_category_label() {
        let mut inserted = expense_type(ExpenseCategory::TaxesFees);
        inserted.description = "IMPOSTOS E TAXAS".to_string();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<expense_types::Model>::new()])
            .append_query_results([vec![inserted.clone()]])
            .into_connection();

        let (found, created) = get_or_create_for_category(&db, ExpenseCategory::TaxesFees)
            .await
            .unwrap();
        assert!(created);
        assert_eq!(found.description, "IMPOSTOS E TAXAS");

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("INSERT INTO \\\"expense_types\\\""), "{log}");
        assert!(log.contains("IMPOSTOS E TAXAS"), "{log}");
    }

    #[tokio::test]
    async fn test_update_clears_notes() {
        let mut existing = expense_type(ExpenseCategory::Administrative);
        existing.notes = Some("old".to_string());
        let mut updated = existing.clone();
        updated.notes = None;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing.clone()]])
            .append_query_results([vec![updated.clone()]])
            .into_connection();

        let result = ExpenseTypeRepository::new(db)
            .update(
                existing.id,
                UpdateExpenseTypeInput {
                    notes: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(result.notes.is_none());
    }
}
