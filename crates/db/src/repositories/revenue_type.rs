//! Revenue type repository for database operations.

use finadmin_shared::types::{PageRequest, PageResponse, RevenueTypeId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::info;
use uuid::Uuid;

use super::common::{active_filter, contains_ci, fetch_page, now};
use crate::entities::revenue_types;

/// Error types for revenue type operations.
#[derive(Debug, thiserror::Error)]
pub enum RevenueTypeError {
    /// Revenue type not found or inactive.
    #[error("Revenue type not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a revenue type.
#[derive(Debug, Clone)]
pub struct CreateRevenueTypeInput {
    /// Description.
    pub description: String,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Input for updating a revenue type.
#[derive(Debug, Clone, Default)]
pub struct UpdateRevenueTypeInput {
    /// Description.
    pub description: Option<String>,
    /// Notes; `Some(None)` clears them.
    pub notes: Option<Option<String>>,
}

/// Filter options for listing revenue types.
#[derive(Debug, Clone, Default)]
pub struct RevenueTypeFilter {
    /// Case-insensitive substring of the description.
    pub description: Option<String>,
    /// Active status; `None` lists active types.
    pub active: Option<bool>,
}

/// Revenue type repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct RevenueTypeRepository {
    db: DatabaseConnection,
}

impl RevenueTypeRepository {
    /// Creates a new revenue type repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a revenue type.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create(
        &self,
        input: CreateRevenueTypeInput,
    ) -> Result<revenue_types::Model, RevenueTypeError> {
        let now = now();
        let revenue_type = revenue_types::ActiveModel {
            id: Set(RevenueTypeId::new().into_inner()),
            description: Set(input.description),
            notes: Set(input.notes),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!(revenue_type_id = %revenue_type.id, "Revenue type created");
        Ok(revenue_type)
    }

    /// Finds an active revenue type by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<revenue_types::Model>, DbErr> {
        revenue_types::Entity::find_by_id(id)
            .filter(revenue_types::Column::Active.eq(true))
            .one(&self.db)
            .await
    }

    /// Gets an active revenue type by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for missing or inactive types.
    pub async fn get(&self, id: Uuid) -> Result<revenue_types::Model, RevenueTypeError> {
        self.find_by_id(id)
            .await?
            .ok_or(RevenueTypeError::NotFound(id))
    }

    /// Lists revenue types.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: RevenueTypeFilter,
        page: PageRequest,
    ) -> Result<PageResponse<revenue_types::Model>, DbErr> {
        let mut condition =
            Condition::all().add(active_filter(revenue_types::Column::Active, filter.active));
        if let Some(description) = filter.description.as_deref() {
            condition = condition.add(contains_ci(revenue_types::Column::Description, description));
        }

        let select = revenue_types::Entity::find()
            .filter(condition)
            .order_by_asc(revenue_types::Column::Description)
            .order_by_asc(revenue_types::Column::Id);
        fetch_page(&self.db, select, page).await
    }

    /// Searches active revenue types by description.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn search(
        &self,
        term: &str,
        page: PageRequest,
    ) -> Result<PageResponse<revenue_types::Model>, DbErr> {
        let select = revenue_types::Entity::find()
            .filter(revenue_types::Column::Active.eq(true))
            .filter(contains_ci(revenue_types::Column::Description, term))
            .order_by_asc(revenue_types::Column::Description)
            .order_by_asc(revenue_types::Column::Id);
        fetch_page(&self.db, select, page).await
    }

    /// Updates an active revenue type.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for missing or inactive types.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateRevenueTypeInput,
    ) -> Result<revenue_types::Model, RevenueTypeError> {
        let existing = self.get(id).await?;

        let mut revenue_type: revenue_types::ActiveModel = existing.into();
        if let Some(description) = input.description {
            revenue_type.description = Set(description);
        }
        if let Some(notes) = input.notes {
            revenue_type.notes = Set(notes);
        }
        revenue_type.updated_at = Set(now());

        let revenue_type = revenue_type.update(&self.db).await?;
        info!(revenue_type_id = %revenue_type.id, "Revenue type updated");
        Ok(revenue_type)
    }

    /// Soft-deletes an active revenue type.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for missing or inactive types.
    pub async fn soft_delete(&self, id: Uuid) -> Result<(), RevenueTypeError> {
        let existing = self.get(id).await?;

        let mut revenue_type: revenue_types::ActiveModel = existing.into();
        revenue_type.active = Set(false);
        revenue_type.updated_at = Set(now());
        revenue_type.update(&self.db).await?;

        info!(revenue_type_id = %id, "Revenue type deactivated");
        Ok(())
    }

    /// Reactivates a revenue type.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no revenue type has this ID.
    pub async fn reactivate(&self, id: Uuid) -> Result<revenue_types::Model, RevenueTypeError> {
        let existing = revenue_types::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(RevenueTypeError::NotFound(id))?;
        if existing.active {
            return Ok(existing);
        }

        let mut revenue_type: revenue_types::ActiveModel = existing.into();
        revenue_type.active = Set(true);
        revenue_type.updated_at = Set(now());
        let revenue_type = revenue_type.update(&self.db).await?;

        info!(revenue_type_id = %id, "Revenue type reactivated");
        Ok(revenue_type)
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;
    use crate::repositories::common::count_row;

    #[tokio::test]
    async fn test_list_inactive_only() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row(0)]])
            .append_query_results([Vec::<revenue_types::Model>::new()])
            .into_connection();

        let page = RevenueTypeRepository::new(db.clone())
            .list(
                RevenueTypeFilter {
                    description: None,
                    active: Some(false),
                },
                PageRequest::default(),
            )
            .await
            .unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.meta.total, 0);

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("Bool(Some(false))"), "{log}");
    }
}
