//! Customer repository for database operations.

use finadmin_shared::types::{CustomerId, PageRequest, PageResponse};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::info;
use uuid::Uuid;

use super::common::{active_filter, contains_ci, fetch_page, is_unique_violation, now};
use crate::entities::customers;

/// Error types for customer operations.
#[derive(Debug, thiserror::Error)]
pub enum CustomerError {
    /// Customer not found or inactive.
    #[error("Customer not found: {0}")]
    NotFound(Uuid),

    /// An active customer already uses the CPF.
    #[error("A customer with CPF {0} already exists")]
    DuplicateDocument(String),

    /// An inactive customer already uses the CPF.
    #[error("An inactive customer with CPF {document_id} already exists (id {id}); reactivate it instead")]
    InactiveDuplicate {
        /// Conflicting CPF.
        document_id: String,
        /// Existing inactive customer.
        id: Uuid,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a customer. The CPF is already normalized.
#[derive(Debug, Clone)]
pub struct CreateCustomerInput {
    /// Full name.
    pub full_name: String,
    /// Masked CPF.
    pub document_id: String,
}

/// Input for updating a customer.
#[derive(Debug, Clone, Default)]
pub struct UpdateCustomerInput {
    /// Full name.
    pub full_name: Option<String>,
    /// Masked CPF.
    pub document_id: Option<String>,
}

/// Filter options for listing customers.
#[derive(Debug, Clone, Default)]
pub struct CustomerFilter {
    /// Case-insensitive substring of the name.
    pub full_name: Option<String>,
    /// Exact masked CPF.
    pub document_id: Option<String>,
    /// Active status; `None` lists active customers.
    pub active: Option<bool>,
}

/// Customer repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    db: DatabaseConnection,
}

impl CustomerRepository {
    /// Creates a new customer repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the CPF is already registered.
    pub async fn create(
        &self,
        input: CreateCustomerInput,
    ) -> Result<customers::Model, CustomerError> {
        self.ensure_document_free(&input.document_id, None).await?;

        let now = now();
        let customer = customers::ActiveModel {
            id: Set(CustomerId::new().into_inner()),
            full_name: Set(input.full_name),
            document_id: Set(input.document_id.clone()),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let customer = customer.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                CustomerError::DuplicateDocument(input.document_id)
            } else {
                CustomerError::Database(e)
            }
        })?;

        info!(customer_id = %customer.id, "Customer created");
        Ok(customer)
    }

    /// Finds an active customer by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<customers::Model>, DbErr> {
        customers::Entity::find_by_id(id)
            .filter(customers::Column::Active.eq(true))
            .one(&self.db)
            .await
    }

    /// Gets an active customer by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for missing or inactive customers.
    pub async fn get(&self, id: Uuid) -> Result<customers::Model, CustomerError> {
        self.find_by_id(id)
            .await?
            .ok_or(CustomerError::NotFound(id))
    }

    /// Finds an active customer by masked CPF.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_document_id(
        &self,
        document_id: &str,
    ) -> Result<Option<customers::Model>, DbErr> {
        customers::Entity::find()
            .filter(customers::Column::DocumentId.eq(document_id))
            .filter(customers::Column::Active.eq(true))
            .one(&self.db)
            .await
    }

    /// Lists customers.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: CustomerFilter,
        page: PageRequest,
    ) -> Result<PageResponse<customers::Model>, DbErr> {
        let mut condition =
            Condition::all().add(active_filter(customers::Column::Active, filter.active));
        if let Some(name) = filter.full_name.as_deref() {
            condition = condition.add(contains_ci(customers::Column::FullName, name));
        }
        if let Some(document_id) = filter.document_id {
            condition = condition.add(customers::Column::DocumentId.eq(document_id));
        }

        let select = customers::Entity::find()
            .filter(condition)
            .order_by_asc(customers::Column::FullName)
            .order_by_asc(customers::Column::Id);
        fetch_page(&self.db, select, page).await
    }

    /// Searches active customers by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn search(
        &self,
        term: &str,
        page: PageRequest,
    ) -> Result<PageResponse<customers::Model>, DbErr> {
        let select = customers::Entity::find()
            .filter(customers::Column::Active.eq(true))
            .filter(contains_ci(customers::Column::FullName, term))
            .order_by_asc(customers::Column::FullName)
            .order_by_asc(customers::Column::Id);
        fetch_page(&self.db, select, page).await
    }

    /// Updates an active customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the customer is missing or the new CPF is taken.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateCustomerInput,
    ) -> Result<customers::Model, CustomerError> {
        let existing = self.get(id).await?;

        if let Some(document_id) = input.document_id.as_deref()
            && document_id != existing.document_id
        {
            self.ensure_document_free(document_id, Some(id)).await?;
        }

        let mut customer: customers::ActiveModel = existing.into();
        if let Some(full_name) = input.full_name {
            customer.full_name = Set(full_name);
        }
        if let Some(document_id) = input.document_id {
            customer.document_id = Set(document_id);
        }
        customer.updated_at = Set(now());

        let customer = customer.update(&self.db).await?;
        info!(customer_id = %customer.id, "Customer updated");
        Ok(customer)
    }

    /// Soft-deletes an active customer.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for missing or inactive customers.
    pub async fn soft_delete(&self, id: Uuid) -> Result<(), CustomerError> {
        let existing = self.get(id).await?;

        let mut customer: customers::ActiveModel = existing.into();
        customer.active = Set(false);
        customer.updated_at = Set(now());
        customer.update(&self.db).await?;

        info!(customer_id = %id, "Customer deactivated");
        Ok(())
    }

    /// Reactivates a customer.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no customer has this ID.
    pub async fn reactivate(&self, id: Uuid) -> Result<customers::Model, CustomerError> {
        let existing = customers::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(CustomerError::NotFound(id))?;
        if existing.active {
            return Ok(existing);
        }

        let mut customer: customers::ActiveModel = existing.into();
        customer.active = Set(true);
        customer.updated_at = Set(now());
        let customer = customer.update(&self.db).await?;

        info!(customer_id = %id, "Customer reactivated");
        Ok(customer)
    }

    async fn ensure_document_free(
        &self,
        document_id: &str,
        exclude: Option<Uuid>,
    ) -> Result<(), CustomerError> {
        let mut query =
            customers::Entity::find().filter(customers::Column::DocumentId.eq(document_id));
        if let Some(id) = exclude {
            query = query.filter(customers::Column::Id.ne(id));
        }

        match query.one(&self.db).await? {
            Some(existing) if existing.active => {
                Err(CustomerError::DuplicateDocument(document_id.to_string()))
            }
            Some(existing) => Err(CustomerError::InactiveDuplicate {
                document_id: document_id.to_string(),
                id: existing.id,
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;

    fn customer(document_id: &str, active: bool) -> customers::Model {
        let now = now();
        customers::Model {
            id: Uuid::new_v4(),
            full_name: "Maria das Dores".to_string(),
            document_id: document_id.to_string(),
            active,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_update_checks_new_document() {
        let existing = customer("123.456.789-01", true);
        let other = customer("987.654.321-00", true);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing.clone()]])
            .append_query_results([vec![other]])
            .into_connection();

        let err = CustomerRepository::new(db)
            .update(
                existing.id,
                UpdateCustomerInput {
                    full_name: None,
                    document_id: Some("987.654.321-00".to_string()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CustomerError::DuplicateDocument(ref d) if d == "987.654.321-00"));
    }

    #[tokio::test]
    async fn test_update_same_document_skips_duplicate_check() {
        let existing = customer("123.456.789-01", true);
        let mut renamed = existing.clone();
        renamed.full_name = "Maria das Dores Silva".to_string();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing.clone()]])
            .append_query_results([vec![renamed.clone()]])
            .into_connection();

        let result = CustomerRepository::new(db)
            .update(
                existing.id,
                UpdateCustomerInput {
                    full_name: Some("Maria das Dores Silva".to_string()),
                    document_id: Some("123.456.789-01".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(result, renamed);
    }

    #[tokio::test]
    async fn test_reactivate_inactive_customer() {
        let existing = customer("123.456.789-01", false);
        let mut reactivated = existing.clone();
        reactivated.active = true;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing.clone()]])
            .append_query_results([vec![reactivated.clone()]])
            .into_connection();

        let result = CustomerRepository::new(db).reactivate(existing.id).await.unwrap();
        assert!(result.active);
    }

    #[tokio::test]
    async fn test_reactivate_missing_customer() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<customers::Model>::new()])
            .into_connection();

        let err = CustomerRepository::new(db)
            .reactivate(Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, CustomerError::NotFound(_)));
    }
}
