//! Billed person repository for database operations.
//!
//! Billed people are the individuals an invoice is addressed to.

use finadmin_shared::types::{BilledPersonId, PageRequest, PageResponse};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::info;
use uuid::Uuid;

use super::common::{active_filter, contains_ci, fetch_page, is_unique_violation, now};
use crate::entities::billed_people;

/// Error types for billed person operations.
#[derive(Debug, thiserror::Error)]
pub enum BilledPersonError {
    /// Billed person not found or inactive.
    #[error("Billed person not found: {0}")]
    NotFound(Uuid),

    /// An active billed person already uses the CPF.
    #[error("A billed person with CPF {0} already exists")]
    DuplicateDocument(String),

    /// An inactive billed person already uses the CPF.
    #[error("An inactive billed person with CPF {document_id} already exists (id {id}); reactivate it instead")]
    InactiveDuplicate {
        /// Conflicting CPF.
        document_id: String,
        /// Existing inactive billed person.
        id: Uuid,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a billed person. The CPF is already normalized.
#[derive(Debug, Clone)]
pub struct CreateBilledPersonInput {
    /// Full name.
    pub full_name: String,
    /// Masked CPF.
    pub document_id: String,
}

/// Input for updating a billed person.
#[derive(Debug, Clone, Default)]
pub struct UpdateBilledPersonInput {
    /// Full name.
    pub full_name: Option<String>,
    /// Masked CPF.
    pub document_id: Option<String>,
}

/// Filter options for listing billed people.
#[derive(Debug, Clone, Default)]
pub struct BilledPersonFilter {
    /// Case-insensitive substring of the name.
    pub full_name: Option<String>,
    /// Exact masked CPF.
    pub document_id: Option<String>,
    /// Active status; `None` lists active billed people.
    pub active: Option<bool>,
}

/// Billed person repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct BilledPersonRepository {
    db: DatabaseConnection,
}

impl BilledPersonRepository {
    /// Creates a new billed person repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a billed person.
    ///
    /// # Errors
    ///
    /// Returns an error if the CPF is already registered.
    pub async fn create(
        &self,
        input: CreateBilledPersonInput,
    ) -> Result<billed_people::Model, BilledPersonError> {
        self.ensure_document_free(&input.document_id, None).await?;

        let now = now();
        let person = billed_people::ActiveModel {
            id: Set(BilledPersonId::new().into_inner()),
            full_name: Set(input.full_name),
            document_id: Set(input.document_id.clone()),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let person = person.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                BilledPersonError::DuplicateDocument(input.document_id)
            } else {
                BilledPersonError::Database(e)
            }
        })?;

        info!(billed_person_id = %person.id, "Billed person created");
        Ok(person)
    }

    /// Finds an active billed person by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<billed_people::Model>, DbErr> {
        billed_people::Entity::find_by_id(id)
            .filter(billed_people::Column::Active.eq(true))
            .one(&self.db)
            .await
    }

    /// Gets an active billed person by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for missing or inactive billed people.
    pub async fn get(&self, id: Uuid) -> Result<billed_people::Model, BilledPersonError> {
        self.find_by_id(id)
            .await?
            .ok_or(BilledPersonError::NotFound(id))
    }

    /// Finds an active billed person by masked CPF.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_document_id(
        &self,
        document_id: &str,
    ) -> Result<Option<billed_people::Model>, DbErr> {
        billed_people::Entity::find()
            .filter(billed_people::Column::DocumentId.eq(document_id))
            .filter(billed_people::Column::Active.eq(true))
            .one(&self.db)
            .await
    }

    /// Lists billed people.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: BilledPersonFilter,
        page: PageRequest,
    ) -> Result<PageResponse<billed_people::Model>, DbErr> {
        let mut condition =
            Condition::all().add(active_filter(billed_people::Column::Active, filter.active));
        if let Some(name) = filter.full_name.as_deref() {
            condition = condition.add(contains_ci(billed_people::Column::FullName, name));
        }
        if let Some(document_id) = filter.document_id {
            condition = condition.add(billed_people::Column::DocumentId.eq(document_id));
        }

        let select = billed_people::Entity::find()
            .filter(condition)
            .order_by_asc(billed_people::Column::FullName)
            .order_by_asc(billed_people::Column::Id);
        fetch_page(&self.db, select, page).await
    }

    /// Searches active billed people by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn search(
        &self,
        term: &str,
        page: PageRequest,
    ) -> Result<PageResponse<billed_people::Model>, DbErr> {
        let select = billed_people::Entity::find()
            .filter(billed_people::Column::Active.eq(true))
            .filter(contains_ci(billed_people::Column::FullName, term))
            .order_by_asc(billed_people::Column::FullName)
            .order_by_asc(billed_people::Column::Id);
        fetch_page(&self.db, select, page).await
    }

    /// Updates an active billed person.
    ///
    /// # Errors
    ///
    /// Returns an error if the billed person is missing or the new CPF is taken.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateBilledPersonInput,
    ) -> Result<billed_people::Model, BilledPersonError> {
        let existing = self.get(id).await?;

        if let Some(document_id) = input.document_id.as_deref()
            && document_id != existing.document_id
        {
            self.ensure_document_free(document_id, Some(id)).await?;
        }

        let mut person: billed_people::ActiveModel = existing.into();
        if let Some(full_name) = input.full_name {
            person.full_name = Set(full_name);
        }
        if let Some(document_id) = input.document_id {
            person.document_id = Set(document_id);
        }
        person.updated_at = Set(now());

        let person = person.update(&self.db).await?;
        info!(billed_person_id = %person.id, "Billed person updated");
        Ok(person)
    }

    /// Soft-deletes an active billed person.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for missing or inactive billed people.
    pub async fn soft_delete(&self, id: Uuid) -> Result<(), BilledPersonError> {
        let existing = self.get(id).await?;

        let mut person: billed_people::ActiveModel = existing.into();
        person.active = Set(false);
        person.updated_at = Set(now());
        person.update(&self.db).await?;

        info!(billed_person_id = %id, "Billed person deactivated");
        Ok(())
    }

    /// Reactivates a billed person.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no billed person has this ID.
    pub async fn reactivate(&self, id: Uuid) -> Result<billed_people::Model, BilledPersonError> {
        let existing = billed_people::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(BilledPersonError::NotFound(id))?;
        if existing.active {
            return Ok(existing);
        }

        let mut person: billed_people::ActiveModel = existing.into();
        person.active = Set(true);
        person.updated_at = Set(now());
        let person = person.update(&self.db).await?;

        info!(billed_person_id = %id, "Billed person reactivated");
        Ok(person)
    }

    async fn ensure_document_free(
        &self,
        document_id: &str,
        exclude: Option<Uuid>,
    ) -> Result<(), BilledPersonError> {
        let mut query =
            billed_people::Entity::find().filter(billed_people::Column::DocumentId.eq(document_id));
        if let Some(id) = exclude {
            query = query.filter(billed_people::Column::Id.ne(id));
        }

        match query.one(&self.db).await? {
            Some(existing) if existing.active => {
                Err(BilledPersonError::DuplicateDocument(document_id.to_string()))
            }
            Some(existing) => Err(BilledPersonError::InactiveDuplicate {
                document_id: document_id.to_string(),
                id: existing.id,
            }),
            None => Ok(()),
        }
    }
}
