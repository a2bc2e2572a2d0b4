//! Supplier repository for database operations.

use finadmin_shared::types::{PageRequest, PageResponse, SupplierId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::info;
use uuid::Uuid;

use super::common::{active_filter, contains_ci, fetch_page, is_unique_violation, now};
use crate::entities::suppliers;

/// Error types for supplier operations.
#[derive(Debug, thiserror::Error)]
pub enum SupplierError {
    /// Supplier not found or inactive.
    #[error("Supplier not found: {0}")]
    NotFound(Uuid),

    /// An active supplier already uses the tax id.
    #[error("A supplier with CNPJ {0} already exists")]
    DuplicateTaxId(String),

    /// An inactive supplier already uses the tax id.
    #[error("An inactive supplier with CNPJ {tax_id} already exists (id {id}); reactivate it instead")]
    InactiveDuplicate {
        /// Conflicting tax id.
        tax_id: String,
        /// Existing inactive supplier.
        id: Uuid,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a supplier. The tax id is already normalized.
#[derive(Debug, Clone)]
pub struct CreateSupplierInput {
    /// Legal name.
    pub company_name: String,
    /// Trade name.
    pub trade_name: Option<String>,
    /// Masked CNPJ.
    pub tax_id: String,
}

/// Input for updating a supplier. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateSupplierInput {
    /// Legal name.
    pub company_name: Option<String>,
    /// Trade name; `Some(None)` clears it.
    pub trade_name: Option<Option<String>>,
    /// Masked CNPJ.
    pub tax_id: Option<String>,
}

/// Filter options for listing suppliers.
#[derive(Debug, Clone, Default)]
pub struct SupplierFilter {
    /// Case-insensitive substring of the legal name.
    pub company_name: Option<String>,
    /// Case-insensitive substring of the trade name.
    pub trade_name: Option<String>,
    /// Exact masked CNPJ.
    pub tax_id: Option<String>,
    /// Active status; `None` lists active suppliers.
    pub active: Option<bool>,
}

/// Supplier repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    db: DatabaseConnection,
}

impl SupplierRepository {
    /// Creates a new supplier repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a supplier.
    ///
    /// # Errors
    ///
    /// Returns an error if the tax id is taken by an active or inactive supplier.
    pub async fn create(
        &self,
        input: CreateSupplierInput,
    ) -> Result<suppliers::Model, SupplierError> {
        self.ensure_tax_id_free(&input.tax_id, None).await?;

        let now = now();
        let supplier = suppliers::ActiveModel {
            id: Set(SupplierId::new().into_inner()),
            company_name: Set(input.company_name),
            trade_name: Set(input.trade_name),
            tax_id: Set(input.tax_id.clone()),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let supplier = supplier.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                SupplierError::DuplicateTaxId(input.tax_id)
            } else {
                SupplierError::Database(e)
            }
        })?;

        info!(supplier_id = %supplier.id, tax_id = %supplier.tax_id, "Supplier created");
        Ok(supplier)
    }

    /// Finds an active supplier by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<suppliers::Model>, DbErr> {
        suppliers::Entity::find_by_id(id)
            .filter(suppliers::Column::Active.eq(true))
            .one(&self.db)
            .await
    }

    /// Gets an active supplier by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for missing or inactive suppliers.
    pub async fn get(&self, id: Uuid) -> Result<suppliers::Model, SupplierError> {
        self.find_by_id(id)
            .await?
            .ok_or(SupplierError::NotFound(id))
    }

    /// Finds an active supplier by masked CNPJ.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_tax_id(&self, tax_id: &str) -> Result<Option<suppliers::Model>, DbErr> {
        suppliers::Entity::find()
            .filter(suppliers::Column::TaxId.eq(tax_id))
            .filter(suppliers::Column::Active.eq(true))
            .one(&self.db)
            .await
    }

    /// Lists suppliers.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: SupplierFilter,
        page: PageRequest,
    ) -> Result<PageResponse<suppliers::Model>, DbErr> {
        let mut condition =
            Condition::all().add(active_filter(suppliers::Column::Active, filter.active));
        if let Some(name) = filter.company_name.as_deref() {
            condition = condition.add(contains_ci(suppliers::Column::CompanyName, name));
        }
        if let Some(name) = filter.trade_name.as_deref() {
            condition = condition.add(contains_ci(suppliers::Column::TradeName, name));
        }
        if let Some(tax_id) = filter.tax_id {
            condition = condition.add(suppliers::Column::TaxId.eq(tax_id));
        }

        let select = suppliers::Entity::find()
            .filter(condition)
            .order_by_asc(suppliers::Column::CompanyName)
            .order_by_asc(suppliers::Column::Id);
        fetch_page(&self.db, select, page).await
    }

    /// Searches active suppliers by legal or trade name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn search(
        &self,
        term: &str,
        page: PageRequest,
    ) -> Result<PageResponse<suppliers::Model>, DbErr> {
        let select = suppliers::Entity::find()
            .filter(suppliers::Column::Active.eq(true))
            .filter(
                Condition::any()
                    .add(contains_ci(suppliers::Column::CompanyName, term))
                    .add(contains_ci(suppliers::Column::TradeName, term)),
            )
            .order_by_asc(suppliers::Column::CompanyName)
            .order_by_asc(suppliers::Column::Id);
        fetch_page(&self.db, select, page).await
    }

    /// Updates an active supplier.
    ///
    /// # Errors
    ///
    /// Returns an error if the supplier is missing or the new tax id is taken.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateSupplierInput,
    ) -> Result<suppliers::Model, SupplierError> {
        let existing = self.get(id).await?;

        if let Some(tax_id) = input.tax_id.as_deref()
            && tax_id != existing.tax_id
        {
            self.ensure_tax_id_free(tax_id, Some(id)).await?;
        }

        let mut supplier: suppliers::ActiveModel = existing.into();
        if let Some(company_name) = input.company_name {
            supplier.company_name = Set(company_name);
        }
        if let Some(trade_name) = input.trade_name {
            supplier.trade_name = Set(trade_name);
        }
        if let Some(tax_id) = input.tax_id {
            supplier.tax_id = Set(tax_id);
        }
        supplier.updated_at = Set(now());

        let supplier = supplier.update(&self.db).await?;
        info!(supplier_id = %supplier.id, "Supplier updated");
        Ok(supplier)
    }

    /// Soft-deletes an active supplier.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for missing or inactive suppliers.
    pub async fn soft_delete(&self, id: Uuid) -> Result<(), SupplierError> {
        let existing = self.get(id).await?;

        let mut supplier: suppliers::ActiveModel = existing.into();
        supplier.active = Set(false);
        supplier.updated_at = Set(now());
        supplier.update(&self.db).await?;

        info!(supplier_id = %id, "Supplier deactivated");
        Ok(())
    }

    /// Reactivates a supplier.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no supplier has this ID.
    pub async fn reactivate(&self, id: Uuid) -> Result<suppliers::Model, SupplierError> {
        let existing = suppliers::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(SupplierError::NotFound(id))?;
        if existing.active {
            return Ok(existing);
        }

        let mut supplier: suppliers::ActiveModel = existing.into();
        supplier.active = Set(true);
        supplier.updated_at = Set(now());
        let supplier = supplier.update(&self.db).await?;

        info!(supplier_id = %id, "Supplier reactivated");
        Ok(supplier)
    }

    async fn ensure_tax_id_free(
        &self,
        tax_id: &str,
        exclude: Option<Uuid>,
    ) -> Result<(), SupplierError> {
        let mut query = suppliers::Entity::find().filter(suppliers::Column::TaxId.eq(tax_id));
        if let Some(id) = exclude {
            query = query.filter(suppliers::Column::Id.ne(id));
        }

        match query.one(&self.db).await? {
            Some(existing) if existing.active => {
                Err(SupplierError::DuplicateTaxId(tax_id.to_string()))
            }
            Some(existing) => Err(SupplierError::InactiveDuplicate {
                tax_id: tax_id.to_string(),
                id: existing.id,
            }),
            None => Ok(()),
        }
    }
}
