//! Initial database migration.
//!
//! Creates the expense category enum, people and type tables, payable and
//! receivable accounts with their installments and classifications, search
//! indexes and the `updated_at` trigger.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: PEOPLE & TYPES
        // ============================================================
        db.execute_unprepared(PEOPLE_SQL).await?;
        db.execute_unprepared(TYPES_SQL).await?;

        // ============================================================
        // PART 3: ACCOUNTS
        // ============================================================
        db.execute_unprepared(PAYABLES_SQL).await?;
        db.execute_unprepared(RECEIVABLES_SQL).await?;

        // ============================================================
        // PART 4: INDEXES & TRIGGERS
        // ============================================================
        db.execute_unprepared(INDEXES_SQL).await?;
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE expense_category AS ENUM (
    'agricultural_inputs',
    'maintenance_operation',
    'human_resources',
    'operational_services',
    'infrastructure_utilities',
    'administrative',
    'insurance_protection',
    'taxes_fees',
    'investments'
);
";

const PEOPLE_SQL: &str = r"
-- Unique documents span inactive rows: a soft-deleted record must be reactivated, not recreated
CREATE TABLE suppliers (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_name VARCHAR(255) NOT NULL CHECK (length(trim(company_name)) > 0),
    trade_name VARCHAR(255),
    tax_id VARCHAR(18) NOT NULL UNIQUE CHECK (tax_id ~ '^\d{2}\.\d{3}\.\d{3}/\d{4}-\d{2}$'),
    active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE customers (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    full_name VARCHAR(255) NOT NULL CHECK (length(trim(full_name)) > 0),
    document_id VARCHAR(14) NOT NULL UNIQUE CHECK (document_id ~ '^\d{3}\.\d{3}\.\d{3}-\d{2}$'),
    active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE billed_people (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    full_name VARCHAR(255) NOT NULL CHECK (length(trim(full_name)) > 0),
    document_id VARCHAR(14) NOT NULL UNIQUE CHECK (document_id ~ '^\d{3}\.\d{3}\.\d{3}-\d{2}$'),
    active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const TYPES_SQL: &str = r"
CREATE TABLE expense_types (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    description VARCHAR(255) NOT NULL CHECK (length(trim(description)) > 0),
    category expense_category NOT NULL,
    notes TEXT,
    active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE revenue_types (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    description VARCHAR(255) NOT NULL CHECK (length(trim(description)) > 0),
    notes TEXT,
    active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const PAYABLES_SQL: &str = r"
CREATE TABLE payable_accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    invoice_number VARCHAR(50),
    issue_date DATE NOT NULL,
    product_description TEXT NOT NULL,
    total_amount NUMERIC(15, 2) NOT NULL CHECK (total_amount > 0),
    supplier_id UUID NOT NULL REFERENCES suppliers(id),
    billed_person_id UUID REFERENCES billed_people(id),
    active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE payable_installments (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    payable_account_id UUID NOT NULL REFERENCES payable_accounts(id) ON DELETE CASCADE,
    installment_number INTEGER NOT NULL CHECK (installment_number >= 1),
    due_date DATE NOT NULL,
    installment_amount NUMERIC(15, 2) NOT NULL CHECK (installment_amount > 0),
    payment_date DATE,
    paid_amount NUMERIC(15, 2) CHECK (paid_amount IS NULL OR paid_amount > 0),
    notes TEXT,
    active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_payable_installment_number UNIQUE (payable_account_id, installment_number)
);

CREATE TABLE payable_account_expense_classifications (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    payable_account_id UUID NOT NULL REFERENCES payable_accounts(id) ON DELETE CASCADE,
    expense_type_id UUID NOT NULL REFERENCES expense_types(id),
    percentage NUMERIC(5, 2) NOT NULL DEFAULT 100 CHECK (percentage > 0 AND percentage <= 100),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_payable_expense_type UNIQUE (payable_account_id, expense_type_id)
);
";

const RECEIVABLES_SQL: &str = r"
CREATE TABLE receivable_accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    document_number VARCHAR(50),
    issue_date DATE NOT NULL,
    description TEXT NOT NULL,
    total_amount NUMERIC(15, 2) NOT NULL CHECK (total_amount > 0),
    customer_id UUID NOT NULL REFERENCES customers(id),
    active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE receivable_installments (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    receivable_account_id UUID NOT NULL REFERENCES receivable_accounts(id) ON DELETE CASCADE,
    installment_number INTEGER NOT NULL CHECK (installment_number >= 1),
    due_date DATE NOT NULL,
    installment_amount NUMERIC(15, 2) NOT NULL CHECK (installment_amount > 0),
    receipt_date DATE,
    received_amount NUMERIC(15, 2) CHECK (received_amount IS NULL OR received_amount > 0),
    notes TEXT,
    active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_receivable_installment_number UNIQUE (receivable_account_id, installment_number)
);

CREATE TABLE receivable_account_revenue_classifications (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    receivable_account_id UUID NOT NULL REFERENCES receivable_accounts(id) ON DELETE CASCADE,
    revenue_type_id UUID NOT NULL REFERENCES revenue_types(id),
    percentage NUMERIC(5, 2) NOT NULL DEFAULT 100 CHECK (percentage > 0 AND percentage <= 100),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_receivable_revenue_type UNIQUE (receivable_account_id, revenue_type_id)
);
";

const INDEXES_SQL: &str = r"
-- Case-insensitive name search
CREATE INDEX idx_suppliers_company_name ON suppliers (lower(company_name));
CREATE INDEX idx_suppliers_trade_name ON suppliers (lower(trade_name));
CREATE INDEX idx_customers_full_name ON customers (lower(full_name));
CREATE INDEX idx_billed_people_full_name ON billed_people (lower(full_name));

-- Active listings
CREATE INDEX idx_suppliers_active ON suppliers (active);
CREATE INDEX idx_customers_active ON customers (active);
CREATE INDEX idx_billed_people_active ON billed_people (active);
CREATE INDEX idx_expense_types_category ON expense_types (category) WHERE active;
CREATE INDEX idx_revenue_types_active ON revenue_types (active);

-- Account lookups
CREATE INDEX idx_payable_accounts_supplier ON payable_accounts (supplier_id, issue_date DESC);
CREATE INDEX idx_payable_accounts_billed_person ON payable_accounts (billed_person_id)
    WHERE billed_person_id IS NOT NULL;
CREATE INDEX idx_payable_accounts_invoice_number ON payable_accounts (invoice_number);
CREATE INDEX idx_receivable_accounts_customer ON receivable_accounts (customer_id, issue_date DESC);
CREATE INDEX idx_receivable_accounts_document_number ON receivable_accounts (document_number);

-- Open installments by due date
CREATE INDEX idx_payable_installments_due ON payable_installments (due_date)
    WHERE payment_date IS NULL AND active;
CREATE INDEX idx_receivable_installments_due ON receivable_installments (due_date)
    WHERE receipt_date IS NULL AND active;
";

const TRIGGERS_SQL: &str = r"
CREATE OR REPLACE FUNCTION set_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = now();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_suppliers_updated_at BEFORE UPDATE ON suppliers
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_customers_updated_at BEFORE UPDATE ON customers
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_billed_people_updated_at BEFORE UPDATE ON billed_people
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_expense_types_updated_at BEFORE UPDATE ON expense_types
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_revenue_types_updated_at BEFORE UPDATE ON revenue_types
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_payable_accounts_updated_at BEFORE UPDATE ON payable_accounts
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_payable_installments_updated_at BEFORE UPDATE ON payable_installments
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_receivable_accounts_updated_at BEFORE UPDATE ON receivable_accounts
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_receivable_installments_updated_at BEFORE UPDATE ON receivable_installments
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS receivable_account_revenue_classifications CASCADE;
DROP TABLE IF EXISTS receivable_installments CASCADE;
DROP TABLE IF EXISTS receivable_accounts CASCADE;
DROP TABLE IF EXISTS payable_account_expense_classifications CASCADE;
DROP TABLE IF EXISTS payable_installments CASCADE;
DROP TABLE IF EXISTS payable_accounts CASCADE;
DROP TABLE IF EXISTS revenue_types CASCADE;
DROP TABLE IF EXISTS expense_types CASCADE;
DROP TABLE IF EXISTS billed_people CASCADE;
DROP TABLE IF EXISTS customers CASCADE;
DROP TABLE IF EXISTS suppliers CASCADE;
DROP FUNCTION IF EXISTS set_updated_at() CASCADE;
DROP TYPE IF EXISTS expense_category;
";
