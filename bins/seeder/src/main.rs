//! Database seeder for finadmin development and testing.
//!
//! Seeds one expense type per catalog category and a few revenue types.
//! Running it twice adds nothing.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use finadmin_core::classification::ExpenseCategory;
use finadmin_db::repositories::{CreateExpenseTypeInput, CreateRevenueTypeInput, RevenueTypeFilter};
use finadmin_db::{ExpenseTypeRepository, RevenueTypeRepository};
use finadmin_shared::types::PageRequest;
use sea_orm::DatabaseConnection;

/// Revenue types every farm ledger starts with.
const REVENUE_TYPES: &[(&str, &str)] = &[
    ("Venda de produção agrícola", "Grãos, frutas e hortaliças"),
    ("Venda de animais", "Gado de corte, leite e reprodutores"),
    ("Prestação de serviços", "Colheita, plantio e frete para terceiros"),
    ("Arrendamento", "Aluguel de terras e pastagens"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    println!("Connecting to database...");
    let db = finadmin_db::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    println!("Seeding expense types...");
    seed_expense_types(&db).await?;

    println!("Seeding revenue types...");
    seed_revenue_types(&db).await?;

    println!("Seeding complete!");
    Ok(())
}

/// Creates one expense type for each category that has none.
async fn seed_expense_types(db: &DatabaseConnection) -> anyhow::Result<()> {
    let repo = ExpenseTypeRepository::new(db.clone());
    for category in ExpenseCategory::ALL {
        if !repo.find_active_by_category(category.into()).await?.is_empty() {
            println!("  {} already exists, skipping...", category.label());
            continue;
        }

        repo.create(CreateExpenseTypeInput {
            description: category.label().to_string(),
            category: category.into(),
            notes: Some(category.description().to_string()),
        })
        .await?;
        println!("  Created {}", category.label());
    }
    Ok(())
}

async fn seed_revenue_types(db: &DatabaseConnection) -> anyhow::Result<()> {
    let repo = RevenueTypeRepository::new(db.clone());
    for (description, notes) in REVENUE_TYPES {
        let existing = repo
            .list(
                RevenueTypeFilter {
                    description: Some((*description).to_string()),
                    active: None,
                },
                PageRequest::new(1, 1),
            )
            .await?;
        if existing.meta.total > 0 {
            println!("  {description} already exists, skipping...");
            continue;
        }

        repo.create(CreateRevenueTypeInput {
            description: (*description).to_string(),
            notes: Some((*notes).to_string()),
        })
        .await?;
        println!("  Created {description}");
    }
    Ok(())
}
