//! Seed the store with sample records.
//!
//! Creates a few toys, elves and orders so a fresh console has something to
//! show, and optionally an admin account to sign in with.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use santas_workshop::db::{
    DocumentStore, ElfRepository, OrderRepository, PgDocumentStore, RoleRepository, StoreError,
    ToyRepository,
};
use santas_workshop::models::{NewElf, NewOrder, NewToy, OrderOwner};
use santas_workshop::services::auth::{AuthError, IdentityProvider, LocalIdentityProvider};
use santas_workshop_core::{Difficulty, Email, EmailError, Priority, SessionId, UserRole};

use super::{CommandError, connect};

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Connect(#[from] CommandError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid admin email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Could not create admin account: {0}")]
    Account(#[from] AuthError),
}

const TOYS: [(&str, &str, Difficulty); 4] = [
    ("Wooden Train", "Classic", Difficulty::Medium),
    ("Robot Kit", "Tech", Difficulty::Hard),
    ("Teddy Bear", "Plush", Difficulty::Easy),
    ("Jigsaw Puzzle", "Games", Difficulty::Easy),
];

const ELVES: [(&str, &str, i64); 3] = [
    ("Buddy", "Builder", 85),
    ("Jingle", "Wrapper", 60),
    ("Sparkle", "Quality Control", 15),
];

const ORDERS: [(&str, &str, Priority); 2] = [
    ("Mia", "Norway", Priority::High),
    ("Leo", "Brazil", Priority::Normal),
];

/// Seed sample records, and an admin account when credentials are given.
///
/// # Errors
///
/// Returns an error if the store cannot be written or the admin account
/// cannot be created.
pub async fn run(admin: Option<(&str, &str)>) -> Result<(), SeedError> {
    let store: Arc<dyn DocumentStore> = Arc::new(PgDocumentStore::new(connect().await?));

    let toys = ToyRepository::new(store.as_ref());
    let mut toy_ids = Vec::with_capacity(TOYS.len());
    for (name, category, difficulty) in TOYS {
        let toy = toys
            .create(NewToy {
                name: name.to_string(),
                category: category.to_string(),
                difficulty,
                in_stock: None,
            })
            .await?;
        toy_ids.push(toy.id);
    }
    info!(count = toy_ids.len(), "Seeded toys");

    let elves = ElfRepository::new(store.as_ref());
    for (name, role, energy) in ELVES {
        elves
            .create(NewElf {
                name: name.to_string(),
                role: role.to_string(),
                energy: Some(energy),
            })
            .await?;
    }
    info!(count = ELVES.len(), "Seeded elves");

    let orders = OrderRepository::new(store.as_ref());
    let owner = OrderOwner::Session(SessionId::new("anon_seed"));
    for ((child_name, country, priority), toy_id) in ORDERS.into_iter().zip(toy_ids) {
        orders
            .create(
                NewOrder {
                    child_name: child_name.to_string(),
                    country: country.to_string(),
                    toy_id,
                    priority,
                },
                owner.clone(),
            )
            .await?;
    }
    info!(count = ORDERS.len(), "Seeded orders");

    if let Some((email, password)) = admin {
        let email = Email::parse(email)?;
        let provider = LocalIdentityProvider::new(Arc::clone(&store));
        let user_id = provider.sign_up(&email, password).await?;
        RoleRepository::new(store.as_ref())
            .create(&user_id, UserRole::Admin, Some(&email))
            .await?;
        info!(%user_id, %email, "Created admin account");
    }

    info!("Seeding complete!");
    Ok(())
}
