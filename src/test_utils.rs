//! Shared test utilities for `rosterbook`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{event, ledger, user},
    entities::{self, Role},
    errors::Result,
};
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a regular member with a zero balance.
pub async fn create_test_user(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::user::Model> {
    user::create_user(db, name.to_string(), Role::User).await
}

/// Creates a regular member and deposits an opening balance through the
/// ledger, so the cached balance and the transaction history agree.
pub async fn create_user_with_balance(
    db: &DatabaseConnection,
    name: &str,
    balance: Decimal,
) -> Result<entities::user::Model> {
    let created = create_test_user(db, name).await?;
    ledger::deposit(db, created.id, balance).await?;
    user::require_user(db, created.id).await
}

/// Creates a public test event with sensible defaults.
///
/// # Defaults
/// * `price`: 25.00
/// * `is_public_visible`: true
/// * starts tomorrow, ends the day after
pub async fn create_test_event(
    db: &DatabaseConnection,
    title: &str,
    max_attendees: i32,
) -> Result<entities::event::Model> {
    create_custom_event(db, title, Decimal::new(2500, 2), max_attendees, true).await
}

/// Creates a test event with custom price and visibility.
pub async fn create_custom_event(
    db: &DatabaseConnection,
    title: &str,
    price: Decimal,
    max_attendees: i32,
    is_public_visible: bool,
) -> Result<entities::event::Model> {
    let start = Utc::now() + Duration::days(1);
    event::create_event(
        db,
        title.to_string(),
        price,
        max_attendees,
        is_public_visible,
        start,
        start + Duration::hours(2),
    )
    .await
}
