//! Database configuration module for `rosterbook`.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! It provides functions for establishing database connections and creating all necessary tables
//! based on the entity definitions. The module uses `SeaORM`'s `Schema::create_table_from_entity`
//! method to automatically generate SQL statements from the entity models, ensuring that the
//! database schema matches the Rust struct definitions without requiring manual SQL.

use crate::entities::{CreditTransaction, Event, MonthlyBalance, Registration, User};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Gets the database URL from environment variable or returns default `SQLite` path.
///
/// This function looks for `DATABASE_URL` in the environment and falls back to
/// a default local `SQLite` file if not found.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data/rosterbook.sqlite".to_string())
}

/// Establishes a connection to the `SQLite` database using the `DATABASE_URL` environment variable.
///
/// Falls back to a default local `SQLite` file if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    Database::connect(get_database_url()).await.map_err(Into::into)
}

/// Creates all necessary database tables using `SeaORM`'s schema generation from entity definitions.
///
/// This function uses the `DeriveEntityModel` macros to automatically generate proper SQL
/// statements for table creation, ensuring the database schema matches the Rust struct definitions.
/// It creates tables for users, events, registrations, credit transactions, and monthly balances.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let user_table = schema.create_table_from_entity(User);
    let event_table = schema.create_table_from_entity(Event);
    let registration_table = schema.create_table_from_entity(Registration);
    let credit_transaction_table = schema.create_table_from_entity(CreditTransaction);
    let monthly_balance_table = schema.create_table_from_entity(MonthlyBalance);

    db.execute(builder.build(&user_table)).await?;
    db.execute(builder.build(&event_table)).await?;
    db.execute(builder.build(&registration_table)).await?;
    db.execute(builder.build(&credit_transaction_table)).await?;
    db.execute(builder.build(&monthly_balance_table)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        credit_transaction::Model as CreditTransactionModel, event::Model as EventModel,
        monthly_balance::Model as MonthlyBalanceModel, registration::Model as RegistrationModel,
        user::Model as UserModel,
    };
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<UserModel> = User::find().limit(1).all(&db).await?;
        let _: Vec<EventModel> = Event::find().limit(1).all(&db).await?;
        let _: Vec<RegistrationModel> = Registration::find().limit(1).all(&db).await?;
        let _: Vec<CreditTransactionModel> =
            CreditTransaction::find().limit(1).all(&db).await?;
        let _: Vec<MonthlyBalanceModel> = MonthlyBalance::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[test]
    fn test_get_database_url_default() {
        // With no DATABASE_URL set the local SQLite fallback is used
        if std::env::var("DATABASE_URL").is_err() {
            assert_eq!(get_database_url(), "sqlite://data/rosterbook.sqlite");
        }
    }
}
