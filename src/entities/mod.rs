//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod credit_transaction;
pub mod event;
pub mod monthly_balance;
pub mod registration;
pub mod user;

// Re-export the entities and domain enums under unambiguous names; everything
// else is reached through the submodules.
pub use credit_transaction::{Entity as CreditTransaction, TransactionKind};
pub use event::Entity as Event;
pub use monthly_balance::Entity as MonthlyBalance;
pub use registration::{Entity as Registration, RegistrationStatus};
pub use user::{Entity as User, Role};
