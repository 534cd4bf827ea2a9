//! User entity - Represents every account that can hold registrations and credit.
//!
//! `credit_balance` is a denormalized cache of the transaction ledger: it is
//! only ever written in the same database transaction as a new
//! `credit_transaction` row, and always equals the `balance_after` of the most
//! recent one. Guest users are throwaway identities that exist solely to
//! occupy one registration slot.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name shown on rosters
    pub display_name: String,
    /// Capability role of the account
    pub role: Role,
    /// Cached ledger balance; equals the last transaction's `balance_after`
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub credit_balance: Decimal,
}

/// Capability role of an account.
///
/// The web layer authenticates and hands the core a pre-validated role; the
/// core never inspects session state itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum Role {
    /// Full access, sees non-public events
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Regular member
    #[sea_orm(string_value = "user")]
    User,
    /// Ephemeral identity backing one guest registration
    #[sea_orm(string_value = "guest")]
    Guest,
    /// Event organizer
    #[sea_orm(string_value = "organizer")]
    Organizer,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user has many registrations
    #[sea_orm(has_many = "super::registration::Entity")]
    Registrations,
    /// One user has many credit transactions
    #[sea_orm(has_many = "super::credit_transaction::Entity")]
    CreditTransactions,
    /// One user has many monthly balance snapshots
    #[sea_orm(has_many = "super::monthly_balance::Entity")]
    MonthlyBalances,
}

impl Related<super::registration::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Registrations.def()
    }
}

impl Related<super::credit_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CreditTransactions.def()
    }
}

impl Related<super::monthly_balance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MonthlyBalances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
