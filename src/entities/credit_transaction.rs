//! Credit transaction entity - One append-only entry in a user's ledger.
//!
//! Rows are never updated or deleted; every balance change is expressed as a
//! new transaction. `balance_after` records the user's balance immediately
//! after the entry was applied, so for consecutive entries
//! `balance_after(n) = balance_after(n-1) + amount(n)` and the latest entry
//! always matches the user's cached `credit_balance`.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Credit transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "credit_transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// User whose ledger this entry belongs to
    pub user_id: i64,
    /// Signed amount: positive for credits, negative for debits
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub amount: Decimal,
    /// The user's balance immediately after this entry
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub balance_after: Decimal,
    /// What kind of movement this entry records
    pub transaction_type: TransactionKind,
    /// Human-readable description of the movement
    pub description: String,
    /// Event this entry relates to, if any
    pub event_id: Option<i64>,
    /// Registration this entry relates to, if any
    pub registration_id: Option<i64>,
    /// When the entry was appended
    pub created_at: DateTimeUtc,
}

/// Kind of ledger movement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum TransactionKind {
    /// Member tops up their balance
    #[sea_orm(string_value = "deposit")]
    Deposit,
    /// Event-end charge (stored amount is negative)
    #[sea_orm(string_value = "spend")]
    Spend,
    /// Money returned to the member
    #[sea_orm(string_value = "refund")]
    Refund,
    /// Manual correction by an admin, either direction
    #[sea_orm(string_value = "admin_adjust")]
    AdminAdjust,
    /// Month-boundary marker kept for ledger compatibility
    #[sea_orm(string_value = "monthly_snapshot")]
    MonthlySnapshot,
}

/// Defines relationships between CreditTransaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
