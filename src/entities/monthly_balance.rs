//! Monthly balance entity - Cached per-month ledger summary for one user.
//!
//! Derived entirely from `credit_transactions`; the composite primary key
//! (`user_id`, `year`, `month`) makes the snapshot unique per user-month and
//! lets the snapshot operation upsert in place.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Monthly balance snapshot database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "monthly_balances")]
pub struct Model {
    /// User the snapshot belongs to
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i64,
    /// Calendar year of the snapshot
    #[sea_orm(primary_key, auto_increment = false)]
    pub year: i32,
    /// Calendar month of the snapshot (1-12)
    #[sea_orm(primary_key, auto_increment = false)]
    pub month: i32,
    /// Balance at the start of the month
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub opening_balance: Decimal,
    /// Sum of deposit amounts in the month
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub total_deposits: Decimal,
    /// Sum of spend magnitudes in the month (non-negative)
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub total_spending: Decimal,
    /// Sum of refund amounts in the month
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub total_refunds: Decimal,
    /// Balance at the end of the month
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub closing_balance: Decimal,
}

/// Defines relationships between MonthlyBalance and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each snapshot belongs to one user
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
