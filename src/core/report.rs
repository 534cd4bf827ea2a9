//! Monthly ledger reporting and snapshots.
//!
//! A monthly report is derived entirely from the append-only transaction
//! ledger: the opening balance is whatever the ledger said going into the
//! month, the closing balance is whatever it said at the end, and the totals
//! partition the month's entries by kind. `net_change` always equals the sum
//! of the month's signed amounts.
//!
//! [`snapshot_month`] persists the same numbers into `monthly_balances`,
//! keyed uniquely per (user, year, month), replacing any earlier snapshot.

use crate::{
    core::user::require_user,
    entities::{
        CreditTransaction, MonthlyBalance, TransactionKind, credit_transaction, monthly_balance,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{DbErr, QueryOrder, Set, TransactionTrait, prelude::*};

/// A user's ledger activity for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyReport {
    /// User the report covers
    pub user_id: i64,
    /// Calendar year
    pub year: i32,
    /// Calendar month (1-12)
    pub month: i32,
    /// Balance going into the month
    pub opening_balance: Decimal,
    /// Sum of deposit amounts
    pub total_deposits: Decimal,
    /// Sum of spend magnitudes (non-negative)
    pub total_spending: Decimal,
    /// Sum of refund amounts
    pub total_refunds: Decimal,
    /// Balance at the end of the month
    pub closing_balance: Decimal,
    /// `closing_balance - opening_balance`; equals the sum of the month's
    /// signed amounts
    pub net_change: Decimal,
    /// How many ledger entries fell in the month
    pub transaction_count: usize,
}

/// UTC instants bounding a calendar month: `[start, end)`.
fn month_window(year: i32, month: i32) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let month_u32 = u32::try_from(month).map_err(|_| Error::InvalidMonth { year, month })?;
    let start =
        NaiveDate::from_ymd_opt(year, month_u32, 1).ok_or(Error::InvalidMonth { year, month })?;
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month_u32 + 1, 1)
    }
    .ok_or(Error::InvalidMonth { year, month })?;

    Ok((
        start.and_time(NaiveTime::MIN).and_utc(),
        end.and_time(NaiveTime::MIN).and_utc(),
    ))
}

/// Computes a user's ledger report for one calendar month.
///
/// With no in-month entries, the opening balance falls back to the most
/// recent `balance_after` from before the month (zero for a ledger that
/// hasn't started yet) and the closing balance equals the opening one.
pub async fn monthly_report(
    db: &DatabaseConnection,
    user_id: i64,
    year: i32,
    month: i32,
) -> Result<MonthlyReport> {
    require_user(db, user_id).await?;
    let (start, end) = month_window(year, month)?;

    let in_range = CreditTransaction::find()
        .filter(credit_transaction::Column::UserId.eq(user_id))
        .filter(credit_transaction::Column::CreatedAt.gte(start))
        .filter(credit_transaction::Column::CreatedAt.lt(end))
        .order_by_asc(credit_transaction::Column::CreatedAt)
        .order_by_asc(credit_transaction::Column::Id)
        .all(db)
        .await?;

    let opening_balance = if let Some(first) = in_range.first() {
        first.balance_after - first.amount
    } else {
        CreditTransaction::find()
            .filter(credit_transaction::Column::UserId.eq(user_id))
            .filter(credit_transaction::Column::CreatedAt.lt(start))
            .order_by_desc(credit_transaction::Column::CreatedAt)
            .order_by_desc(credit_transaction::Column::Id)
            .one(db)
            .await?
            .map_or(Decimal::ZERO, |entry| entry.balance_after)
    };

    let closing_balance = in_range
        .last()
        .map_or(opening_balance, |entry| entry.balance_after);

    let mut total_deposits = Decimal::ZERO;
    let mut total_spending = Decimal::ZERO;
    let mut total_refunds = Decimal::ZERO;
    for entry in &in_range {
        match entry.transaction_type {
            TransactionKind::Deposit => total_deposits += entry.amount,
            TransactionKind::Spend => total_spending += -entry.amount,
            TransactionKind::Refund => total_refunds += entry.amount,
            // Adjustments and snapshot markers move the balance but belong
            // to no reported bucket
            TransactionKind::AdminAdjust | TransactionKind::MonthlySnapshot => {}
        }
    }

    Ok(MonthlyReport {
        user_id,
        year,
        month,
        opening_balance,
        total_deposits,
        total_spending,
        total_refunds,
        closing_balance,
        net_change: closing_balance - opening_balance,
        transaction_count: in_range.len(),
    })
}

/// Computes the monthly report and persists it as the `monthly_balances`
/// snapshot for that (user, year, month), replacing any earlier one.
pub async fn snapshot_month(
    db: &DatabaseConnection,
    user_id: i64,
    year: i32,
    month: i32,
) -> Result<monthly_balance::Model> {
    let report = monthly_report(db, user_id, year, month).await?;

    let txn = db.begin().await?;

    let existing = MonthlyBalance::find_by_id((user_id, year, month))
        .one(&txn)
        .await?;

    let model = if let Some(snapshot) = existing {
        let mut active: monthly_balance::ActiveModel = snapshot.into();
        active.opening_balance = Set(report.opening_balance);
        active.total_deposits = Set(report.total_deposits);
        active.total_spending = Set(report.total_spending);
        active.total_refunds = Set(report.total_refunds);
        active.closing_balance = Set(report.closing_balance);
        active.update(&txn).await?
    } else {
        let active = monthly_balance::ActiveModel {
            user_id: Set(user_id),
            year: Set(year),
            month: Set(month),
            opening_balance: Set(report.opening_balance),
            total_deposits: Set(report.total_deposits),
            total_spending: Set(report.total_spending),
            total_refunds: Set(report.total_refunds),
            closing_balance: Set(report.closing_balance),
        };
        MonthlyBalance::insert(active)
            .exec_without_returning(&txn)
            .await?;
        MonthlyBalance::find_by_id((user_id, year, month))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                Error::Database(DbErr::RecordNotFound("monthly balance snapshot".to_string()))
            })?
    };

    txn.commit().await?;
    Ok(model)
}
