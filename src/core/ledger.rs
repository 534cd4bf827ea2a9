//! Credit ledger business logic.
//!
//! Every balance change is expressed as a new `credit_transactions` row with
//! a `balance_after` value, written in the same database transaction as the
//! update to the user's cached `credit_balance`. The cached balance is never
//! touched on its own, which keeps it equal to the ledger at all times.
//!
//! [`apply_transaction`] is the single write path; the public operations
//! (deposit, refund, admin adjustment) wrap it with their own validation and
//! transaction boundaries. Billing reuses it inside the billing run's
//! transaction.

use crate::{
    entities::{TransactionKind, credit_transaction},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

/// Direction of a manual admin balance adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustAction {
    /// Credit the user
    Add,
    /// Debit the user; refused if it would overdraw
    Subtract,
}

/// Appends one ledger entry and updates the cached balance, as one unit.
///
/// Reads the user's current balance from the same connection that performs
/// the writes, so callers must pass an open transaction whenever the result
/// feeds further decisions. Fails with [`Error::InsufficientBalance`] when
/// the entry would overdraw and `allow_negative` is false; in that case
/// nothing is written.
///
/// Returns the created transaction row and the new balance.
#[allow(clippy::too_many_arguments)]
pub async fn apply_transaction<C>(
    conn: &C,
    user_id: i64,
    amount: Decimal,
    kind: TransactionKind,
    description: String,
    event_id: Option<i64>,
    registration_id: Option<i64>,
    allow_negative: bool,
) -> Result<(credit_transaction::Model, Decimal)>
where
    C: ConnectionTrait,
{
    if amount.is_zero() {
        return Err(Error::InvalidAmount { amount });
    }

    let user = crate::core::user::require_user(conn, user_id).await?;
    let current = user.credit_balance;
    let new_balance = current + amount;

    if !allow_negative && new_balance < Decimal::ZERO {
        return Err(Error::InsufficientBalance {
            current,
            requested: amount.abs(),
            deficit: -new_balance,
        });
    }

    let entry = credit_transaction::ActiveModel {
        user_id: Set(user_id),
        amount: Set(amount),
        balance_after: Set(new_balance),
        transaction_type: Set(kind),
        description: Set(description),
        event_id: Set(event_id),
        registration_id: Set(registration_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let entry = entry.insert(conn).await?;

    let mut active: crate::entities::user::ActiveModel = user.into();
    active.credit_balance = Set(new_balance);
    active.update(conn).await?;

    Ok((entry, new_balance))
}

/// Credits a deposit to the user's balance.
pub async fn deposit(
    db: &DatabaseConnection,
    user_id: i64,
    amount: Decimal,
) -> Result<credit_transaction::Model> {
    if amount <= Decimal::ZERO {
        return Err(Error::InvalidAmount { amount });
    }

    let txn = db.begin().await?;
    let (entry, new_balance) = apply_transaction(
        &txn,
        user_id,
        amount,
        TransactionKind::Deposit,
        "Credit deposit".to_string(),
        None,
        None,
        true,
    )
    .await?;
    txn.commit().await?;

    info!(user_id, %amount, %new_balance, "deposit recorded");
    Ok(entry)
}

/// Returns money to the user, optionally linked to an event or registration.
pub async fn refund(
    db: &DatabaseConnection,
    user_id: i64,
    amount: Decimal,
    event_id: Option<i64>,
    registration_id: Option<i64>,
    description: String,
) -> Result<credit_transaction::Model> {
    if amount <= Decimal::ZERO {
        return Err(Error::InvalidAmount { amount });
    }

    let txn = db.begin().await?;
    let (entry, new_balance) = apply_transaction(
        &txn,
        user_id,
        amount,
        TransactionKind::Refund,
        description,
        event_id,
        registration_id,
        true,
    )
    .await?;
    txn.commit().await?;

    info!(user_id, %amount, %new_balance, "refund recorded");
    Ok(entry)
}

/// Manually adjusts a user's balance in either direction.
///
/// Additions always succeed; subtractions are refused with
/// [`Error::InsufficientBalance`] when they would overdraw, leaving the
/// ledger untouched.
pub async fn admin_adjust(
    db: &DatabaseConnection,
    user_id: i64,
    action: AdjustAction,
    amount: Decimal,
) -> Result<credit_transaction::Model> {
    if amount <= Decimal::ZERO {
        return Err(Error::InvalidAmount { amount });
    }

    let (signed, allow_negative, label) = match action {
        AdjustAction::Add => (amount, true, "add"),
        AdjustAction::Subtract => (-amount, false, "subtract"),
    };

    let txn = db.begin().await?;
    let (entry, new_balance) = apply_transaction(
        &txn,
        user_id,
        signed,
        TransactionKind::AdminAdjust,
        format!("Admin adjustment ({label})"),
        None,
        None,
        allow_negative,
    )
    .await?;
    txn.commit().await?;

    info!(user_id, %signed, %new_balance, "admin adjustment recorded");
    Ok(entry)
}

/// Retrieves a user's full ledger, newest entry first.
pub async fn get_transactions_for_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<credit_transaction::Model>> {
    crate::entities::CreditTransaction::find()
        .filter(credit_transaction::Column::UserId.eq(user_id))
        .order_by_desc(credit_transaction::Column::CreatedAt)
        .order_by_desc(credit_transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::Role;
    use crate::test_utils::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_deposit_appends_entry_and_updates_cache() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "Alice").await?;

        let entry = deposit(&db, user.id, dec!(100.00)).await?;
        assert_eq!(entry.amount, dec!(100.00));
        assert_eq!(entry.balance_after, dec!(100.00));
        assert_eq!(entry.transaction_type, TransactionKind::Deposit);

        let reloaded = crate::core::user::require_user(&db, user.id).await?;
        assert_eq!(reloaded.credit_balance, dec!(100.00));

        Ok(())
    }

    #[tokio::test]
    async fn test_deposit_rejects_non_positive() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "Alice").await?;

        assert!(matches!(
            deposit(&db, user.id, Decimal::ZERO).await.unwrap_err(),
            Error::InvalidAmount { .. }
        ));
        assert!(matches!(
            deposit(&db, user.id, dec!(-5.00)).await.unwrap_err(),
            Error::InvalidAmount { .. }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_balance_after_chains_across_entries() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "Alice").await?;

        deposit(&db, user.id, dec!(50.00)).await?;
        deposit(&db, user.id, dec!(25.00)).await?;
        admin_adjust(&db, user.id, AdjustAction::Subtract, dec!(10.00)).await?;

        let entries = crate::entities::CreditTransaction::find()
            .filter(credit_transaction::Column::UserId.eq(user.id))
            .order_by_asc(credit_transaction::Column::Id)
            .all(&db)
            .await?;
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].balance_after, dec!(50.00));
        assert_eq!(entries[1].balance_after, dec!(75.00));
        assert_eq!(entries[2].balance_after, dec!(65.00));

        // balance_after(n) = balance_after(n-1) + amount(n)
        for pair in entries.windows(2) {
            assert_eq!(pair[1].balance_after, pair[0].balance_after + pair[1].amount);
        }

        // Cached balance equals the last entry and the full sum
        let reloaded = crate::core::user::require_user(&db, user.id).await?;
        assert_eq!(reloaded.credit_balance, entries.last().unwrap().balance_after);
        let sum: Decimal = entries.iter().map(|e| e.amount).sum();
        assert_eq!(reloaded.credit_balance, sum);

        Ok(())
    }

    #[tokio::test]
    async fn test_admin_subtract_refuses_overdraw() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "Alice").await?;
        deposit(&db, user.id, dec!(30.00)).await?;

        let result = admin_adjust(&db, user.id, AdjustAction::Subtract, dec!(50.00)).await;
        match result.unwrap_err() {
            Error::InsufficientBalance {
                current,
                requested,
                deficit,
            } => {
                assert_eq!(current, dec!(30.00));
                assert_eq!(requested, dec!(50.00));
                assert_eq!(deficit, dec!(20.00));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // Balance unchanged, no entry written
        let reloaded = crate::core::user::require_user(&db, user.id).await?;
        assert_eq!(reloaded.credit_balance, dec!(30.00));
        let entries = get_transactions_for_user(&db, user.id).await?;
        assert_eq!(entries.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_admin_add_then_subtract() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "Alice").await?;

        let add = admin_adjust(&db, user.id, AdjustAction::Add, dec!(40.00)).await?;
        assert_eq!(add.amount, dec!(40.00));
        assert_eq!(add.transaction_type, TransactionKind::AdminAdjust);

        let sub = admin_adjust(&db, user.id, AdjustAction::Subtract, dec!(15.00)).await?;
        assert_eq!(sub.amount, dec!(-15.00));
        assert_eq!(sub.balance_after, dec!(25.00));

        Ok(())
    }

    #[tokio::test]
    async fn test_refund_links_event_and_registration() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "Alice").await?;

        let entry = refund(
            &db,
            user.id,
            dec!(12.50),
            Some(7),
            Some(3),
            "Rainout refund".to_string(),
        )
        .await?;
        assert_eq!(entry.transaction_type, TransactionKind::Refund);
        assert_eq!(entry.event_id, Some(7));
        assert_eq!(entry.registration_id, Some(3));
        assert_eq!(entry.balance_after, dec!(12.50));

        Ok(())
    }

    #[tokio::test]
    async fn test_apply_transaction_unknown_user() -> Result<()> {
        let db = setup_test_db().await?;

        let result = deposit(&db, 999, dec!(10.00)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::UserNotFound { id: 999 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_guest_users_can_hold_zero_balance() -> Result<()> {
        let db = setup_test_db().await?;
        let guest =
            crate::core::user::create_user(&db, "Walk-in".to_string(), Role::Guest).await?;
        assert_eq!(guest.credit_balance, Decimal::ZERO);
        assert!(get_transactions_for_user(&db, guest.id).await?.is_empty());

        Ok(())
    }
}
