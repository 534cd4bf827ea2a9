//! Event-end billing business logic.
//!
//! When an event ends, every `registered` attendee is debited the event price
//! (or an admin-supplied per-user override) through the ledger. The whole run
//! is one database transaction: the event is deactivated, every debit is
//! appended, and every billed row is marked `payment_processed`, or none of
//! it happens.
//!
//! Billing is the only balance-changing operation that may overdraw: the
//! event has already happened, so the debt is recorded even when the member
//! cannot cover it. Overdrawn members come back in the manifest's warning
//! list for admin follow-up instead of failing the run.

use crate::{
    core::{event::require_active_event, ledger},
    entities::{Registration, RegistrationStatus, TransactionKind, event, registration},
    errors::Result,
};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::HashMap;
use tracing::{info, warn};

/// One billed attendee in the manifest.
#[derive(Debug, Clone)]
pub struct BilledAttendee {
    /// The user that was charged
    pub user_id: i64,
    /// The registration the charge settles
    pub registration_id: i64,
    /// Ledger entry recording the charge; None for zero-price attendees
    pub transaction_id: Option<i64>,
    /// The amount charged
    pub charge: Decimal,
    /// Balance before the charge
    pub balance_before: Decimal,
    /// Balance after the charge
    pub balance_after: Decimal,
}

/// A member whose balance went negative during the run.
#[derive(Debug, Clone)]
pub struct NegativeBalanceWarning {
    /// The overdrawn user
    pub user_id: i64,
    /// How far below zero the balance ended up
    pub deficit: Decimal,
}

/// Structured outcome of one billing run.
#[derive(Debug, Clone)]
pub struct BillingManifest {
    /// Event that was finalized
    pub event_id: i64,
    /// Everyone who was charged, in queue order
    pub billed: Vec<BilledAttendee>,
    /// Members who ended the run overdrawn, for admin follow-up
    pub negative_balances: Vec<NegativeBalanceWarning>,
}

/// Ends an event and bills every registered attendee.
///
/// The event must still be active; finalization flips `is_active` off and
/// cannot be undone through this path. Waitlisted and canceled registrations
/// are never billed, and rows already marked `payment_processed` (guests) are
/// skipped. Per-user prices in `price_overrides` replace the event default
/// for those users.
pub async fn finalize_event(
    db: &DatabaseConnection,
    event_id: i64,
    price_overrides: &HashMap<i64, Decimal>,
) -> Result<BillingManifest> {
    let txn = db.begin().await?;

    let event = require_active_event(&txn, event_id).await?;
    let title = event.title.clone();
    let default_price = event.price;

    let mut deactivate: event::ActiveModel = event.into();
    deactivate.is_active = Set(false);
    deactivate.update(&txn).await?;

    let attendees = Registration::find()
        .filter(registration::Column::EventId.eq(event_id))
        .filter(registration::Column::Status.eq(RegistrationStatus::Registered))
        .order_by_asc(registration::Column::Position)
        .all(&txn)
        .await?;

    let mut billed = Vec::new();
    let mut negative_balances = Vec::new();

    for reg in attendees {
        if reg.payment_processed {
            continue;
        }

        let charge = price_overrides
            .get(&reg.user_id)
            .copied()
            .unwrap_or(default_price);

        let (transaction_id, balance_after) = if charge.is_zero() {
            // Free for this attendee; nothing to append to the ledger
            let user = crate::core::user::require_user(&txn, reg.user_id).await?;
            (None, user.credit_balance)
        } else {
            let (entry, new_balance) = ledger::apply_transaction(
                &txn,
                reg.user_id,
                -charge,
                TransactionKind::Spend,
                format!("Event billing: {title}"),
                Some(event_id),
                Some(reg.id),
                true,
            )
            .await?;
            (Some(entry.id), new_balance)
        };

        if balance_after < Decimal::ZERO {
            let deficit = -balance_after;
            warn!(
                user_id = reg.user_id,
                event_id,
                %deficit,
                "billing drove balance negative"
            );
            negative_balances.push(NegativeBalanceWarning {
                user_id: reg.user_id,
                deficit,
            });
        }

        billed.push(BilledAttendee {
            user_id: reg.user_id,
            registration_id: reg.id,
            transaction_id,
            charge,
            balance_before: balance_after + charge,
            balance_after,
        });

        let mut settle: registration::ActiveModel = reg.into();
        settle.payment_processed = Set(true);
        settle.update(&txn).await?;
    }

    txn.commit().await?;

    info!(
        event_id,
        billed = billed.len(),
        overdrawn = negative_balances.len(),
        "event finalized"
    );
    Ok(BillingManifest {
        event_id,
        billed,
        negative_balances,
    })
}
