//! Registration and waitlist business logic.
//!
//! Slots are handed out first-come-first-served: each new registration takes
//! the next queue position and becomes `registered` while the event has
//! capacity, `waitlist` after that. Positions are never reshuffled to let a
//! later arrival jump the queue.
//!
//! Every operation here runs in one database transaction, and the row counts
//! that drive status decisions are read inside that transaction, so two
//! simultaneous joins cannot both claim the last slot.
//!
//! Canceling does NOT promote anyone from the waitlist; the freed slot stays
//! empty until a capacity reconciliation or a guest deletion runs. The two
//! removal paths behaving differently is intentional product behavior, kept
//! visible here rather than quietly unified.

use crate::{
    core::{
        event::require_active_event,
        user::{Actor, require_user},
    },
    entities::{Event, Registration, RegistrationStatus, Role, event, registration, user},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::info;

/// Outcome of deleting a guest registration.
#[derive(Debug, Clone)]
pub struct GuestRemoval {
    /// Event the guest was removed from
    pub event_id: i64,
    /// The throwaway guest user that was deleted alongside the registration
    pub removed_user_id: i64,
    /// The waitlisted registration promoted into the freed slot, if any
    pub promoted: Option<registration::Model>,
}

/// Outcome of a capacity change and the reconciliation it triggered.
#[derive(Debug, Clone)]
pub struct CapacityReconciliation {
    /// Event whose capacity changed
    pub event_id: i64,
    /// The capacity now in effect
    pub max_attendees: i32,
    /// Registration ids demoted to the waitlist
    pub demoted: Vec<i64>,
    /// Registration ids promoted to registered
    pub promoted: Vec<i64>,
}

/// Clamps a row count into the position column's type.
fn to_position(count: u64) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

/// Counts the non-canceled rows of an event. Canceled rows have already
/// surrendered their position to the renumbering in
/// [`cancel_registration`], so they must not influence the next tail
/// position.
async fn count_active<C>(conn: &C, event_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    Registration::find()
        .filter(registration::Column::EventId.eq(event_id))
        .filter(registration::Column::Status.ne(RegistrationStatus::Canceled))
        .count(conn)
        .await
        .map_err(Into::into)
}

async fn count_registered<C>(conn: &C, event_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    Registration::find()
        .filter(registration::Column::EventId.eq(event_id))
        .filter(registration::Column::Status.eq(RegistrationStatus::Registered))
        .count(conn)
        .await
        .map_err(Into::into)
}

/// First-come-first-served status for the next arrival.
fn slot_status(registered: u64, max_attendees: i32) -> RegistrationStatus {
    if registered < u64::try_from(max_attendees).unwrap_or(0) {
        RegistrationStatus::Registered
    } else {
        RegistrationStatus::Waitlist
    }
}

/// Registers a user for an event, or reactivates their canceled registration.
///
/// The event must be active and visible to the actor (admins see private
/// events; an invisible event reads as [`Error::EventNotFound`]). A user with
/// an existing non-canceled registration gets [`Error::AlreadyRegistered`]. A
/// previously canceled registration is reactivated in place, keeping its row
/// id, with a fresh registration date and a new tail position.
///
/// Joining never touches the ledger; attendees are billed when the event
/// ends.
pub async fn join_event(
    db: &DatabaseConnection,
    event_id: i64,
    user_id: i64,
    actor: Actor,
) -> Result<registration::Model> {
    let txn = db.begin().await?;

    let event = require_active_event(&txn, event_id).await?;
    if !event.is_public_visible && !actor.sees_private_events() {
        return Err(Error::EventNotFound { id: event_id });
    }
    require_user(&txn, user_id).await?;

    let existing = Registration::find()
        .filter(registration::Column::EventId.eq(event_id))
        .filter(registration::Column::UserId.eq(user_id))
        .one(&txn)
        .await?;

    if let Some(row) = &existing {
        if row.status != RegistrationStatus::Canceled {
            return Err(Error::AlreadyRegistered { event_id, user_id });
        }
    }

    let registered = count_registered(&txn, event_id).await?;
    let status = slot_status(registered, event.max_attendees);
    // The row being reactivated is canceled and therefore not part of this
    // count, so both paths take the same tail position.
    let active_rows = count_active(&txn, event_id).await?;
    let position = to_position(active_rows + 1);

    let model = if let Some(row) = existing {
        let mut active: registration::ActiveModel = row.into();
        active.status = Set(status);
        active.position = Set(position);
        active.registration_date = Set(chrono::Utc::now());
        active.update(&txn).await?
    } else {
        let active = registration::ActiveModel {
            event_id: Set(event_id),
            user_id: Set(user_id),
            status: Set(status),
            position: Set(position),
            registration_date: Set(chrono::Utc::now()),
            has_attended: Set(false),
            payment_processed: Set(false),
            ..Default::default()
        };
        active.insert(&txn).await?
    };

    txn.commit().await?;

    info!(
        event_id,
        user_id,
        status = ?model.status,
        position = model.position,
        "registration recorded"
    );
    Ok(model)
}

/// Cancels a user's registration and closes the position gap.
///
/// Every remaining non-canceled row past the canceled one moves down one
/// position, keeping positions gapless. Nobody is promoted from the waitlist
/// here; see the module docs for why.
pub async fn cancel_registration(
    db: &DatabaseConnection,
    event_id: i64,
    user_id: i64,
) -> Result<registration::Model> {
    let txn = db.begin().await?;

    let row = Registration::find()
        .filter(registration::Column::EventId.eq(event_id))
        .filter(registration::Column::UserId.eq(user_id))
        .filter(registration::Column::Status.ne(RegistrationStatus::Canceled))
        .one(&txn)
        .await?
        .ok_or(Error::RegistrationNotFound { event_id, user_id })?;

    let freed_position = row.position;
    let mut active: registration::ActiveModel = row.into();
    active.status = Set(RegistrationStatus::Canceled);
    let model = active.update(&txn).await?;

    Registration::update_many()
        .col_expr(
            registration::Column::Position,
            Expr::col(registration::Column::Position).sub(1),
        )
        .filter(registration::Column::EventId.eq(event_id))
        .filter(registration::Column::Status.ne(RegistrationStatus::Canceled))
        .filter(registration::Column::Position.gt(freed_position))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    info!(event_id, user_id, freed_position, "registration canceled");
    Ok(model)
}

/// Registers a walk-in guest under a throwaway identity.
///
/// The guest user exists only for the lifetime of this one registration and
/// carries no payment semantics: the row is created with
/// `payment_processed = true` so the billing run skips it. Admin-gated by the
/// calling layer.
pub async fn register_guest(
    db: &DatabaseConnection,
    event_id: i64,
    guest_name: String,
) -> Result<(user::Model, registration::Model)> {
    let txn = db.begin().await?;

    let event = require_active_event(&txn, event_id).await?;

    let guest = user::ActiveModel {
        display_name: Set(guest_name.trim().to_string()),
        role: Set(Role::Guest),
        credit_balance: Set(Decimal::ZERO),
        ..Default::default()
    };
    let guest = guest.insert(&txn).await?;

    let registered = count_registered(&txn, event_id).await?;
    let status = slot_status(registered, event.max_attendees);
    let active_rows = count_active(&txn, event_id).await?;

    let model = registration::ActiveModel {
        event_id: Set(event_id),
        user_id: Set(guest.id),
        status: Set(status),
        position: Set(to_position(active_rows + 1)),
        registration_date: Set(chrono::Utc::now()),
        has_attended: Set(false),
        payment_processed: Set(true),
        ..Default::default()
    };
    let model = model.insert(&txn).await?;

    txn.commit().await?;

    info!(
        event_id,
        guest_id = guest.id,
        status = ?model.status,
        "guest registered"
    );
    Ok((guest, model))
}

/// Deletes a guest registration together with its throwaway user.
///
/// All remaining rows past the deleted one, whatever their status, move down
/// one position. If the guest held a `registered` slot and the event now has
/// room, the earliest waitlisted registration is promoted into it and the
/// rest of the waitlist closes ranks. This is the one removal path that
/// promotes; plain cancellation does not.
pub async fn delete_guest_registration(
    db: &DatabaseConnection,
    registration_id: i64,
) -> Result<GuestRemoval> {
    let txn = db.begin().await?;

    let row = Registration::find_by_id(registration_id)
        .one(&txn)
        .await?
        .ok_or(Error::RegistrationIdNotFound {
            id: registration_id,
        })?;
    let owner = require_user(&txn, row.user_id).await?;
    if owner.role != Role::Guest {
        return Err(Error::GuestOnly { registration_id });
    }

    let event_id = row.event_id;
    let removed_position = row.position;
    let was_registered = row.status == RegistrationStatus::Registered;
    let removed_user_id = owner.id;

    row.delete(&txn).await?;
    owner.delete(&txn).await?;

    // Close the gap for every remaining row, canceled ones included
    Registration::update_many()
        .col_expr(
            registration::Column::Position,
            Expr::col(registration::Column::Position).sub(1),
        )
        .filter(registration::Column::EventId.eq(event_id))
        .filter(registration::Column::Position.gt(removed_position))
        .exec(&txn)
        .await?;

    let mut promoted = None;
    if was_registered {
        let event = Event::find_by_id(event_id)
            .one(&txn)
            .await?
            .ok_or(Error::EventNotFound { id: event_id })?;
        let registered = count_registered(&txn, event_id).await?;

        if registered < u64::try_from(event.max_attendees).unwrap_or(0) {
            let head = Registration::find()
                .filter(registration::Column::EventId.eq(event_id))
                .filter(registration::Column::Status.eq(RegistrationStatus::Waitlist))
                .order_by_asc(registration::Column::Position)
                .order_by_asc(registration::Column::RegistrationDate)
                .one(&txn)
                .await?;

            if let Some(head) = head {
                let vacated_position = head.position;
                let mut active: registration::ActiveModel = head.into();
                active.status = Set(RegistrationStatus::Registered);
                active.position = Set(to_position(registered + 1));
                let model = active.update(&txn).await?;

                Registration::update_many()
                    .col_expr(
                        registration::Column::Position,
                        Expr::col(registration::Column::Position).sub(1),
                    )
                    .filter(registration::Column::EventId.eq(event_id))
                    .filter(registration::Column::Status.eq(RegistrationStatus::Waitlist))
                    .filter(registration::Column::Position.gt(vacated_position))
                    .exec(&txn)
                    .await?;

                promoted = Some(model);
            }
        }
    }

    txn.commit().await?;

    info!(
        event_id,
        registration_id,
        promoted = promoted.is_some(),
        "guest registration deleted"
    );
    Ok(GuestRemoval {
        event_id,
        removed_user_id,
        promoted,
    })
}

/// Changes an event's capacity and reconciles statuses against it.
///
/// Shrinking demotes the first-come-first-served tail of the registered set
/// to the waitlist; growing promotes waitlisted rows in queue order until the
/// new capacity is full. Both directions flip status only and leave positions
/// alone, so running this twice with the same capacity is a no-op.
pub async fn update_event_capacity(
    db: &DatabaseConnection,
    event_id: i64,
    new_max_attendees: i32,
) -> Result<CapacityReconciliation> {
    if new_max_attendees < 1 {
        return Err(Error::InvalidCapacity {
            requested: new_max_attendees,
        });
    }

    let txn = db.begin().await?;

    let event = require_active_event(&txn, event_id).await?;
    let mut active: event::ActiveModel = event.into();
    active.max_attendees = Set(new_max_attendees);
    active.update(&txn).await?;

    let registered = Registration::find()
        .filter(registration::Column::EventId.eq(event_id))
        .filter(registration::Column::Status.eq(RegistrationStatus::Registered))
        .order_by_asc(registration::Column::RegistrationDate)
        .order_by_asc(registration::Column::Id)
        .all(&txn)
        .await?;

    let capacity = usize::try_from(new_max_attendees).unwrap_or(0);
    let mut demoted = Vec::new();
    let mut promoted = Vec::new();

    if registered.len() > capacity {
        // The latest arrivals lose their slots; positions stay untouched
        for row in registered.into_iter().skip(capacity) {
            let id = row.id;
            let mut demote: registration::ActiveModel = row.into();
            demote.status = Set(RegistrationStatus::Waitlist);
            demote.update(&txn).await?;
            demoted.push(id);
        }
    } else if registered.len() < capacity {
        let available = capacity - registered.len();
        let waitlisted = Registration::find()
            .filter(registration::Column::EventId.eq(event_id))
            .filter(registration::Column::Status.eq(RegistrationStatus::Waitlist))
            .order_by_asc(registration::Column::Position)
            .order_by_asc(registration::Column::RegistrationDate)
            .all(&txn)
            .await?;

        for row in waitlisted.into_iter().take(available) {
            let id = row.id;
            let mut promote: registration::ActiveModel = row.into();
            promote.status = Set(RegistrationStatus::Registered);
            promote.update(&txn).await?;
            promoted.push(id);
        }
    }

    txn.commit().await?;

    info!(
        event_id,
        new_max_attendees,
        demoted = demoted.len(),
        promoted = promoted.len(),
        "capacity reconciled"
    );
    Ok(CapacityReconciliation {
        event_id,
        max_attendees: new_max_attendees,
        demoted,
        promoted,
    })
}

/// Retrieves every registration row for an event, ordered by position.
pub async fn get_registrations_for_event(
    db: &DatabaseConnection,
    event_id: i64,
) -> Result<Vec<registration::Model>> {
    Registration::find()
        .filter(registration::Column::EventId.eq(event_id))
        .order_by_asc(registration::Column::Position)
        .order_by_asc(registration::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a registration by its unique ID.
pub async fn get_registration_by_id(
    db: &DatabaseConnection,
    registration_id: i64,
) -> Result<Option<registration::Model>> {
    Registration::find_by_id(registration_id)
        .one(db)
        .await
        .map_err(Into::into)
}
