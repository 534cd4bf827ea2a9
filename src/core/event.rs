//! Event business logic - creation, lookup, visibility, and soft deletion.
//!
//! Events are never removed from the store: `deactivate_event` flips
//! `is_active` off, after which the event reads as not-found everywhere in
//! the core. Capacity changes go through
//! [`crate::core::registration::update_event_capacity`] because they must
//! reconcile the waitlist in the same transaction.

use crate::{
    entities::{Event, event},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{Set, prelude::*};

/// Creates a new event.
///
/// Validates that the capacity is at least 1 and the price is not negative.
pub async fn create_event(
    db: &DatabaseConnection,
    title: String,
    price: Decimal,
    max_attendees: i32,
    is_public_visible: bool,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
) -> Result<event::Model> {
    if max_attendees < 1 {
        return Err(Error::InvalidCapacity {
            requested: max_attendees,
        });
    }

    if price < Decimal::ZERO {
        return Err(Error::InvalidAmount { amount: price });
    }

    let model = event::ActiveModel {
        title: Set(title.trim().to_string()),
        price: Set(price),
        max_attendees: Set(max_attendees),
        is_active: Set(true),
        is_public_visible: Set(is_public_visible),
        start_date: Set(start_date),
        end_date: Set(end_date),
        ..Default::default()
    };

    model.insert(db).await.map_err(Into::into)
}

/// Finds an event by its unique ID, returning None if absent.
pub async fn get_event_by_id(
    db: &DatabaseConnection,
    event_id: i64,
) -> Result<Option<event::Model>> {
    Event::find_by_id(event_id).one(db).await.map_err(Into::into)
}

/// Finds an active event by ID, failing with [`Error::EventNotFound`] if the
/// event is absent or inactive.
///
/// Generic over the connection so it can run inside a caller's transaction.
pub async fn require_active_event<C>(conn: &C, event_id: i64) -> Result<event::Model>
where
    C: ConnectionTrait,
{
    let event = Event::find_by_id(event_id)
        .one(conn)
        .await?
        .ok_or(Error::EventNotFound { id: event_id })?;

    if !event.is_active {
        return Err(Error::EventNotFound { id: event_id });
    }

    Ok(event)
}

/// Soft-deletes an event by flipping `is_active` off.
pub async fn deactivate_event(db: &DatabaseConnection, event_id: i64) -> Result<event::Model> {
    let event = require_active_event(db, event_id).await?;

    let mut active: event::ActiveModel = event.into();
    active.is_active = Set(false);
    active.update(db).await.map_err(Into::into)
}

/// Updates whether non-admin users can see and join the event.
pub async fn set_event_visibility(
    db: &DatabaseConnection,
    event_id: i64,
    is_public_visible: bool,
) -> Result<event::Model> {
    let event = require_active_event(db, event_id).await?;

    let mut active: event::ActiveModel = event.into();
    active.is_public_visible = Set(is_public_visible);
    active.update(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_create_event_rejects_zero_capacity() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_custom_event(&db, "Futsal", dec!(10.00), 0, true).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidCapacity { requested: 0 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_event_rejects_negative_price() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_custom_event(&db, "Futsal", dec!(-1.00), 8, true).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_deactivate_event_reads_as_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_test_event(&db, "Badminton", 4).await?;

        let deactivated = deactivate_event(&db, event.id).await?;
        assert!(!deactivated.is_active);

        // The row still exists, but the core treats it as absent
        assert!(get_event_by_id(&db, event.id).await?.is_some());
        let result = require_active_event(&db, event.id).await;
        assert!(matches!(result.unwrap_err(), Error::EventNotFound { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_set_event_visibility() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_test_event(&db, "Badminton", 4).await?;
        assert!(event.is_public_visible);

        let hidden = set_event_visibility(&db, event.id, false).await?;
        assert!(!hidden.is_public_visible);

        Ok(())
    }
}
