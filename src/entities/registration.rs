//! Registration entity - A user's claim on a slot in an event.
//!
//! `position` is a 1-based queue position scoped per event. Among non-canceled
//! rows for an event the positions are gapless 1..N, with registered rows
//! filling the first `max_attendees` slots in arrival order and the rest on
//! the waitlist. The one documented exception is a capacity-shrink demotion,
//! which flips status without renumbering.
//!
//! A canceled row is reused when the same user rejoins the same event, so at
//! most one row exists per (event, user) pair at any time.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Registration database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "registrations")]
pub struct Model {
    /// Unique identifier for the registration
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Event this registration belongs to
    pub event_id: i64,
    /// User holding the slot
    pub user_id: i64,
    /// Current lifecycle status
    pub status: RegistrationStatus,
    /// 1-based queue position within the event
    pub position: i32,
    /// When the user (most recently) joined
    pub registration_date: DateTimeUtc,
    /// Whether the user actually showed up (admin-maintained)
    pub has_attended: bool,
    /// Whether the event-end billing run has charged this row
    pub payment_processed: bool,
}

/// Lifecycle status of a registration.
///
/// `Registered` and `Waitlist` convert into each other as capacity and queue
/// order dictate; `Canceled` is terminal except for in-place reactivation
/// when the same user rejoins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum RegistrationStatus {
    /// Holds one of the event's `max_attendees` slots
    #[sea_orm(string_value = "registered")]
    Registered,
    /// Queued beyond capacity, eligible for promotion
    #[sea_orm(string_value = "waitlist")]
    Waitlist,
    /// Withdrawn; the row is kept for reactivation
    #[sea_orm(string_value = "canceled")]
    Canceled,
}

/// Defines relationships between Registration and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each registration belongs to one event
    #[sea_orm(
        belongs_to = "super::event::Entity",
        from = "Column::EventId",
        to = "super::event::Column::Id"
    )]
    Event,
    /// Each registration belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
