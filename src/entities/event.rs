//! Event entity - Represents a schedulable sports event with limited capacity.
//!
//! Events are soft-deleted: `is_active` flips to false when an event ends or
//! is retired, and inactive events read as not-found from the core's
//! perspective. `price` is the default per-attendee charge applied by the
//! event-end billing run.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Event database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "events")]
pub struct Model {
    /// Unique identifier for the event
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable title of the event
    pub title: String,
    /// Default per-attendee price charged at event end
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub price: Decimal,
    /// Maximum number of `registered` attendees (always >= 1)
    pub max_attendees: i32,
    /// Soft-delete / ended flag; inactive events are invisible to the core
    pub is_active: bool,
    /// Whether non-admin users can see and join the event
    pub is_public_visible: bool,
    /// When the event starts
    pub start_date: DateTimeUtc,
    /// When the event ends
    pub end_date: DateTimeUtc,
}

/// Defines relationships between Event and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One event has many registrations
    #[sea_orm(has_many = "super::registration::Entity")]
    Registrations,
}

impl Related<super::registration::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Registrations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
