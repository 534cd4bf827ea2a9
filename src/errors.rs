//! Unified error types for the registration and ledger core.
//!
//! Every core operation returns [`Result`]. Variants carry enough context for
//! the calling layer to build a user-facing message without re-querying the
//! store (e.g. [`Error::InsufficientBalance`] carries the current balance, the
//! requested amount, and the deficit).

use rust_decimal::Decimal;
use thiserror::Error;

/// All error conditions surfaced by the core.
#[derive(Debug, Error)]
pub enum Error {
    /// Event does not exist, is inactive, or is not visible to the actor.
    #[error("event {id} not found")]
    EventNotFound {
        /// The event id that was requested
        id: i64,
    },

    /// User does not exist.
    #[error("user {id} not found")]
    UserNotFound {
        /// The user id that was requested
        id: i64,
    },

    /// No non-canceled registration exists for the (event, user) pair.
    #[error("no active registration for user {user_id} in event {event_id}")]
    RegistrationNotFound {
        /// The event the lookup was scoped to
        event_id: i64,
        /// The user the lookup was scoped to
        user_id: i64,
    },

    /// No registration row exists with the given id.
    #[error("registration {id} not found")]
    RegistrationIdNotFound {
        /// The registration id that was requested
        id: i64,
    },

    /// The user already holds a non-canceled registration for the event.
    #[error("user {user_id} is already registered for event {event_id}")]
    AlreadyRegistered {
        /// The event being joined
        event_id: i64,
        /// The user attempting to join
        user_id: i64,
    },

    /// A debit would drive the balance negative and the operation forbids it.
    #[error("insufficient balance: current {current}, requested {requested}, deficit {deficit}")]
    InsufficientBalance {
        /// Balance before the attempted debit
        current: Decimal,
        /// Magnitude of the attempted debit
        requested: Decimal,
        /// How far the balance would have gone below zero
        deficit: Decimal,
    },

    /// Requested event capacity is not a positive number.
    #[error("invalid capacity: {requested} (must be at least 1)")]
    InvalidCapacity {
        /// The rejected capacity value
        requested: i32,
    },

    /// A money amount failed validation (zero where a movement is required,
    /// or non-positive where a positive amount is required).
    #[error("invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
    },

    /// A report was requested for a calendar month that does not exist.
    #[error("invalid month: {year}-{month}")]
    InvalidMonth {
        /// Requested year
        year: i32,
        /// Requested month (must be 1-12)
        month: i32,
    },

    /// The guest-deletion path was invoked on a registration whose user is
    /// not a guest.
    #[error("registration {registration_id} does not belong to a guest user")]
    GuestOnly {
        /// The registration that was targeted
        registration_id: i64,
    },

    /// Underlying store error. Any operation that hits this inside a
    /// transaction rolls back entirely.
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
