//! Core business logic - framework-agnostic registration, ledger, billing,
//! and reporting operations.
//!
//! Everything in here talks to the store through `SeaORM` and is callable from
//! any front end (web handlers, CLI, tests). Operations that make decisions
//! from row counts or balances read and write inside a single database
//! transaction so concurrent calls cannot interleave.

/// Event-end billing run
pub mod billing;
/// Event CRUD and soft deletion
pub mod event;
/// Credit ledger: deposits, refunds, admin adjustments
pub mod ledger;
/// Registration and waitlist position tracking
pub mod registration;
/// Monthly ledger reports and snapshots
pub mod report;
/// User CRUD and the capability-role value object
pub mod user;
