//! Persistence adapter for client-side state.
//!
//! Values are stored as JSON strings in a [`KeyValueStore`](crate::traits::store::KeyValueStore).
//! Date fields use the versioned tag from [`tagged_date`] so that a later load
//! can tell a date from a plain string.
//!
//! Reads fail soft: a missing key, an unreadable value or an unavailable store
//! all resolve to the caller's default. Corrupt local state degrades to a
//! fresh start instead of an error.

mod adapter;
pub mod tagged_date;

pub use adapter::Persistence;
