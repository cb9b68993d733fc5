//! Trait definitions for extensible components
//!
//! These traits allow users to swap the durable store behind the
//! subscription record for their own implementation.

pub mod store;
