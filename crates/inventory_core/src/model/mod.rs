//! Domain model for the equipment inventory.
//!
//! # Responsibility
//! - Define the plain records stored by the record store.
//! - Keep validation separate from storage and serialization shapes.
//!
//! # Invariants
//! - Every record is identified by a stable UUID assigned at creation.
//! - Equipment deletion is a soft-delete tombstone; employees are removed.
//! - Timestamps carry millisecond precision, matching storage.

use chrono::{DateTime, Utc};

pub mod employee;
pub mod equipment;
pub mod validation;

/// Current UTC time truncated to the millisecond precision used by storage.
pub fn current_timestamp() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}
