#![forbid(unsafe_code)]

//! Core domain model and business logic for the lesson booking system.
//!
//! This crate provides:
//! - Domain types (lessons, classes, subscriptions, timeline entries)
//! - Lesson type registry and catalog management
//! - Slot engine (teacher timeline entries with capacity)
//! - Class lifecycle engine (schedule/unschedule transitions)
//! - Subscription fan-out
//! - Persistence (locked atomic store snapshots)

pub mod types;
pub mod error;
pub mod catalog;
pub mod teachers;
pub mod config;
pub mod logging;
pub mod store;
pub mod timeline;
pub mod classes;
pub mod subscriptions;
pub mod state;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog, Catalog};
pub use teachers::{load_teacher_roster, Teacher, WorkingHours};
pub use config::Config;
pub use store::BookingStore;
pub use timeline::{EntryCheck, EntryOptions};
