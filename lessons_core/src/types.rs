//! Core domain types for the lesson booking system.
//!
//! This module defines the fundamental records used throughout the system:
//! - Lesson kinds and catalog lessons
//! - Classes (purchased lesson credits)
//! - Subscriptions (bundle purchases)
//! - Timeline entries (teacher calendar slots)
//! - Products (external bundle catalog interface)

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Lesson Types
// ============================================================================

/// Kind of lesson a customer can hold a credit for
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LessonKind {
    Ordinary,
    WithNative,
    MasterClass,
    HappyHour,
    Paired,
}

/// A lesson definition in the catalog (e.g. "Curated session")
///
/// Hosted kinds (master classes, happy hours) carry an optional host teacher;
/// every other kind leaves `host` empty.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub name: String,
    pub kind: LessonKind,
    pub duration_minutes: u32,
    pub slots: u32,
    pub host: Option<Uuid>,
    pub active: bool,
}

impl Lesson {
    /// Lesson duration as a chrono interval
    pub fn duration(&self) -> Duration {
        Duration::minutes(i64::from(self.duration_minutes))
    }

    /// Fixed-schema description of the lesson for listings
    pub fn summary(&self, available_slots_count: Option<u32>) -> LessonSummary {
        LessonSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            required_slots: self.slots,
            duration_minutes: self.duration_minutes,
            host: self.host,
            available_slots_count,
        }
    }
}

/// Serialized lesson description with a fixed schema
///
/// `available_slots_count` is only present when the caller computed it,
/// e.g. when listing lessons a teacher still has room for.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LessonSummary {
    pub id: String,
    pub name: String,
    pub required_slots: u32,
    pub duration_minutes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_slots_count: Option<u32>,
}

// ============================================================================
// Purchase Types
// ============================================================================

/// A bundle purchase that fans out into multiple classes
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub product_id: String,
    pub buy_price_minor: i64,
    pub active: bool,
    pub bought_at: DateTime<Utc>,
}

/// A single purchased, schedulable lesson credit
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Class {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub lesson_id: String,
    pub kind: LessonKind,
    pub subscription_id: Option<Uuid>,
    pub active: bool,
    pub timeline_entry_id: Option<Uuid>,
    pub bought_at: DateTime<Utc>,
}

impl Class {
    /// A class is scheduled exactly when it references a timeline entry
    pub fn is_scheduled(&self) -> bool {
        self.timeline_entry_id.is_some()
    }
}

// ============================================================================
// Timeline Types
// ============================================================================

/// A teacher's calendar slot with capacity
///
/// `kind` and `slots` are taken from the bound lesson at creation time.
/// The taken-slot count is never stored; it is always derived by counting
/// the classes that reference the entry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub lesson_id: String,
    pub kind: LessonKind,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub slots: u32,
    pub active: bool,
    pub allow_overlap: bool,
}

// ============================================================================
// Product Types (external bundle catalog interface)
// ============================================================================

/// One `(lesson, quantity)` line of a product
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LessonUnit {
    pub lesson_id: String,
    pub quantity: u32,
}

/// A purchasable bundle from the external product catalog
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub units: Vec<LessonUnit>,
}

impl Product {
    /// The lesson units this bundle fans out into
    pub fn lesson_units(&self) -> &[LessonUnit] {
        &self.units
    }

    /// Total number of classes a purchase of this product creates
    pub fn total_quantity(&self) -> u32 {
        self.units.iter().map(|u| u.quantity).sum()
    }
}
