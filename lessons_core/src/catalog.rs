//! Lesson type registry and default catalog.
//!
//! Scheduling policy lives on [`LessonKind`] as a flat dispatch table, one
//! method per policy question. The catalog itself maps lesson ids to catalog
//! rows, product ids to bundles, and kinds to their canonical purchasable
//! instance (the default registry).

use crate::types::{Lesson, LessonKind, LessonUnit, Product};
use crate::{Error, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

impl LessonKind {
    /// Every kind the system knows about
    pub const ALL: [LessonKind; 5] = [
        LessonKind::Ordinary,
        LessonKind::WithNative,
        LessonKind::MasterClass,
        LessonKind::HappyHour,
        LessonKind::Paired,
    ];

    /// Does this kind require a teacher to craft a timeline entry up front?
    ///
    /// Kinds answering `false` get a private entry created automatically
    /// when a class is scheduled, and that entry retires itself once the
    /// last occupant leaves.
    pub fn requires_timeline_entry(self) -> bool {
        self.is_hosted()
    }

    /// Hosted kinds carry an assigned host teacher on their lessons
    pub fn is_hosted(self) -> bool {
        matches!(self, LessonKind::MasterClass | LessonKind::HappyHour)
    }

    /// Can a customer plan this kind themselves?
    ///
    /// Paired lessons are planned by the system only.
    pub fn can_be_directly_planned(self) -> bool {
        !matches!(self, LessonKind::Paired)
    }

    /// Position in generic listings; kinds returning `None` are hidden
    pub fn sort_order(self) -> Option<i32> {
        match self {
            LessonKind::Ordinary => Some(100),
            LessonKind::WithNative => Some(200),
            LessonKind::MasterClass => Some(300),
            LessonKind::HappyHour => Some(400),
            LessonKind::Paired => None,
        }
    }
}

/// The catalog of lessons, products and per-kind defaults
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub lessons: HashMap<String, Lesson>,
    pub products: HashMap<String, Product>,
    pub defaults: HashMap<LessonKind, String>,
}

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog with built-in lessons and the fixture product
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns
/// a cached reference. This function is retained for testing and custom
/// catalog creation.
pub fn build_default_catalog() -> Catalog {
    build_default_catalog_internal()
}

fn build_default_catalog_internal() -> Catalog {
    let mut lessons = HashMap::new();
    let mut products = HashMap::new();
    let mut defaults = HashMap::new();

    // ========================================================================
    // Lessons
    // ========================================================================

    lessons.insert(
        "ordinary_default".into(),
        Lesson {
            id: "ordinary_default".into(),
            name: "Curated session".into(),
            kind: LessonKind::Ordinary,
            duration_minutes: 30,
            slots: 1,
            host: None,
            active: true,
        },
    );

    lessons.insert(
        "with_native_default".into(),
        Lesson {
            id: "with_native_default".into(),
            name: "Native speaker session".into(),
            kind: LessonKind::WithNative,
            duration_minutes: 30,
            slots: 1,
            host: None,
            active: true,
        },
    );

    lessons.insert(
        "paired_default".into(),
        Lesson {
            id: "paired_default".into(),
            name: "Paired lesson".into(),
            kind: LessonKind::Paired,
            duration_minutes: 30,
            slots: 2,
            host: None,
            active: true,
        },
    );

    // Hosted kinds ship no catalog rows: master classes and happy hours are
    // configured per event by their hosts and never land in `defaults`.

    defaults.insert(LessonKind::Ordinary, "ordinary_default".into());
    defaults.insert(LessonKind::WithNative, "with_native_default".into());
    defaults.insert(LessonKind::Paired, "paired_default".into());

    // ========================================================================
    // Products
    // ========================================================================

    products.insert(
        "six_lessons".into(),
        Product {
            id: "six_lessons".into(),
            name: "Six lessons pack".into(),
            units: vec![
                LessonUnit {
                    lesson_id: "ordinary_default".into(),
                    quantity: 4,
                },
                LessonUnit {
                    lesson_id: "with_native_default".into(),
                    quantity: 2,
                },
            ],
        },
    );

    Catalog {
        lessons,
        products,
        defaults,
    }
}

impl Catalog {
    /// Resolve the canonical purchasable lesson for a kind
    ///
    /// Hosted kinds (and kinds without a registered default) cannot be
    /// bought generically and fail with `NotPurchasableDirectly`; callers
    /// listing kinds for purchase must treat that as "unavailable", not as
    /// a fatal error.
    pub fn default_lesson(&self, kind: LessonKind) -> Result<&Lesson> {
        if kind.is_hosted() {
            return Err(Error::NotPurchasableDirectly(kind));
        }
        let id = self
            .defaults
            .get(&kind)
            .ok_or(Error::NotPurchasableDirectly(kind))?;
        self.lessons
            .get(id)
            .ok_or_else(|| Error::NotFound("lesson", id.clone()))
    }

    /// Kinds shown in generic listings, in sort order
    pub fn purchasable_kinds(&self) -> Vec<LessonKind> {
        let mut kinds: Vec<LessonKind> = LessonKind::ALL
            .into_iter()
            .filter(|k| k.sort_order().is_some())
            .collect();
        kinds.sort_by_key(|k| k.sort_order());
        kinds
    }

    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (id, lesson) in &self.lessons {
            if id.is_empty() || lesson.id.is_empty() {
                errors.push("Lesson has empty ID".to_string());
            }
            if id != &lesson.id {
                errors.push(format!(
                    "Lesson key '{}' doesn't match lesson.id '{}'",
                    id, lesson.id
                ));
            }
            if lesson.name.is_empty() {
                errors.push(format!("Lesson '{}' has empty name", id));
            }
            if lesson.slots == 0 {
                errors.push(format!("Lesson '{}' has zero slots", id));
            }
            if lesson.duration_minutes == 0 {
                errors.push(format!("Lesson '{}' has zero duration", id));
            }
            if lesson.host.is_some() && !lesson.kind.is_hosted() {
                errors.push(format!(
                    "Lesson '{}' has a host but {:?} is not a hosted kind",
                    id, lesson.kind
                ));
            }
        }

        for (kind, id) in &self.defaults {
            if kind.is_hosted() {
                errors.push(format!(
                    "Hosted kind {:?} must not have a default lesson",
                    kind
                ));
            }
            match self.lessons.get(id) {
                None => errors.push(format!(
                    "Default for {:?} references non-existent lesson '{}'",
                    kind, id
                )),
                Some(lesson) if lesson.kind != *kind => errors.push(format!(
                    "Default for {:?} references lesson '{}' of kind {:?}",
                    kind, id, lesson.kind
                )),
                Some(_) => {}
            }
        }

        for (id, product) in &self.products {
            if id.is_empty() || product.id.is_empty() {
                errors.push("Product has empty ID".to_string());
            }
            if id != &product.id {
                errors.push(format!(
                    "Product key '{}' doesn't match product.id '{}'",
                    id, product.id
                ));
            }
            if product.units.is_empty() {
                errors.push(format!("Product '{}' has no lesson units", id));
            }

            for unit in &product.units {
                if unit.quantity == 0 {
                    errors.push(format!(
                        "Product '{}' has a zero-quantity unit for '{}'",
                        id, unit.lesson_id
                    ));
                }
                match self.lessons.get(&unit.lesson_id) {
                    None => errors.push(format!(
                        "Product '{}' references non-existent lesson '{}'",
                        id, unit.lesson_id
                    )),
                    Some(lesson) if lesson.kind.is_hosted() => errors.push(format!(
                        "Product '{}' bundles hosted lesson '{}'",
                        id, unit.lesson_id
                    )),
                    Some(_) => {}
                }
            }
        }

        errors
    }
}
