//! The booking store: catalog plus the three relational tables.
//!
//! `BookingStore` owns every row the scheduling core works on. All mutating
//! operations take `&mut self`, so a check-then-act sequence (capacity check
//! before attach, detach before retire) is a single critical section by
//! construction; there is no partially-applied state for another caller to
//! observe.
//!
//! The slot engine, class lifecycle and subscription fan-out live in their
//! own modules as further `impl BookingStore` blocks.

use crate::catalog::{get_default_catalog, Catalog};
use crate::teachers::Teacher;
use crate::types::{Class, Lesson, Subscription, TimelineEntry};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// All booking state: catalog rows plus subscriptions, classes and entries
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BookingStore {
    pub catalog: Catalog,
    pub teachers: HashMap<Uuid, Teacher>,
    pub subscriptions: HashMap<Uuid, Subscription>,
    pub classes: HashMap<Uuid, Class>,
    pub entries: HashMap<Uuid, TimelineEntry>,
}

impl Default for BookingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingStore {
    /// Create a store seeded from the default catalog
    pub fn new() -> Self {
        Self::from_catalog(get_default_catalog().clone())
    }

    /// Create a store seeded from a specific catalog
    pub fn from_catalog(catalog: Catalog) -> Self {
        Self {
            catalog,
            teachers: HashMap::new(),
            subscriptions: HashMap::new(),
            classes: HashMap::new(),
            entries: HashMap::new(),
        }
    }

    // ========================================================================
    // Row accessors
    // ========================================================================

    pub fn teacher(&self, id: Uuid) -> Result<&Teacher> {
        self.teachers
            .get(&id)
            .ok_or_else(|| Error::NotFound("teacher", id.to_string()))
    }

    pub fn lesson(&self, id: &str) -> Result<&Lesson> {
        self.catalog
            .lessons
            .get(id)
            .ok_or_else(|| Error::NotFound("lesson", id.to_string()))
    }

    pub fn class(&self, id: Uuid) -> Result<&Class> {
        self.classes
            .get(&id)
            .ok_or_else(|| Error::NotFound("class", id.to_string()))
    }

    pub fn entry(&self, id: Uuid) -> Result<&TimelineEntry> {
        self.entries
            .get(&id)
            .ok_or_else(|| Error::NotFound("timeline entry", id.to_string()))
    }

    pub fn subscription(&self, id: Uuid) -> Result<&Subscription> {
        self.subscriptions
            .get(&id)
            .ok_or_else(|| Error::NotFound("subscription", id.to_string()))
    }

    // ========================================================================
    // Roster and catalog maintenance
    // ========================================================================

    /// Insert or replace a teacher from the external roster
    pub fn upsert_teacher(&mut self, teacher: Teacher) {
        tracing::debug!("Upserting teacher {} ({})", teacher.name, teacher.id);
        self.teachers.insert(teacher.id, teacher);
    }

    /// Add a lesson row to the catalog
    ///
    /// For hosted kinds with an assigned host, the host must exist and must
    /// accept the kind; otherwise the save fails with
    /// `InvalidHostAssignment` and the catalog is untouched.
    pub fn add_lesson(&mut self, lesson: Lesson) -> Result<()> {
        if lesson.kind.is_hosted() {
            if let Some(host_id) = lesson.host {
                let host = self.teacher(host_id)?;
                if !host.accepts(lesson.kind) {
                    return Err(Error::InvalidHostAssignment(format!(
                        "teacher {} can not accept lesson {:?}",
                        host.name, lesson.kind
                    )));
                }
            }
        }

        tracing::debug!("Adding lesson '{}' ({:?})", lesson.id, lesson.kind);
        self.catalog.lessons.insert(lesson.id.clone(), lesson);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LessonKind;
    use chrono::NaiveTime;
    use std::collections::HashSet;
    use crate::teachers::WorkingHours;

    fn host_teacher(accepts: &[LessonKind]) -> Teacher {
        Teacher {
            id: Uuid::new_v4(),
            name: "Olga".into(),
            working_hours: vec![WorkingHours {
                weekday: 0,
                start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                end: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            }],
            acceptable_kinds: accepts.iter().copied().collect::<HashSet<_>>(),
        }
    }

    fn master_class(host: Option<Uuid>) -> Lesson {
        Lesson {
            id: "spring_master_class".into(),
            name: "Spring master class".into(),
            kind: LessonKind::MasterClass,
            duration_minutes: 60,
            slots: 10,
            host,
            active: true,
        }
    }

    #[test]
    fn test_new_store_is_seeded() {
        let store = BookingStore::new();
        assert_eq!(store.catalog.lessons.len(), 3);
        assert!(store.teachers.is_empty());
        assert!(store.classes.is_empty());
    }

    #[test]
    fn test_missing_rows_report_not_found() {
        let store = BookingStore::new();
        assert!(matches!(
            store.class(Uuid::new_v4()),
            Err(Error::NotFound("class", _))
        ));
        assert!(matches!(
            store.lesson("no_such_lesson"),
            Err(Error::NotFound("lesson", _))
        ));
    }

    #[test]
    fn test_add_hosted_lesson_with_accepting_host() {
        let mut store = BookingStore::new();
        let teacher = host_teacher(&[LessonKind::MasterClass]);
        let teacher_id = teacher.id;
        store.upsert_teacher(teacher);

        store.add_lesson(master_class(Some(teacher_id))).unwrap();
        assert!(store.lesson("spring_master_class").is_ok());
    }

    #[test]
    fn test_add_hosted_lesson_with_rejecting_host_fails() {
        let mut store = BookingStore::new();
        let teacher = host_teacher(&[LessonKind::HappyHour]);
        let teacher_id = teacher.id;
        store.upsert_teacher(teacher);

        let result = store.add_lesson(master_class(Some(teacher_id)));
        assert!(matches!(result, Err(Error::InvalidHostAssignment(_))));
        assert!(store.lesson("spring_master_class").is_err());
    }

    #[test]
    fn test_add_hosted_lesson_without_host_is_allowed() {
        let mut store = BookingStore::new();
        store.add_lesson(master_class(None)).unwrap();
        assert!(store.lesson("spring_master_class").is_ok());
    }

    #[test]
    fn test_upsert_teacher_replaces() {
        let mut store = BookingStore::new();
        let mut teacher = host_teacher(&[]);
        let id = teacher.id;
        store.upsert_teacher(teacher.clone());

        teacher.name = "Olga Petrovna".into();
        store.upsert_teacher(teacher);

        assert_eq!(store.teacher(id).unwrap().name, "Olga Petrovna");
        assert_eq!(store.teachers.len(), 1);
    }
}
