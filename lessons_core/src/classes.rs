//! Class lifecycle engine: purchases and schedule/unschedule transitions.
//!
//! A class is in one of two states, derived from its entry reference:
//! `Unscheduled` (no entry) or `Scheduled` (attached to an entry). The
//! transitions here delegate slot bookkeeping to the slot engine and own
//! the cascading rules between a class and its entry.

use crate::store::BookingStore;
use crate::timeline::EntryOptions;
use crate::types::{Class, LessonKind};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use uuid::Uuid;

impl BookingStore {
    /// Buy a single lesson credit for a specific catalog lesson
    pub fn buy_lesson(&mut self, customer_id: Uuid, lesson_id: &str) -> Result<Uuid> {
        let lesson = self.lesson(lesson_id)?;
        let class = Class {
            id: Uuid::new_v4(),
            customer_id,
            lesson_id: lesson.id.clone(),
            kind: lesson.kind,
            subscription_id: None,
            active: true,
            timeline_entry_id: None,
            bought_at: Utc::now(),
        };
        let class_id = class.id;

        tracing::debug!(
            "Customer {} bought class {} ({:?})",
            customer_id,
            class_id,
            class.kind
        );
        self.classes.insert(class_id, class);
        Ok(class_id)
    }

    /// Buy the generic lesson of a kind through the default registry
    ///
    /// Hosted kinds have no generic instance; this surfaces
    /// `NotPurchasableDirectly` for them.
    pub fn buy_default_lesson(&mut self, customer_id: Uuid, kind: LessonKind) -> Result<Uuid> {
        let lesson_id = self.catalog.default_lesson(kind)?.id.clone();
        self.buy_lesson(customer_id, &lesson_id)
    }

    /// Schedule a class into an existing timeline entry
    ///
    /// Only unscheduled, active classes can transition. The structural type
    /// check happens here; capacity and host checks are delegated to the
    /// slot engine.
    pub fn schedule(&mut self, class_id: Uuid, entry_id: Uuid) -> Result<()> {
        {
            let class = self.class(class_id)?;
            if !class.active {
                return Err(Error::InactiveClass);
            }
            if class.is_scheduled() {
                return Err(Error::CannotBeScheduled(
                    "class is already scheduled".into(),
                ));
            }

            let entry = self.entry(entry_id)?;
            if entry.kind != class.kind {
                return Err(Error::CannotBeScheduled(format!(
                    "a {:?} class can not take a {:?} timeline entry",
                    class.kind, entry.kind
                )));
            }
        }

        self.attach_class(entry_id, class_id)?;
        tracing::info!("Scheduled class {} into entry {}", class_id, entry_id);
        Ok(())
    }

    /// Schedule a class straight onto a teacher's calendar
    ///
    /// Convenience path for kinds that do not require a specially crafted
    /// entry: a private entry sized by the lesson is synthesized and the
    /// normal transition runs against it.
    pub fn schedule_on(
        &mut self,
        class_id: Uuid,
        teacher_id: Uuid,
        start: DateTime<Utc>,
        allow_besides_working_hours: bool,
    ) -> Result<()> {
        let lesson_id = {
            let class = self.class(class_id)?;
            if !class.active {
                return Err(Error::InactiveClass);
            }
            if class.is_scheduled() {
                return Err(Error::CannotBeScheduled(
                    "class is already scheduled".into(),
                ));
            }
            if class.kind.requires_timeline_entry() {
                return Err(Error::CannotBeScheduled(format!(
                    "{:?} lessons require a dedicated timeline entry",
                    class.kind
                )));
            }
            class.lesson_id.clone()
        };

        let entry_id = self.create_entry(
            teacher_id,
            &lesson_id,
            start,
            None,
            EntryOptions {
                allow_overlap: false,
                allow_besides_working_hours,
            },
        )?;
        self.schedule(class_id, entry_id)
    }

    /// Take a scheduled class off its entry
    ///
    /// The detach retires the entry when its kind does not require a
    /// dedicated one and no occupants remain.
    pub fn unschedule(&mut self, class_id: Uuid) -> Result<()> {
        if !self.class(class_id)?.is_scheduled() {
            return Err(Error::CannotBeUnscheduled);
        }

        self.detach_class(class_id)?;
        tracing::info!("Unscheduled class {}", class_id);
        Ok(())
    }

    /// Delete a class, cascading per entry policy
    ///
    /// A private entry with no remaining occupants goes with the class; a
    /// dedicated (hosted) entry survives and merely loses one occupant.
    pub fn delete_class(&mut self, class_id: Uuid) -> Result<()> {
        if self.class(class_id)?.is_scheduled() {
            self.detach_class(class_id)?;
        }

        self.classes.remove(&class_id);
        tracing::info!("Deleted class {}", class_id);
        Ok(())
    }
}
