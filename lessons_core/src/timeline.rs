//! Slot engine: teacher timeline entries with capacity.
//!
//! Entries are created explicitly by a teacher/admin for hosted lessons, or
//! synthesized by the class lifecycle engine for kinds that do not require a
//! dedicated entry. The taken-slot count is always derived from the class
//! table, so it can never drift from the rows that actually reference an
//! entry.

use crate::store::BookingStore;
use crate::types::TimelineEntry;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Escape hatches for entry creation checks
///
/// Both default to off: entries must not overlap and must fit the teacher's
/// working hours unless the caller explicitly says otherwise.
#[derive(Clone, Copy, Debug, Default)]
pub struct EntryOptions {
    pub allow_overlap: bool,
    pub allow_besides_working_hours: bool,
}

/// Advisory fitness report for a prospective entry
///
/// Produced by [`BookingStore::check_entry`] for client-side validation
/// before an enforcing create call; it reports and never blocks.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct EntryCheck {
    pub is_overlapping: bool,
    pub is_fitting_hours: bool,
}

impl BookingStore {
    /// Create a timeline entry for a teacher
    ///
    /// `end` defaults to `start` plus the lesson duration. For hosted
    /// lessons bound to a host, the entry must sit in that host's own
    /// timeline. Overlap and working-hours checks can each be bypassed via
    /// [`EntryOptions`].
    pub fn create_entry(
        &mut self,
        teacher_id: Uuid,
        lesson_id: &str,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
        opts: EntryOptions,
    ) -> Result<Uuid> {
        let lesson = self.lesson(lesson_id)?.clone();

        if lesson.kind.is_hosted() {
            if let Some(host_id) = lesson.host {
                if host_id != teacher_id {
                    return Err(Error::TeacherMismatch);
                }
            }
        }

        let end = end.unwrap_or(start + lesson.duration());

        if !opts.allow_overlap && self.overlaps(teacher_id, start, end, None) {
            return Err(Error::Overlap);
        }

        let teacher = self.teacher(teacher_id)?;
        if !opts.allow_besides_working_hours && !teacher.fits_working_hours(start, end) {
            return Err(Error::OutsideWorkingHours);
        }

        let entry = TimelineEntry {
            id: Uuid::new_v4(),
            teacher_id,
            lesson_id: lesson.id.clone(),
            kind: lesson.kind,
            start,
            end,
            slots: lesson.slots,
            active: true,
            allow_overlap: opts.allow_overlap,
        };
        let entry_id = entry.id;

        tracing::debug!(
            "Created timeline entry {} for teacher {} ({:?}, {} - {})",
            entry_id,
            teacher_id,
            lesson.kind,
            start,
            end
        );
        self.entries.insert(entry_id, entry);
        Ok(entry_id)
    }

    /// Advisory fitness check for a prospective entry interval
    pub fn check_entry(
        &self,
        teacher_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<EntryCheck> {
        let teacher = self.teacher(teacher_id)?;
        Ok(EntryCheck {
            is_overlapping: self.overlaps(teacher_id, start, end, None),
            is_fitting_hours: teacher.fits_working_hours(start, end),
        })
    }

    /// Does the interval collide with an active entry in this timeline?
    fn overlaps(
        &self,
        teacher_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> bool {
        self.entries
            .values()
            .filter(|e| e.active && e.teacher_id == teacher_id && Some(e.id) != exclude)
            .any(|e| start < e.end && end > e.start)
    }

    /// Attach a class to an entry, consuming one slot
    ///
    /// The class lifecycle engine is the public road to this; it is kept
    /// crate-private so nothing can skip the scheduled-state bookkeeping.
    pub(crate) fn attach_class(&mut self, entry_id: Uuid, class_id: Uuid) -> Result<()> {
        let entry = self.entry(entry_id)?.clone();

        if self.taken_slots(entry_id) >= entry.slots {
            return Err(Error::CapacityExceeded);
        }

        let (class_kind, class_lesson_id) = {
            let class = self.class(class_id)?;
            (class.kind, class.lesson_id.clone())
        };
        if class_kind != entry.kind {
            return Err(Error::LessonTypeMismatch);
        }

        let lesson = self.lesson(&class_lesson_id)?;
        if lesson.kind.is_hosted() {
            if let Some(host_id) = lesson.host {
                if host_id != entry.teacher_id {
                    return Err(Error::TeacherMismatch);
                }
            }
        }

        let class = self
            .classes
            .get_mut(&class_id)
            .ok_or_else(|| Error::NotFound("class", class_id.to_string()))?;
        class.timeline_entry_id = Some(entry_id);

        tracing::debug!("Attached class {} to entry {}", class_id, entry_id);
        Ok(())
    }

    /// Detach a class from its entry and retire the entry if it is done
    pub(crate) fn detach_class(&mut self, class_id: Uuid) -> Result<()> {
        let class = self
            .classes
            .get_mut(&class_id)
            .ok_or_else(|| Error::NotFound("class", class_id.to_string()))?;
        let entry_id = class
            .timeline_entry_id
            .take()
            .ok_or(Error::CannotBeUnscheduled)?;

        tracing::debug!("Detached class {} from entry {}", class_id, entry_id);
        self.maybe_retire_entry(entry_id);
        Ok(())
    }

    /// Delete the entry if nothing occupies it and its kind does not require
    /// a dedicated timeline entry
    ///
    /// This is the only auto-deletion path; it runs at the end of every
    /// detach and observes the post-detach slot count.
    pub fn maybe_retire_entry(&mut self, entry_id: Uuid) {
        let retire = match self.entries.get(&entry_id) {
            Some(entry) => {
                !entry.kind.requires_timeline_entry() && self.taken_slots(entry_id) == 0
            }
            None => false,
        };

        if retire {
            self.entries.remove(&entry_id);
            tracing::info!("Retired empty timeline entry {}", entry_id);
        }
    }

    /// Delete an entry outright, unscheduling every attached class
    ///
    /// The inverse of scheduling, initiated from the timeline side. The
    /// classes survive with their entry reference cleared; the entry is
    /// already gone, so no retirement check re-runs.
    pub fn delete_entry(&mut self, entry_id: Uuid) -> Result<()> {
        self.entries
            .remove(&entry_id)
            .ok_or_else(|| Error::NotFound("timeline entry", entry_id.to_string()))?;

        let mut unscheduled = 0;
        for class in self.classes.values_mut() {
            if class.timeline_entry_id == Some(entry_id) {
                class.timeline_entry_id = None;
                unscheduled += 1;
            }
        }

        tracing::info!(
            "Deleted timeline entry {}, unscheduled {} classes",
            entry_id,
            unscheduled
        );
        Ok(())
    }

    /// Number of slots currently taken, derived from the class table
    pub fn taken_slots(&self, entry_id: Uuid) -> u32 {
        self.classes
            .values()
            .filter(|c| c.timeline_entry_id == Some(entry_id))
            .count() as u32
    }

    /// Does the entry still have room?
    pub fn is_free(&self, entry_id: Uuid) -> Result<bool> {
        let entry = self.entry(entry_id)?;
        Ok(self.taken_slots(entry_id) < entry.slots)
    }

    /// Display title for an entry: the bound lesson's name, or a placeholder
    pub fn entry_title(&self, entry_id: Uuid) -> Result<String> {
        let entry = self.entry(entry_id)?;
        Ok(self
            .catalog
            .lessons
            .get(&entry.lesson_id)
            .map(|l| l.name.clone())
            .unwrap_or_else(|| "Usual lesson".to_string()))
    }

    /// A teacher's visible timeline (inactive entries are scoped out)
    pub fn entries_for_teacher(&self, teacher_id: Uuid) -> Vec<&TimelineEntry> {
        self.entries
            .values()
            .filter(|e| e.active && e.teacher_id == teacher_id)
            .collect()
    }
}
