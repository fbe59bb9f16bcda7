//! External teacher collaborator: working hours and acceptable lesson kinds.
//!
//! Teachers are owned by another system; this module carries the identity
//! slice the scheduling core consults (working-hours fitness, which lesson
//! kinds a teacher accepts to host) and a loader for the roster feed file
//! that system produces.

use crate::types::LessonKind;
use crate::Result;
use chrono::{DateTime, Datelike, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use uuid::Uuid;

/// One weekly working-hours window
///
/// `weekday` counts from Monday = 0, matching
/// `chrono::Weekday::num_days_from_monday`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkingHours {
    pub weekday: u8,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// The teacher slice consumed by the scheduling core
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Teacher {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub working_hours: Vec<WorkingHours>,
    #[serde(default)]
    pub acceptable_kinds: HashSet<LessonKind>,
}

impl Teacher {
    /// Does the interval lie inside one of the teacher's weekly windows?
    ///
    /// The whole interval must fit a single window on the start's weekday;
    /// an entry running past the window's end does not fit.
    pub fn fits_working_hours(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        if start.date_naive() != end.date_naive() || end <= start {
            return false;
        }

        let weekday = start.weekday().num_days_from_monday() as u8;
        self.working_hours.iter().any(|hours| {
            hours.weekday == weekday && start.time() >= hours.start && end.time() <= hours.end
        })
    }

    /// Is the teacher willing to host this lesson kind?
    pub fn accepts(&self, kind: LessonKind) -> bool {
        self.acceptable_kinds.contains(&kind)
    }
}

/// Load the teacher roster from an external JSON feed file
///
/// Returns an empty roster if the file doesn't exist (the feed hasn't run).
/// An unreadable or malformed file logs a warning and also yields an empty
/// roster so the caller keeps working with whatever it already has.
pub fn load_teacher_roster(path: &Path) -> Result<Vec<Teacher>> {
    if !path.exists() {
        tracing::debug!("No teacher roster found at {:?}", path);
        return Ok(Vec::new());
    }

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::warn!(
                "Failed to read teacher roster at {:?}: {}. Ignoring roster.",
                path,
                e
            );
            return Ok(Vec::new());
        }
    };

    let roster: Vec<Teacher> = match serde_json::from_str(&contents) {
        Ok(roster) => roster,
        Err(e) => {
            tracing::warn!(
                "Failed to parse teacher roster at {:?}: {}. Ignoring roster.",
                path,
                e
            );
            return Ok(Vec::new());
        }
    };

    tracing::info!("Loaded {} teachers from roster {:?}", roster.len(), path);
    Ok(roster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn monday_teacher() -> Teacher {
        Teacher {
            id: Uuid::new_v4(),
            name: "Fedor".into(),
            working_hours: vec![WorkingHours {
                weekday: 0,
                start: NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
                end: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
            }],
            acceptable_kinds: HashSet::from([LessonKind::MasterClass]),
        }
    }

    // 2032-05-03 is a Monday
    fn monday(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2032, 5, 3, h, m, 0).unwrap()
    }

    #[test]
    fn test_interval_inside_window_fits() {
        let teacher = monday_teacher();
        assert!(teacher.fits_working_hours(monday(14, 0), monday(14, 30)));
    }

    #[test]
    fn test_interval_running_late_does_not_fit() {
        let teacher = monday_teacher();
        // Ends half an hour after the window closes
        assert!(!teacher.fits_working_hours(monday(14, 0), monday(15, 30)));
    }

    #[test]
    fn test_wrong_weekday_does_not_fit() {
        let teacher = monday_teacher();
        let tuesday_start = Utc.with_ymd_and_hms(2032, 5, 4, 14, 0, 0).unwrap();
        let tuesday_end = Utc.with_ymd_and_hms(2032, 5, 4, 14, 30, 0).unwrap();
        assert!(!teacher.fits_working_hours(tuesday_start, tuesday_end));
    }

    #[test]
    fn test_inverted_interval_does_not_fit() {
        let teacher = monday_teacher();
        assert!(!teacher.fits_working_hours(monday(14, 30), monday(14, 0)));
    }

    #[test]
    fn test_accepts_kind() {
        let teacher = monday_teacher();
        assert!(teacher.accepts(LessonKind::MasterClass));
        assert!(!teacher.accepts(LessonKind::HappyHour));
    }

    #[test]
    fn test_load_roster() {
        let temp_dir = tempfile::tempdir().unwrap();
        let roster_path = temp_dir.path().join("teachers.json");

        let roster = vec![monday_teacher()];
        std::fs::write(
            &roster_path,
            serde_json::to_string(&roster).unwrap(),
        )
        .unwrap();

        let loaded = load_teacher_roster(&roster_path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "Fedor");
        assert_eq!(loaded[0].working_hours.len(), 1);
    }

    #[test]
    fn test_load_nonexistent_returns_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let roster_path = temp_dir.path().join("nonexistent.json");

        let loaded = load_teacher_roster(&roster_path).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_malformed_roster_returns_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let roster_path = temp_dir.path().join("bad.json");

        std::fs::write(&roster_path, "{ invalid json }").unwrap();

        let loaded = load_teacher_roster(&roster_path).unwrap();
        assert!(loaded.is_empty());
    }
}
