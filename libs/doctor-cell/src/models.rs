use chrono::{DateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub specialization: String,
    pub position: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// The configured start/end/granularity defining all bookable starts for
/// one day. Immutable from the scheduling side; owned by the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHoursTemplate {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub slot_minutes: u32,
}

/// A `working_hours` row: a per-doctor template, optionally pinned to a
/// single weekday (0 = Sunday .. 6 = Saturday). A row with no
/// `day_of_week` applies to every day the doctor works.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkingHours {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub day_of_week: Option<i16>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub slot_minutes: u32,
}

impl WorkingHours {
    pub fn template(&self) -> WorkingHoursTemplate {
        WorkingHoursTemplate {
            start_time: self.start_time,
            end_time: self.end_time,
            slot_minutes: self.slot_minutes,
        }
    }

    pub fn applies_on(&self, weekday: Weekday) -> bool {
        match self.day_of_week {
            None => true,
            Some(day) => day == weekday_index(weekday),
        }
    }
}

/// 0 = Sunday .. 6 = Saturday, matching the stored `day_of_week` column.
pub fn weekday_index(weekday: Weekday) -> i16 {
    match weekday {
        Weekday::Sun => 0,
        Weekday::Mon => 1,
        Weekday::Tue => 2,
        Weekday::Wed => 3,
        Weekday::Thu => 4,
        Weekday::Fri => 5,
        Weekday::Sat => 6,
    }
}

#[derive(Error, Debug)]
pub enum DoctorError {
    #[error("doctor not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn hours(day_of_week: Option<i16>) -> WorkingHours {
        WorkingHours {
            id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            day_of_week,
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            slot_minutes: 30,
        }
    }

    #[test]
    fn unpinned_row_applies_every_day() {
        let row = hours(None);
        assert!(row.applies_on(Weekday::Mon));
        assert!(row.applies_on(Weekday::Sun));
    }

    #[test]
    fn pinned_row_applies_only_on_its_day() {
        let row = hours(Some(1));
        assert!(row.applies_on(Weekday::Mon));
        assert!(!row.applies_on(Weekday::Tue));
    }
}
