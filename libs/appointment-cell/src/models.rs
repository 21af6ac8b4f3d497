use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub const DEFAULT_APPOINTMENT_MINUTES: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: i64,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Appointment {
    pub fn end_time(&self) -> DateTime<Utc> {
        self.start_time + Duration::minutes(self.duration_minutes)
    }

    /// True when `[start, end)` intersects this appointment's
    /// `[start_time, start_time + duration)` interval.
    pub fn overlaps_interval(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.end_time() && end > self.start_time
    }
}

/// A listing row with patient and doctor names resolved. Unknown
/// references render as "Unknown" rather than failing the whole list.
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentSummary {
    pub id: Uuid,
    pub patient: String,
    pub doctor: String,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: i64,
    pub status: AppointmentStatus,
}

#[derive(Debug, Deserialize)]
pub struct BookAppointmentRequest {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Error, Debug)]
pub enum AppointmentError {
    #[error("appointment not found")]
    NotFound,

    #[error("appointment conflicts with an existing booking")]
    Conflict,

    #[error("validation error: {0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn appointment(hour: u32, minute: u32, duration_minutes: i64) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            start_time: Utc.with_ymd_and_hms(2025, 3, 10, hour, minute, 0).unwrap(),
            duration_minutes,
            status: AppointmentStatus::Scheduled,
            notes: None,
            created_at: None,
        }
    }

    #[test]
    fn overlap_detects_intersecting_intervals() {
        let existing = appointment(10, 0, 30);

        let start = Utc.with_ymd_and_hms(2025, 3, 10, 10, 15, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 3, 10, 10, 45, 0).unwrap();
        assert!(existing.overlaps_interval(start, end));
    }

    #[test]
    fn overlap_ignores_touching_intervals() {
        let existing = appointment(10, 0, 30);

        // Back-to-back bookings share an endpoint but do not overlap.
        let start = Utc.with_ymd_and_hms(2025, 3, 10, 10, 30, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 3, 10, 11, 0, 0).unwrap();
        assert!(!existing.overlaps_interval(start, end));

        let start = Utc.with_ymd_and_hms(2025, 3, 10, 9, 30, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 3, 10, 10, 0, 0).unwrap();
        assert!(!existing.overlaps_interval(start, end));
    }

    #[test]
    fn overlap_detects_containment() {
        let existing = appointment(10, 0, 60);

        let start = Utc.with_ymd_and_hms(2025, 3, 10, 10, 15, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 3, 10, 10, 30, 0).unwrap();
        assert!(existing.overlaps_interval(start, end));
    }
}
