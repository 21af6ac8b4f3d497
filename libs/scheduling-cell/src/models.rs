use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A free slot annotated with its rank score and the reason it ranked
/// where it did. Computed per request, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    pub time: NaiveDateTime,
    pub time_display: String,
    pub score: f64,
    pub reason: String,
}

/// Named weights for the suggestion score. The score is the weighted sum
/// of three components, each normalized to [0, 1]:
///
/// - `midday`: proximity to 12:00, the busiest acceptable hour for most
///   patients;
/// - `hour_load`: how underbooked the slot's hour is relative to the
///   doctor's busiest hour that day;
/// - `recency`: earlier slots score higher when the requested date is
///   today, neutral otherwise.
///
/// The sum is monotonic in every component; ties resolve to the earlier
/// slot.
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    pub midday: f64,
    pub hour_load: f64,
    pub recency: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            midday: 0.5,
            hour_load: 0.3,
            recency: 0.2,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SuggestAppointmentRequest {
    pub doctor_id: Uuid,
    pub date: String,
}

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("doctor not found")]
    DoctorNotFound,

    #[error("no working hours configured for this doctor")]
    ConfigurationMissing,

    #[error("database error: {0}")]
    Database(String),
}
