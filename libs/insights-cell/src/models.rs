use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Aggregated appointment report: totals plus per-doctor and per-weekday
/// breakdowns, computed from the live data.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub by_doctor: BTreeMap<String, usize>,
    pub by_day: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HourStatus {
    Busy,
    Moderate,
}

#[derive(Debug, Clone, Serialize)]
pub struct PeakHour {
    pub hour: u32,
    pub predicted_count: usize,
    pub status: HourStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlowPrediction {
    pub date: NaiveDate,
    pub total_appointments: usize,
    pub predicted_peak_hours: Vec<PeakHour>,
    pub predicted_no_shows: usize,
    pub expected_arrivals: usize,
    pub busy_periods: Vec<PeakHour>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryIntent {
    TodayAppointments,
    DoctorAppointments,
    PatientSearch,
    ScheduleAppointment,
    DoctorSchedule,
    Unknown,
}

/// The structured reading of a free-text query: an intent plus whatever
/// entities the patterns captured.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedQuery {
    pub intent: QueryIntent,
    pub doctor_name: Option<String>,
    pub patient_name: Option<String>,
    pub date: Option<NaiveDate>,
    pub original_query: String,
}

#[derive(Debug, Deserialize)]
pub struct PredictFlowRequest {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NlpQueryRequest {
    pub query: String,
}

#[derive(Error, Debug)]
pub enum InsightsError {
    #[error("database error: {0}")]
    Database(String),
}
