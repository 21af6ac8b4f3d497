use std::collections::HashMap;

use chrono::{Duration, NaiveDate, Timelike};
use serde_json::Value;
use tracing::debug;

use appointment_cell::models::Appointment;
use shared_config::AppConfig;
use shared_database::PostgrestClient;

use crate::models::{FlowPrediction, HourStatus, InsightsError, PeakHour};

/// Flat no-show rate applied to the day's bookings.
pub const NO_SHOW_RATE: f64 = 0.10;

/// An hour becomes a peak at this many bookings, and busy at `BUSY_AT`.
const PEAK_AT: usize = 3;
const BUSY_AT: usize = 5;

/// Clinic hours surveyed for peaks.
const FIRST_HOUR: u32 = 9;
const LAST_HOUR: u32 = 17;

/// Hourly load profile and no-show projection for one day's bookings.
/// Pure function of the appointment snapshot.
pub fn predict_flow(date: NaiveDate, appointments: &[Appointment]) -> FlowPrediction {
    let mut hourly_counts: HashMap<u32, usize> = HashMap::new();
    for appointment in appointments {
        *hourly_counts
            .entry(appointment.start_time.time().hour())
            .or_insert(0) += 1;
    }

    let predicted_peak_hours: Vec<PeakHour> = (FIRST_HOUR..LAST_HOUR)
        .filter_map(|hour| {
            let count = hourly_counts.get(&hour).copied().unwrap_or(0);
            if count >= PEAK_AT {
                Some(PeakHour {
                    hour,
                    predicted_count: count,
                    status: if count >= BUSY_AT {
                        HourStatus::Busy
                    } else {
                        HourStatus::Moderate
                    },
                })
            } else {
                None
            }
        })
        .collect();

    let total_appointments = appointments.len();
    let predicted_no_shows = (total_appointments as f64 * NO_SHOW_RATE) as usize;
    let busy_periods = predicted_peak_hours
        .iter()
        .filter(|h| h.status == HourStatus::Busy)
        .cloned()
        .collect();

    FlowPrediction {
        date,
        total_appointments,
        predicted_peak_hours,
        predicted_no_shows,
        expected_arrivals: total_appointments - predicted_no_shows,
        busy_periods,
    }
}

pub struct FlowService {
    db: PostgrestClient,
}

impl FlowService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: PostgrestClient::new(config),
        }
    }

    pub async fn predict_for_date(&self, date: NaiveDate) -> Result<FlowPrediction, InsightsError> {
        debug!("Predicting patient flow for {}", date);

        let day_start = date.and_hms_opt(0, 0, 0).unwrap().and_utc();
        let day_end = day_start + Duration::days(1);
        let path = format!(
            "/appointments?start_time=gte.{}&start_time=lt.{}&status=neq.cancelled",
            day_start.to_rfc3339(),
            day_end.to_rfc3339(),
        );

        let rows: Vec<Value> = self
            .db
            .get(&path)
            .await
            .map_err(|e| InsightsError::Database(e.to_string()))?;

        let appointments = rows
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Appointment>, _>>()
            .map_err(|e| InsightsError::Database(e.to_string()))?;

        Ok(predict_flow(date, &appointments))
    }
}
