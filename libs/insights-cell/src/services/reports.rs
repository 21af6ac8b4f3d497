use std::collections::HashMap;

use chrono::Datelike;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use appointment_cell::models::{Appointment, AppointmentStatus};
use shared_config::AppConfig;
use shared_database::PostgrestClient;

use crate::models::{InsightsError, ReportSummary};

/// Aggregates the appointment book into the summary report. Pure function
/// of the rows; the weekday buckets use three-letter labels.
pub fn summarize(
    appointments: &[Appointment],
    doctor_names: &HashMap<Uuid, String>,
) -> ReportSummary {
    let mut summary = ReportSummary {
        total: appointments.len(),
        completed: 0,
        cancelled: 0,
        by_doctor: Default::default(),
        by_day: Default::default(),
    };

    for appointment in appointments {
        match appointment.status {
            AppointmentStatus::Completed => summary.completed += 1,
            AppointmentStatus::Cancelled => summary.cancelled += 1,
            AppointmentStatus::Scheduled => {}
        }

        let doctor = doctor_names
            .get(&appointment.doctor_id)
            .cloned()
            .unwrap_or_else(|| "Unknown".to_string());
        *summary.by_doctor.entry(doctor).or_insert(0) += 1;

        let day = appointment.start_time.weekday().to_string();
        *summary.by_day.entry(day).or_insert(0) += 1;
    }

    summary
}

pub struct ReportService {
    db: PostgrestClient,
}

impl ReportService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: PostgrestClient::new(config),
        }
    }

    pub async fn appointment_report(&self) -> Result<ReportSummary, InsightsError> {
        debug!("Building appointment report");

        let rows: Vec<Value> = self
            .db
            .get("/appointments?order=start_time.asc")
            .await
            .map_err(|e| InsightsError::Database(e.to_string()))?;

        let appointments = rows
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Appointment>, _>>()
            .map_err(|e| InsightsError::Database(e.to_string()))?;

        let doctors: Vec<Value> = self
            .db
            .get("/doctors?select=id,name")
            .await
            .map_err(|e| InsightsError::Database(e.to_string()))?;

        let doctor_names = doctors
            .iter()
            .filter_map(|d| {
                let id = d.get("id").and_then(|v| v.as_str())?;
                let id = Uuid::parse_str(id).ok()?;
                let name = d.get("name").and_then(|v| v.as_str())?;
                Some((id, name.to_string()))
            })
            .collect();

        Ok(summarize(&appointments, &doctor_names))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn appointment(
        doctor_id: Uuid,
        date: NaiveDate,
        status: AppointmentStatus,
    ) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            doctor_id,
            start_time: date.and_hms_opt(10, 0, 0).unwrap().and_utc(),
            duration_minutes: 30,
            status,
            notes: None,
            created_at: None,
        }
    }

    #[test]
    fn empty_book_produces_zeroed_report() {
        let summary = summarize(&[], &HashMap::new());

        assert_eq!(summary.total, 0);
        assert_eq!(summary.completed, 0);
        assert_eq!(summary.cancelled, 0);
        assert!(summary.by_doctor.is_empty());
        assert!(summary.by_day.is_empty());
    }

    #[test]
    fn counts_split_by_status() {
        let doctor = Uuid::new_v4();
        let monday = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let appointments = vec![
            appointment(doctor, monday, AppointmentStatus::Scheduled),
            appointment(doctor, monday, AppointmentStatus::Completed),
            appointment(doctor, monday, AppointmentStatus::Cancelled),
        ];

        let summary = summarize(&appointments, &HashMap::new());

        assert_eq!(summary.total, 3);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.cancelled, 1);
    }

    #[test]
    fn buckets_by_doctor_name_with_unknown_fallback() {
        let known = Uuid::new_v4();
        let unknown = Uuid::new_v4();
        let monday = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let names = HashMap::from([(known, "Dr. Rao".to_string())]);

        let appointments = vec![
            appointment(known, monday, AppointmentStatus::Scheduled),
            appointment(known, monday, AppointmentStatus::Scheduled),
            appointment(unknown, monday, AppointmentStatus::Scheduled),
        ];

        let summary = summarize(&appointments, &names);

        assert_eq!(summary.by_doctor.get("Dr. Rao"), Some(&2));
        assert_eq!(summary.by_doctor.get("Unknown"), Some(&1));
    }

    #[test]
    fn buckets_by_weekday() {
        let doctor = Uuid::new_v4();
        let monday = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2025, 3, 11).unwrap();

        let appointments = vec![
            appointment(doctor, monday, AppointmentStatus::Scheduled),
            appointment(doctor, monday, AppointmentStatus::Scheduled),
            appointment(doctor, tuesday, AppointmentStatus::Scheduled),
        ];

        let summary = summarize(&appointments, &HashMap::new());

        assert_eq!(summary.by_day.get("Mon"), Some(&2));
        assert_eq!(summary.by_day.get("Tue"), Some(&1));
    }
}
