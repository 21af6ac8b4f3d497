use std::collections::HashMap;

use chrono::{Duration, NaiveDate, Utc};
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::PostgrestClient;

use crate::models::{
    Appointment, AppointmentError, AppointmentSummary, BookAppointmentRequest,
    DEFAULT_APPOINTMENT_MINUTES,
};

pub struct BookingService {
    db: PostgrestClient,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: PostgrestClient::new(config),
        }
    }

    /// All appointments, newest first, with names resolved for display.
    pub async fn list_appointments(&self) -> Result<Vec<AppointmentSummary>, AppointmentError> {
        debug!("Listing appointments");

        let appointments = self
            .fetch_appointments("/appointments?order=created_at.desc")
            .await?;

        let patient_names = self.fetch_names("/patients?select=id,name").await?;
        let doctor_names = self.fetch_names("/doctors?select=id,name").await?;

        let summaries = appointments
            .into_iter()
            .map(|a| AppointmentSummary {
                id: a.id,
                patient: patient_names
                    .get(&a.patient_id)
                    .cloned()
                    .unwrap_or_else(|| "Unknown".to_string()),
                doctor: doctor_names
                    .get(&a.doctor_id)
                    .cloned()
                    .unwrap_or_else(|| "Unknown".to_string()),
                start_time: a.start_time,
                duration_minutes: a.duration_minutes,
                status: a.status,
            })
            .collect();

        Ok(summaries)
    }

    /// Non-cancelled appointments for one doctor on one calendar day,
    /// ascending. The read-only snapshot the availability engine consumes.
    pub async fn appointments_for_day(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let day_start = date.and_hms_opt(0, 0, 0).unwrap().and_utc();
        let day_end = day_start + Duration::days(1);

        let path = format!(
            "/appointments?doctor_id=eq.{}&start_time=gte.{}&start_time=lt.{}&status=neq.cancelled&order=start_time.asc",
            doctor_id,
            day_start.to_rfc3339(),
            day_end.to_rfc3339(),
        );

        self.fetch_appointments(&path).await
    }

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Appointment, AppointmentError> {
        let path = format!("/appointments?id=eq.{}", appointment_id);
        let rows = self.fetch_appointments(&path).await?;

        rows.into_iter().next().ok_or(AppointmentError::NotFound)
    }

    /// Books an appointment, rejecting any overlap with an existing
    /// booking for the same doctor. This commit-time check is the
    /// enforcement point for the no-overlap invariant; the availability
    /// engine itself stays read-only.
    pub async fn book_appointment(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let duration_minutes = request
            .duration_minutes
            .unwrap_or(DEFAULT_APPOINTMENT_MINUTES);
        if duration_minutes <= 0 {
            return Err(AppointmentError::Validation(
                "duration_minutes must be positive".to_string(),
            ));
        }

        let end_time = request.start_time + Duration::minutes(duration_minutes);
        let same_day = self
            .appointments_for_day(request.doctor_id, request.start_time.date_naive())
            .await?;

        if same_day
            .iter()
            .any(|a| a.overlaps_interval(request.start_time, end_time))
        {
            warn!(
                "Booking conflict for doctor {} at {}",
                request.doctor_id, request.start_time
            );
            return Err(AppointmentError::Conflict);
        }

        let body = json!({
            "patient_id": request.patient_id,
            "doctor_id": request.doctor_id,
            "start_time": request.start_time.to_rfc3339(),
            "duration_minutes": duration_minutes,
            "status": "scheduled",
            "notes": request.notes,
            "created_at": Utc::now().to_rfc3339(),
        });

        let rows: Vec<Value> = self
            .db
            .insert("/appointments", body)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| AppointmentError::Database("insert returned no row".to_string()))?;

        let appointment: Appointment =
            serde_json::from_value(row).map_err(|e| AppointmentError::Database(e.to_string()))?;
        info!(
            "Booked appointment {} for doctor {} at {}",
            appointment.id, appointment.doctor_id, appointment.start_time
        );

        Ok(appointment)
    }

    pub async fn cancel_appointment(&self, appointment_id: Uuid) -> Result<(), AppointmentError> {
        self.get_appointment(appointment_id).await?;

        let path = format!("/appointments?id=eq.{}", appointment_id);
        self.db
            .delete(&path)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        info!("Cancelled appointment {}", appointment_id);
        Ok(())
    }

    async fn fetch_appointments(&self, path: &str) -> Result<Vec<Appointment>, AppointmentError> {
        let rows: Vec<Value> = self
            .db
            .get(path)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        rows.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Appointment>, _>>()
            .map_err(|e| AppointmentError::Database(e.to_string()))
    }

    async fn fetch_names(&self, path: &str) -> Result<HashMap<Uuid, String>, AppointmentError> {
        let rows: Vec<Value> = self
            .db
            .get(path)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        let mut names = HashMap::new();
        for row in rows {
            if let (Some(id), Some(name)) = (
                row.get("id").and_then(|v| v.as_str()),
                row.get("name").and_then(|v| v.as_str()),
            ) {
                if let Ok(id) = Uuid::parse_str(id) {
                    names.insert(id, name.to_string());
                }
            }
        }

        Ok(names)
    }
}
