use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::PostgrestClient;

use crate::models::{DoctorError, WorkingHours};

/// Read-only lookup of working-hours templates. Whether an empty result
/// means "not configured" or "not working that day" is decided by the
/// caller, which sees the full row set.
pub struct ScheduleConfigService {
    db: PostgrestClient,
}

impl ScheduleConfigService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: PostgrestClient::new(config),
        }
    }

    pub async fn templates_for(&self, doctor_id: Uuid) -> Result<Vec<WorkingHours>, DoctorError> {
        debug!("Fetching working hours for doctor {}", doctor_id);

        let path = format!(
            "/working_hours?doctor_id=eq.{}&order=day_of_week.asc.nullsfirst,start_time.asc",
            doctor_id
        );
        let rows: Vec<Value> = self
            .db
            .get(&path)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        rows.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<WorkingHours>, _>>()
            .map_err(|e| DoctorError::Database(e.to_string()))
    }
}
