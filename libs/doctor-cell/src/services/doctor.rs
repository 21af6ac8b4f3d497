use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::PostgrestClient;

use crate::models::{Doctor, DoctorError};

pub struct DoctorService {
    db: PostgrestClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: PostgrestClient::new(config),
        }
    }

    pub async fn list_doctors(&self) -> Result<Vec<Doctor>, DoctorError> {
        debug!("Listing doctors");

        let rows: Vec<Value> = self
            .db
            .get("/doctors?order=name.asc")
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        rows.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Doctor>, _>>()
            .map_err(|e| DoctorError::Database(e.to_string()))
    }

    pub async fn get_doctor(&self, doctor_id: Uuid) -> Result<Doctor, DoctorError> {
        debug!("Fetching doctor {}", doctor_id);

        let path = format!("/doctors?id=eq.{}", doctor_id);
        let rows: Vec<Value> = self
            .db
            .get(&path)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        let row = rows.into_iter().next().ok_or(DoctorError::NotFound)?;
        serde_json::from_value(row).map_err(|e| DoctorError::Database(e.to_string()))
    }
}
