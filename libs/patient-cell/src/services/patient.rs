use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::PostgrestClient;

use crate::models::{CreatePatientRequest, Patient, PatientError};

pub struct PatientService {
    db: PostgrestClient,
}

impl PatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: PostgrestClient::new(config),
        }
    }

    pub async fn list_patients(&self) -> Result<Vec<Patient>, PatientError> {
        debug!("Listing patients");

        let rows: Vec<Value> = self
            .db
            .get("/patients?order=created_at.desc")
            .await
            .map_err(|e| PatientError::Database(e.to_string()))?;

        rows.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Patient>, _>>()
            .map_err(|e| PatientError::Database(e.to_string()))
    }

    pub async fn get_patient(&self, patient_id: Uuid) -> Result<Patient, PatientError> {
        let path = format!("/patients?id=eq.{}", patient_id);
        let rows: Vec<Value> = self
            .db
            .get(&path)
            .await
            .map_err(|e| PatientError::Database(e.to_string()))?;

        let row = rows.into_iter().next().ok_or(PatientError::NotFound)?;
        serde_json::from_value(row).map_err(|e| PatientError::Database(e.to_string()))
    }

    pub async fn create_patient(
        &self,
        request: CreatePatientRequest,
    ) -> Result<Patient, PatientError> {
        if request.name.trim().is_empty() {
            return Err(PatientError::Validation("name is required".to_string()));
        }

        let body = json!({
            "name": request.name.trim(),
            "dob": request.dob,
            "contact": request.contact,
        });

        let rows: Vec<Value> = self
            .db
            .insert("/patients", body)
            .await
            .map_err(|e| PatientError::Database(e.to_string()))?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| PatientError::Database("insert returned no row".to_string()))?;

        let patient: Patient =
            serde_json::from_value(row).map_err(|e| PatientError::Database(e.to_string()))?;
        info!("Created patient {}", patient.id);

        Ok(patient)
    }

    /// Removes the patient and every appointment that references them,
    /// matching the original cascade behavior.
    pub async fn delete_patient(&self, patient_id: Uuid) -> Result<(), PatientError> {
        self.get_patient(patient_id).await?;

        let appointments_path = format!("/appointments?patient_id=eq.{}", patient_id);
        self.db
            .delete(&appointments_path)
            .await
            .map_err(|e| PatientError::Database(e.to_string()))?;

        let patient_path = format!("/patients?id=eq.{}", patient_id);
        self.db
            .delete(&patient_path)
            .await
            .map_err(|e| PatientError::Database(e.to_string()))?;

        info!("Deleted patient {} and their appointments", patient_id);
        Ok(())
    }
}
