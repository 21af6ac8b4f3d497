use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub dob: Option<NaiveDate>,
    pub contact: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePatientRequest {
    pub name: String,
    pub dob: Option<NaiveDate>,
    pub contact: Option<String>,
}

#[derive(Error, Debug)]
pub enum PatientError {
    #[error("patient not found")]
    NotFound,

    #[error("validation error: {0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(String),
}
