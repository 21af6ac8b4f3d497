use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub quantity: i64,
    pub unit: String,
    pub low_stock_threshold: i64,
    pub last_restocked: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    pub category: String,
    pub quantity: i64,
    pub unit: String,
    pub low_stock_threshold: Option<i64>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<i64>,
    pub unit: Option<String>,
    pub low_stock_threshold: Option<i64>,
    pub last_restocked: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertPriority {
    Critical,
    Warning,
}

#[derive(Debug, Clone, Serialize)]
pub struct StockAlert {
    pub item_id: Uuid,
    pub name: String,
    pub category: String,
    pub quantity: i64,
    pub unit: String,
    pub low_stock_threshold: i64,
    pub priority: AlertPriority,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("inventory item not found")]
    NotFound,
    #[error("validation error: {0}")]
    Validation(String),
    #[error("database error: {0}")]
    Database(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn critical_sorts_before_warning() {
        assert!(AlertPriority::Critical < AlertPriority::Warning);
    }

    #[test]
    fn priorities_serialize_lowercase() {
        assert_eq!(
            serde_json::to_string(&AlertPriority::Critical).unwrap(),
            "\"critical\""
        );
        assert_eq!(
            serde_json::to_string(&AlertPriority::Warning).unwrap(),
            "\"warning\""
        );
    }
}
