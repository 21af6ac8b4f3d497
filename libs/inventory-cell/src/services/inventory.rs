use chrono::{Duration, NaiveDate};
use serde_json::{json, Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::PostgrestClient;

use crate::models::{
    AlertPriority, CreateItemRequest, InventoryError, InventoryItem, StockAlert,
    UpdateItemRequest,
};

/// Below this quantity an alert escalates to critical regardless of the
/// item's own threshold.
pub const CRITICAL_THRESHOLD: i64 = 5;

const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

/// Alerts for every item at or below its threshold, critical first.
/// Pure function of the inventory snapshot.
pub fn stock_alerts(items: &[InventoryItem]) -> Vec<StockAlert> {
    let mut alerts: Vec<StockAlert> = items
        .iter()
        .filter(|item| item.quantity <= item.low_stock_threshold)
        .map(|item| {
            let (priority, message) = if item.quantity <= CRITICAL_THRESHOLD {
                (
                    AlertPriority::Critical,
                    format!(
                        "{} is critically low: {} {} left, reorder immediately",
                        item.name, item.quantity, item.unit
                    ),
                )
            } else {
                (
                    AlertPriority::Warning,
                    format!(
                        "{} is below its threshold of {}: {} {} left",
                        item.name, item.low_stock_threshold, item.quantity, item.unit
                    ),
                )
            };

            StockAlert {
                item_id: item.id,
                name: item.name.clone(),
                category: item.category.clone(),
                quantity: item.quantity,
                unit: item.unit.clone(),
                low_stock_threshold: item.low_stock_threshold,
                priority,
                message,
            }
        })
        .collect();

    alerts.sort_by(|a, b| a.priority.cmp(&b.priority).then(a.quantity.cmp(&b.quantity)));
    alerts
}

/// Projects the date stock runs out from a flat daily usage rate. Returns
/// `None` when the rate is not positive or the stock is already gone.
pub fn predict_restock_date(
    quantity: i64,
    daily_usage: f64,
    from: NaiveDate,
) -> Option<NaiveDate> {
    if daily_usage <= 0.0 || quantity <= 0 {
        return None;
    }

    let days_left = (quantity as f64 / daily_usage).floor() as i64;
    from.checked_add_signed(Duration::days(days_left))
}

pub struct InventoryService {
    db: PostgrestClient,
}

impl InventoryService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: PostgrestClient::new(config),
        }
    }

    pub async fn list_items(&self) -> Result<Vec<InventoryItem>, InventoryError> {
        debug!("Listing inventory items");

        let rows: Vec<Value> = self
            .db
            .get("/inventory?order=name.asc")
            .await
            .map_err(|e| InventoryError::Database(e.to_string()))?;

        rows.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<InventoryItem>, _>>()
            .map_err(|e| InventoryError::Database(e.to_string()))
    }

    pub async fn get_item(&self, item_id: Uuid) -> Result<InventoryItem, InventoryError> {
        let path = format!("/inventory?id=eq.{}", item_id);
        let rows: Vec<Value> = self
            .db
            .get(&path)
            .await
            .map_err(|e| InventoryError::Database(e.to_string()))?;

        let row = rows.into_iter().next().ok_or(InventoryError::NotFound)?;
        serde_json::from_value(row).map_err(|e| InventoryError::Database(e.to_string()))
    }

    pub async fn create_item(
        &self,
        request: CreateItemRequest,
    ) -> Result<InventoryItem, InventoryError> {
        if request.name.trim().is_empty() {
            return Err(InventoryError::Validation("name is required".to_string()));
        }
        if request.quantity < 0 {
            return Err(InventoryError::Validation(
                "quantity must not be negative".to_string(),
            ));
        }

        let body = json!({
            "name": request.name.trim(),
            "category": request.category,
            "quantity": request.quantity,
            "unit": request.unit,
            "low_stock_threshold": request
                .low_stock_threshold
                .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD),
        });

        let rows: Vec<Value> = self
            .db
            .insert("/inventory", body)
            .await
            .map_err(|e| InventoryError::Database(e.to_string()))?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| InventoryError::Database("insert returned no row".to_string()))?;

        let item: InventoryItem =
            serde_json::from_value(row).map_err(|e| InventoryError::Database(e.to_string()))?;
        info!("Created inventory item {} ({})", item.name, item.id);

        Ok(item)
    }

    pub async fn update_item(
        &self,
        item_id: Uuid,
        request: UpdateItemRequest,
    ) -> Result<InventoryItem, InventoryError> {
        self.get_item(item_id).await?;

        if let Some(quantity) = request.quantity {
            if quantity < 0 {
                return Err(InventoryError::Validation(
                    "quantity must not be negative".to_string(),
                ));
            }
        }

        let mut body = Map::new();
        if let Some(name) = request.name {
            if name.trim().is_empty() {
                return Err(InventoryError::Validation("name is required".to_string()));
            }
            body.insert("name".to_string(), json!(name.trim()));
        }
        if let Some(category) = request.category {
            body.insert("category".to_string(), json!(category));
        }
        if let Some(quantity) = request.quantity {
            body.insert("quantity".to_string(), json!(quantity));
        }
        if let Some(unit) = request.unit {
            body.insert("unit".to_string(), json!(unit));
        }
        if let Some(threshold) = request.low_stock_threshold {
            body.insert("low_stock_threshold".to_string(), json!(threshold));
        }
        if let Some(restocked) = request.last_restocked {
            body.insert("last_restocked".to_string(), json!(restocked));
        }

        if body.is_empty() {
            return self.get_item(item_id).await;
        }

        let path = format!("/inventory?id=eq.{}", item_id);
        let rows: Vec<Value> = self
            .db
            .update(&path, Value::Object(body))
            .await
            .map_err(|e| InventoryError::Database(e.to_string()))?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| InventoryError::Database("update returned no row".to_string()))?;

        serde_json::from_value(row).map_err(|e| InventoryError::Database(e.to_string()))
    }

    pub async fn delete_item(&self, item_id: Uuid) -> Result<(), InventoryError> {
        self.get_item(item_id).await?;

        let path = format!("/inventory?id=eq.{}", item_id);
        self.db
            .delete(&path)
            .await
            .map_err(|e| InventoryError::Database(e.to_string()))?;

        info!("Deleted inventory item {}", item_id);
        Ok(())
    }

    pub async fn low_stock_alerts(&self) -> Result<Vec<StockAlert>, InventoryError> {
        let items = self.list_items().await?;
        Ok(stock_alerts(&items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, quantity: i64, threshold: i64) -> InventoryItem {
        InventoryItem {
            id: Uuid::new_v4(),
            name: name.to_string(),
            category: "consumables".to_string(),
            quantity,
            unit: "boxes".to_string(),
            low_stock_threshold: threshold,
            last_restocked: None,
        }
    }

    #[test]
    fn well_stocked_items_raise_no_alerts() {
        let items = vec![item("Gloves", 50, 10), item("Masks", 11, 10)];
        assert!(stock_alerts(&items).is_empty());
    }

    #[test]
    fn threshold_breach_is_a_warning() {
        let items = vec![item("Gloves", 10, 10)];
        let alerts = stock_alerts(&items);

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].priority, AlertPriority::Warning);
        assert!(alerts[0].message.contains("Gloves"));
    }

    #[test]
    fn critical_quantity_escalates() {
        let items = vec![item("Syringes", 5, 20)];
        let alerts = stock_alerts(&items);

        assert_eq!(alerts[0].priority, AlertPriority::Critical);
        assert!(alerts[0].message.contains("reorder immediately"));
    }

    #[test]
    fn critical_alerts_come_first() {
        let items = vec![
            item("Gloves", 8, 10),
            item("Syringes", 2, 10),
            item("Masks", 4, 10),
        ];
        let alerts = stock_alerts(&items);

        assert_eq!(alerts.len(), 3);
        assert_eq!(alerts[0].name, "Syringes");
        assert_eq!(alerts[1].name, "Masks");
        assert_eq!(alerts[2].name, "Gloves");
    }

    #[test]
    fn restock_projection_uses_daily_rate() {
        let from = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();

        assert_eq!(
            predict_restock_date(20, 2.0, from),
            NaiveDate::from_ymd_opt(2025, 3, 20)
        );
        assert_eq!(predict_restock_date(20, 0.0, from), None);
        assert_eq!(predict_restock_date(0, 2.0, from), None);
    }
}
