//! Request and response types for the plant-log API

use serde::{Deserialize, Serialize};

use crate::plants::{PlantRecord, PlantStatus};

/// Response body for `GET /plants`.
#[derive(Debug, Serialize, Deserialize)]
pub struct PlantsResponse {
    pub plants: Vec<PlantStatus>,
}

/// Query parameters accepted by `GET /water`.
#[derive(Debug, Default, Deserialize)]
pub struct WaterParams {
    #[serde(rename = "plantName")]
    pub plant_name: Option<String>,
}

/// JSON body accepted by `POST /water`.
#[derive(Debug, Serialize, Deserialize)]
pub struct WaterRequest {
    #[serde(rename = "plantName")]
    pub plant_name: Option<String>,
}

/// Success body for `POST /water`.
#[derive(Debug, Serialize, Deserialize)]
pub struct WaterResponse {
    pub success: bool,
    pub plant: PlantRecord,
}

/// JSON error body shared by every non-text failure path.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self::new("Internal server error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_water_request_field_name() {
        let request: WaterRequest = serde_json::from_str(r#"{"plantName":"Basil"}"#).unwrap();
        assert_eq!(request.plant_name.as_deref(), Some("Basil"));

        let request: WaterRequest = serde_json::from_str("{}").unwrap();
        assert!(request.plant_name.is_none());
    }

    #[test]
    fn test_error_response_bodies() {
        let json = serde_json::to_string(&ErrorResponse::new("Plant not found")).unwrap();
        assert_eq!(json, r#"{"error":"Plant not found"}"#);

        let json = serde_json::to_string(&ErrorResponse::internal()).unwrap();
        assert_eq!(json, r#"{"error":"Internal server error"}"#);
    }

    #[test]
    fn test_water_response_serialization() {
        let response = WaterResponse {
            success: true,
            plant: PlantRecord {
                id: 3,
                plant_name: "Monstera".to_string(),
                watered_at: Utc::now(),
                watering_interval: 10,
            },
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"success\":true"));
        assert!(json.contains("Monstera"));
    }
}
