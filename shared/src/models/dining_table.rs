//! Dining Table Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Table occupancy status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    #[default]
    Libre,
    Ocupada,
}

impl TableStatus {
    /// libre ↔ ocupada
    pub fn toggled(self) -> Self {
        match self {
            Self::Libre => Self::Ocupada,
            Self::Ocupada => Self::Libre,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Libre => "libre",
            Self::Ocupada => "ocupada",
        }
    }
}

/// Dining table entity (桌台)
///
/// 桌台与订单无关联，仅用于后台管理。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiningTable {
    pub id: String,
    pub number: i32,
    #[serde(default = "default_seats")]
    pub seats: i32,
    #[serde(default)]
    pub status: TableStatus,
}

pub fn default_seats() -> i32 {
    4
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DiningTableCreate {
    #[validate(range(min = 1))]
    pub number: i32,
    #[serde(default = "default_seats")]
    #[validate(range(min = 1))]
    pub seats: i32,
    #[serde(default)]
    pub status: TableStatus,
}

/// Update dining table payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct DiningTableUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    pub number: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    pub seats: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TableStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_defaults() {
        let payload: DiningTableCreate = serde_json::from_str(r#"{"number": 7}"#).unwrap();
        assert_eq!(payload.seats, 4);
        assert_eq!(payload.status, TableStatus::Libre);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_zero_seats_rejected() {
        let payload: DiningTableCreate =
            serde_json::from_str(r#"{"number": 2, "seats": 0}"#).unwrap();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn test_status_toggle_and_wire_value() {
        assert_eq!(TableStatus::Libre.toggled(), TableStatus::Ocupada);
        assert_eq!(TableStatus::Ocupada.toggled(), TableStatus::Libre);
        assert_eq!(
            serde_json::to_value(TableStatus::Ocupada).unwrap(),
            serde_json::json!("ocupada")
        );
    }
}
