use serde::{Deserialize, Serialize};

use fieldops_core::types::{many2one_opt, string_or_false};
use fieldops_core::{GeoPoint, Many2One, OdooId};

pub const EMPLOYEE_FIELDS: &[&str] = &[
    "id",
    "name",
    "pin",
    "barcode",
    "user_id",
    "work_location_id",
    "company_id",
];

pub const ATTENDANCE_FIELDS: &[&str] = &["id", "employee_id", "check_in", "check_out"];

pub const WFH_FIELDS: &[&str] = &["id", "request_date", "reason", "state"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: OdooId,
    pub name: String,
    #[serde(default, deserialize_with = "string_or_false")]
    pub pin: Option<String>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub barcode: Option<String>,
    #[serde(default, deserialize_with = "many2one_opt")]
    pub user_id: Option<Many2One>,
    #[serde(default, deserialize_with = "many2one_opt")]
    pub work_location_id: Option<Many2One>,
    #[serde(default, deserialize_with = "many2one_opt")]
    pub company_id: Option<Many2One>,
}

/// One attendance record. `check_out` is unset while the employee is
/// still clocked in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attendance {
    pub id: OdooId,
    #[serde(default, deserialize_with = "many2one_opt")]
    pub employee_id: Option<Many2One>,
    pub check_in: String,
    #[serde(default, deserialize_with = "string_or_false")]
    pub check_out: Option<String>,
}

impl Attendance {
    pub fn is_open(&self) -> bool {
        self.check_out.is_none()
    }
}

/// Resolved workplace coordinates for geofence checks.
#[derive(Debug, Clone, Serialize)]
pub struct Workplace {
    pub name: String,
    pub point: GeoPoint,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WfhRequest {
    pub id: OdooId,
    pub request_date: String,
    #[serde(default, deserialize_with = "string_or_false")]
    pub reason: Option<String>,
    pub state: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn open_attendance_has_false_check_out() {
        let a: Attendance = serde_json::from_value(json!({
            "id": 12,
            "employee_id": [7, "Jo"],
            "check_in": "2025-03-09 08:00:12",
            "check_out": false,
        }))
        .unwrap();
        assert!(a.is_open());
        assert_eq!(a.employee_id.unwrap().id, 7);
    }

    #[test]
    fn employee_without_badge_decodes() {
        let e: Employee = serde_json::from_value(json!({
            "id": 7,
            "name": "Jo",
            "pin": false,
            "barcode": false,
            "user_id": [3, "jo@example.com"],
            "work_location_id": false,
            "company_id": [1, "HQ"],
        }))
        .unwrap();
        assert!(e.pin.is_none());
        assert!(e.work_location_id.is_none());
        assert_eq!(e.company_id.unwrap().id, 1);
    }
}
