use serde::{Deserialize, Serialize};

use fieldops_core::types::{f64_or_false, many2one_opt, string_or_false};
use fieldops_core::{GeoPoint, Many2One, OdooId};

pub const TRIP_FIELDS: &[&str] = &[
    "id",
    "vehicle_id",
    "driver_id",
    "date",
    "number_plate",
    "start_km",
    "end_km",
    "start_trip",
    "end_trip",
    "source_id",
    "destination_id",
    "coolant_water",
    "oil_checking",
    "tyre_checking",
    "battery_checking",
    "fuel_checking",
    "daily_checks",
    "purpose_of_visit_id",
    "estimated_time",
    "start_latitude",
    "start_longitude",
    "trip_cancel",
];

pub const LOCATION_FIELDS: &[&str] = &["id", "name", "latitude", "longitude"];

pub const STAFF_LOCATION_FIELDS: &[&str] = &[
    "id",
    "user_id",
    "latitude",
    "longitude",
    "location_name",
    "last_updated",
    "accuracy",
];

/// Value keys that belong on the fuel log, not the trip record.
pub const FUEL_KEYS: &[&str] = &[
    "fuel_amount",
    "fuel_liters",
    "fuel_litres",
    "invoice_number",
    "odometer_image",
    "odometer_image_filename",
    "odometer_image_uri",
    "current_odometer",
    "post_trip_amount",
    "post_trip_litres",
    "end_fuel_document",
    "pre_trip_litres",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: OdooId,
    #[serde(default, deserialize_with = "many2one_opt")]
    pub vehicle_id: Option<Many2One>,
    #[serde(default, deserialize_with = "many2one_opt")]
    pub driver_id: Option<Many2One>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub number_plate: Option<String>,
    #[serde(default, deserialize_with = "f64_or_false")]
    pub start_km: Option<f64>,
    #[serde(default, deserialize_with = "f64_or_false")]
    pub end_km: Option<f64>,
    #[serde(default)]
    pub start_trip: bool,
    #[serde(default)]
    pub end_trip: bool,
    #[serde(default, deserialize_with = "many2one_opt")]
    pub source_id: Option<Many2One>,
    #[serde(default, deserialize_with = "many2one_opt")]
    pub destination_id: Option<Many2One>,
    #[serde(default)]
    pub coolant_water: bool,
    #[serde(default)]
    pub oil_checking: bool,
    #[serde(default)]
    pub tyre_checking: bool,
    #[serde(default)]
    pub battery_checking: bool,
    #[serde(default)]
    pub fuel_checking: bool,
    #[serde(default)]
    pub daily_checks: bool,
    #[serde(default, deserialize_with = "many2one_opt")]
    pub purpose_of_visit_id: Option<Many2One>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub estimated_time: Option<String>,
    #[serde(default, deserialize_with = "f64_or_false")]
    pub start_latitude: Option<f64>,
    #[serde(default, deserialize_with = "f64_or_false")]
    pub start_longitude: Option<f64>,
    #[serde(default)]
    pub trip_cancel: bool,
}

impl Trip {
    /// A trip is underway when started but not yet ended or cancelled.
    pub fn is_underway(&self) -> bool {
        self.start_trip && !self.end_trip && !self.trip_cancel
    }
}

/// A named source/destination point on `vehicle.location`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripLocation {
    pub id: OdooId,
    pub name: String,
    #[serde(default, deserialize_with = "f64_or_false")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "f64_or_false")]
    pub longitude: Option<f64>,
}

impl TripLocation {
    pub fn point(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitPurpose {
    pub id: OdooId,
    pub name: String,
}

/// Last reported position of a staff user on `user.location`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffLocation {
    pub id: OdooId,
    #[serde(default, deserialize_with = "many2one_opt")]
    pub user_id: Option<Many2One>,
    #[serde(default, deserialize_with = "f64_or_false")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "f64_or_false")]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub location_name: Option<String>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub last_updated: Option<String>,
    #[serde(default, deserialize_with = "f64_or_false")]
    pub accuracy: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn trip_with_falsy_fields_decodes() {
        let t: Trip = serde_json::from_value(json!({
            "id": 5,
            "vehicle_id": [2, "KA-01-1234"],
            "driver_id": false,
            "date": "2025-03-09 06:00:00",
            "number_plate": "KA-01-1234",
            "start_km": 1200.5,
            "end_km": false,
            "start_trip": true,
            "end_trip": false,
            "source_id": [1, "Depot"],
            "destination_id": false,
            "purpose_of_visit_id": false,
            "estimated_time": false,
            "start_latitude": 12.97,
            "start_longitude": 77.59,
            "trip_cancel": false,
        }))
        .unwrap();
        assert!(t.is_underway());
        assert!(t.driver_id.is_none());
        assert_eq!(t.start_km, Some(1200.5));
        assert!(t.end_km.is_none());
    }

    #[test]
    fn location_without_coordinates_has_no_point() {
        let l: TripLocation = serde_json::from_value(json!({
            "id": 1, "name": "Depot", "latitude": false, "longitude": false,
        }))
        .unwrap();
        assert!(l.point().is_none());

        let l: TripLocation = serde_json::from_value(json!({
            "id": 2, "name": "Yard", "latitude": 12.9, "longitude": 77.6,
        }))
        .unwrap();
        assert_eq!(l.point().unwrap().longitude, 77.6);
    }
}
