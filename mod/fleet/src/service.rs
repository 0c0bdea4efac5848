use std::sync::Arc;

use serde_json::{Map, Value, json};
use tracing::warn;

use fieldops_core::{ClientError, GeoPoint, GeofenceCheck, OdooId, geo, media, time};
use fieldops_rpc::{Domain, OdooClient, SearchReadOptions};

use crate::model::{
    FUEL_KEYS, LOCATION_FIELDS, STAFF_LOCATION_FIELDS, StaffLocation, TRIP_FIELDS, Trip,
    TripLocation, VisitPurpose,
};

pub struct FleetService {
    client: Arc<OdooClient>,
}

impl FleetService {
    pub fn new(client: Arc<OdooClient>) -> Self {
        Self { client }
    }

    /// Trips for a day and/or vehicle, newest first. Cancelled trips
    /// are filtered out after the fetch; `trip_cancel` is not reliably
    /// searchable on older servers.
    pub async fn trips(
        &self,
        date: Option<&str>,
        vehicle_id: Option<OdooId>,
        options: SearchReadOptions,
    ) -> Result<Vec<Trip>, ClientError> {
        let mut domain = Domain::new();
        if let Some(date) = date {
            let parsed = time::parse_date(date)
                .map_err(|e| ClientError::Validation(e.to_string()))?;
            let (start, end) = time::day_bounds(parsed);
            domain = domain.between("date", &start, &end);
        }
        if let Some(vehicle_id) = vehicle_id {
            domain = domain.eq("vehicle_id", vehicle_id);
        }

        let trips: Vec<Trip> = self
            .client
            .search_read_as(
                "vehicle.tracking",
                domain,
                TRIP_FIELDS,
                options.or_order("date desc"),
            )
            .await?;
        Ok(trips.into_iter().filter(|t| !t.trip_cancel).collect())
    }

    /// Named trip endpoints, optionally filtered by name.
    pub async fn locations(&self, search: Option<&str>) -> Result<Vec<TripLocation>, ClientError> {
        let mut domain = Domain::new();
        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            domain = domain.ilike("name", term);
        }
        self.client
            .search_read_as(
                "vehicle.location",
                domain,
                LOCATION_FIELDS,
                SearchReadOptions::limited(50).order("name asc"),
            )
            .await
    }

    pub async fn visit_purposes(&self) -> Result<Vec<VisitPurpose>, ClientError> {
        self.client
            .search_read_as(
                "vehicle.purpose",
                Domain::new(),
                &["id", "name"],
                SearchReadOptions::default().order("name asc"),
            )
            .await
    }

    /// Create or update a trip from a raw value map. Fuel fields are
    /// split off into a `vehicle.fuel.log` record; the fuel log and
    /// the read-back are best-effort and never fail the save.
    pub async fn save_trip(&self, payload: Value) -> Result<OdooId, ClientError> {
        let Value::Object(mut vals) = payload else {
            return Err(ClientError::Validation(
                "trip payload must be an object".to_string(),
            ));
        };
        let existing_id = vals.remove("id").as_ref().and_then(Value::as_i64);

        let fuel_source = vals.clone();
        for key in FUEL_KEYS {
            vals.remove(*key);
        }

        let trip_id = match existing_id {
            Some(id) => {
                self.client
                    .write("vehicle.tracking", &[id], Value::Object(vals))
                    .await?;
                id
            }
            None => {
                self.client
                    .create("vehicle.tracking", Value::Object(vals))
                    .await?
            }
        };

        if has_fuel(&fuel_source) {
            let fuel_vals = fuel_log_vals(trip_id, &fuel_source);
            if let Err(err) = self.client.create("vehicle.fuel.log", fuel_vals).await {
                warn!(trip = trip_id, error = %err, "fuel log creation failed");
            }
        }

        // Read back to confirm server-computed fields landed.
        if let Err(err) = self
            .client
            .search_read(
                "vehicle.tracking",
                Domain::new().eq("id", trip_id),
                &["id", "image_url", "number_plate", "date", "vehicle_id", "driver_id"],
                SearchReadOptions::default(),
            )
            .await
        {
            warn!(trip = trip_id, error = %err, "trip read-back failed");
        }

        Ok(trip_id)
    }

    /// Cancel a trip, also clearing the started flag so it drops out
    /// of in-progress views.
    pub async fn cancel_trip(&self, trip_id: OdooId) -> Result<(), ClientError> {
        self.client
            .write(
                "vehicle.tracking",
                &[trip_id],
                json!({"trip_cancel": true, "start_trip": false}),
            )
            .await
    }

    /// Measure the device position against a trip endpoint's geofence.
    pub fn verify_trip_endpoint(
        &self,
        location: &TripLocation,
        position: GeoPoint,
    ) -> Result<GeofenceCheck, ClientError> {
        let center = location.point().ok_or_else(|| {
            ClientError::Validation(format!("location {:?} has no coordinates", location.name))
        })?;
        Ok(geo::check(position, center, geo::DEFAULT_GEOFENCE_RADIUS_M))
    }

    /// Upsert the caller's live position on `user.location`, one
    /// record per user.
    pub async fn update_staff_location(
        &self,
        uid: OdooId,
        point: GeoPoint,
        location_name: &str,
        accuracy: Option<f64>,
    ) -> Result<OdooId, ClientError> {
        let vals = json!({
            "latitude": point.latitude,
            "longitude": point.longitude,
            "location_name": location_name,
            "last_updated": time::now_string(),
            "accuracy": accuracy,
        });

        let existing = self
            .client
            .search_read(
                "user.location",
                Domain::new().eq("user_id", uid),
                &["id"],
                SearchReadOptions::limited(1),
            )
            .await?;

        match existing.first().and_then(|r| r.get("id")).and_then(Value::as_i64) {
            Some(id) => {
                self.client.write("user.location", &[id], vals).await?;
                Ok(id)
            }
            None => {
                let mut create_vals = vals;
                create_vals["user_id"] = uid.into();
                self.client.create("user.location", create_vals).await
            }
        }
    }

    /// Last known position of one user.
    pub async fn staff_location(&self, uid: OdooId) -> Result<Option<StaffLocation>, ClientError> {
        let mut records: Vec<StaffLocation> = self
            .client
            .search_read_as(
                "user.location",
                Domain::new().eq("user_id", uid),
                STAFF_LOCATION_FIELDS,
                SearchReadOptions::limited(1),
            )
            .await?;
        Ok(records.pop())
    }

    /// Last known position of every tracked user, freshest first.
    pub async fn staff_locations(&self) -> Result<Vec<StaffLocation>, ClientError> {
        self.client
            .search_read_as(
                "user.location",
                Domain::new(),
                STAFF_LOCATION_FIELDS,
                SearchReadOptions::default().order("last_updated desc"),
            )
            .await
    }
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Null) | None => false,
        Some(_) => true,
    }
}

fn has_fuel(payload: &Map<String, Value>) -> bool {
    ["fuel_amount", "fuel_liters", "fuel_litres", "current_odometer"]
        .iter()
        .any(|key| truthy(payload.get(*key)))
}

/// Map trip-level fuel fields onto `vehicle.fuel.log` columns.
fn fuel_log_vals(trip_id: OdooId, payload: &Map<String, Value>) -> Value {
    let mut vals = Map::new();
    vals.insert("vehicle_tracking_id".to_string(), trip_id.into());

    let copy = [
        ("vehicle_id", "vehicle_id"),
        ("driver_id", "driver_id"),
        ("invoice_number", "name"),
        ("fuel_amount", "amount"),
        ("current_odometer", "odometer"),
        ("start_latitude", "gps_lat"),
        ("start_longitude", "gps_long"),
    ];
    for (from, to) in copy {
        if truthy(payload.get(from)) {
            if let Some(value) = payload.get(from) {
                vals.insert(to.to_string(), value.clone());
            }
        }
    }

    // Both spellings occur in the wild; litres wins only when liters
    // is absent.
    let level = ["fuel_liters", "fuel_litres"]
        .iter()
        .find_map(|key| payload.get(*key).filter(|v| truthy(Some(v))));
    if let Some(level) = level {
        vals.insert("fuel_level".to_string(), level.clone());
    }

    if let Some(Value::String(image)) = payload.get("odometer_image") {
        vals.insert(
            "odometer_image".to_string(),
            media::strip_data_uri(image).into(),
        );
        let filename = payload
            .get("odometer_image_filename")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| {
                payload
                    .get("odometer_image_uri")
                    .and_then(Value::as_str)
                    .and_then(|uri| uri.rsplit('/').next())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "odometer.jpg".to_string());
        vals.insert("odometer_image_filename".to_string(), filename.into());
    }

    Value::Object(vals)
}
