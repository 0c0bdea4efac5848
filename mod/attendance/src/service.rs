use std::sync::Arc;

use serde_json::{Value, json};
use tracing::debug;

use fieldops_core::{ClientError, GeoPoint, GeofenceCheck, OdooId, geo, media, time};
use fieldops_rpc::{Domain, OdooClient, SearchReadOptions};

use crate::model::{
    ATTENDANCE_FIELDS, Attendance, EMPLOYEE_FIELDS, Employee, WFH_FIELDS, WfhRequest, Workplace,
};

/// WFH states that allow clocking in remotely today.
const WFH_ACTIVE_STATES: &[&str] = &["approved", "checked_in", "checked_out"];

pub struct AttendanceService {
    client: Arc<OdooClient>,
}

impl AttendanceService {
    pub fn new(client: Arc<OdooClient>) -> Self {
        Self { client }
    }

    /// Employee record linked to a login user.
    pub async fn employee_for_user(&self, uid: OdooId) -> Result<Option<Employee>, ClientError> {
        let mut records: Vec<Employee> = self
            .client
            .search_read_as(
                "hr.employee",
                Domain::new().eq("user_id", uid),
                EMPLOYEE_FIELDS,
                SearchReadOptions::limited(1),
            )
            .await?;
        Ok(records.pop())
    }

    /// Employees, optionally matched on name.
    pub async fn employees(
        &self,
        search: Option<&str>,
        options: SearchReadOptions,
    ) -> Result<Vec<Employee>, ClientError> {
        let mut domain = Domain::new();
        if let Some(needle) = search.map(str::trim).filter(|t| !t.is_empty()) {
            domain = domain.ilike("name", needle);
        }
        self.client
            .search_read_as(
                "hr.employee",
                domain,
                EMPLOYEE_FIELDS,
                options.or_order("name asc"),
            )
            .await
    }

    pub async fn employee(&self, employee_id: OdooId) -> Result<Option<Employee>, ClientError> {
        let mut records: Vec<Employee> = self
            .client
            .search_read_as(
                "hr.employee",
                Domain::new().eq("id", employee_id),
                EMPLOYEE_FIELDS,
                SearchReadOptions::limited(1),
            )
            .await?;
        Ok(records.pop())
    }

    /// Look up an employee by badge code, trying the PIN column first
    /// and the barcode column second.
    pub async fn employee_by_badge(&self, code: &str) -> Result<Option<Employee>, ClientError> {
        for field in ["pin", "barcode"] {
            let mut records: Vec<Employee> = self
                .client
                .search_read_as(
                    "hr.employee",
                    Domain::new().eq(field, code),
                    EMPLOYEE_FIELDS,
                    SearchReadOptions::limited(1),
                )
                .await?;
            if let Some(employee) = records.pop() {
                return Ok(Some(employee));
            }
        }
        Ok(None)
    }

    /// Latest attendance record still missing a check-out.
    pub async fn open_attendance(
        &self,
        employee_id: OdooId,
    ) -> Result<Option<Attendance>, ClientError> {
        let mut records: Vec<Attendance> = self
            .client
            .search_read_as(
                "hr.attendance",
                Domain::new()
                    .eq("employee_id", employee_id)
                    .eq("check_out", false),
                ATTENDANCE_FIELDS,
                SearchReadOptions::limited(1).order("check_in desc"),
            )
            .await?;
        Ok(records.pop())
    }

    /// Clock in. Any record left open from an earlier shift is closed
    /// first so the new one starts clean.
    pub async fn check_in(&self, employee_id: OdooId) -> Result<OdooId, ClientError> {
        let now = time::now_string();
        if let Some(open) = self.open_attendance(employee_id).await? {
            debug!(attendance = open.id, "closing stale open attendance");
            self.client
                .write("hr.attendance", &[open.id], json!({"check_out": now}))
                .await?;
        }
        self.client
            .create(
                "hr.attendance",
                json!({"employee_id": employee_id, "check_in": now}),
            )
            .await
    }

    /// Clock out of the currently open attendance.
    pub async fn check_out(&self, employee_id: OdooId) -> Result<OdooId, ClientError> {
        let open = self
            .open_attendance(employee_id)
            .await?
            .ok_or_else(|| ClientError::NotFound("no open attendance to close".to_string()))?;
        self.client
            .write(
                "hr.attendance",
                &[open.id],
                json!({"check_out": time::now_string()}),
            )
            .await?;
        Ok(open.id)
    }

    /// Today's attendance, preferring a still-open record over closed
    /// ones.
    pub async fn today_attendance(
        &self,
        employee_id: OdooId,
    ) -> Result<Option<Attendance>, ClientError> {
        let (start, end) = time::today_bounds();
        let mut records: Vec<Attendance> = self
            .client
            .search_read_as(
                "hr.attendance",
                Domain::new()
                    .eq("employee_id", employee_id)
                    .between("check_in", &start, &end),
                ATTENDANCE_FIELDS,
                SearchReadOptions::default().order("check_in desc"),
            )
            .await?;
        match records.iter().position(Attendance::is_open) {
            Some(i) => Ok(Some(records.swap_remove(i))),
            None => Ok(records.into_iter().next()),
        }
    }

    /// Resolve the employee's workplace coordinates: the work location
    /// address when one is set, otherwise the company's partner.
    pub async fn workplace_location(&self, employee: &Employee) -> Result<Workplace, ClientError> {
        if let Some(location) = &employee.work_location_id {
            let records = self
                .client
                .read("hr.work.location", &[location.id], &["name", "address_id"])
                .await?;
            if let Some(record) = records.first() {
                if let Some(address_id) = relation_id(record.get("address_id")) {
                    if let Some(point) = self.partner_point(address_id).await? {
                        let name = record
                            .get("name")
                            .and_then(Value::as_str)
                            .map(str::to_string)
                            .unwrap_or_else(|| location.display());
                        return Ok(Workplace { name, point });
                    }
                }
            }
        }

        if let Some(company) = &employee.company_id {
            let records = self
                .client
                .read("res.company", &[company.id], &["name", "partner_id"])
                .await?;
            if let Some(record) = records.first() {
                if let Some(partner_id) = relation_id(record.get("partner_id")) {
                    if let Some(point) = self.partner_point(partner_id).await? {
                        let name = record
                            .get("name")
                            .and_then(Value::as_str)
                            .map(str::to_string)
                            .unwrap_or_else(|| company.display());
                        return Ok(Workplace { name, point });
                    }
                }
            }
        }

        Err(ClientError::NotFound(
            "no workplace coordinates configured".to_string(),
        ))
    }

    async fn partner_point(&self, partner_id: OdooId) -> Result<Option<GeoPoint>, ClientError> {
        let records = self
            .client
            .read(
                "res.partner",
                &[partner_id],
                &["partner_latitude", "partner_longitude"],
            )
            .await?;
        let Some(record) = records.first() else {
            return Ok(None);
        };
        let latitude = record.get("partner_latitude").and_then(Value::as_f64);
        let longitude = record.get("partner_longitude").and_then(Value::as_f64);
        match (latitude, longitude) {
            // (0, 0) means nobody ever set the coordinates.
            (Some(lat), Some(lon)) if lat != 0.0 || lon != 0.0 => {
                Ok(Some(GeoPoint::new(lat, lon)))
            }
            _ => Ok(None),
        }
    }

    /// Measure the device position against the workplace geofence.
    pub fn verify_location(&self, position: GeoPoint, workplace: &Workplace) -> GeofenceCheck {
        geo::check(position, workplace.point, geo::DEFAULT_GEOFENCE_RADIUS_M)
    }

    /// Attach a check-in or check-out photo to an attendance record.
    /// `image` may be a raw base64 string or a full data URI.
    pub async fn upload_photo(
        &self,
        attendance_id: OdooId,
        kind: &str,
        image: &str,
    ) -> Result<OdooId, ClientError> {
        let name = format!(
            "attendance_{kind}_{attendance_id}_{stamp}.jpg",
            stamp = time::file_stamp()
        );
        self.client
            .create_with_timeout(
                "ir.attachment",
                json!({
                    "name": name,
                    "type": "binary",
                    "datas": media::strip_data_uri(image),
                    "res_model": "hr.attendance",
                    "res_id": attendance_id,
                    "mimetype": "image/jpeg",
                }),
                self.client.config().attachment_timeout,
            )
            .await
    }

    /// File a WFH request and submit it for approval in one go.
    pub async fn submit_wfh(
        &self,
        uid: OdooId,
        request_date: &str,
        reason: &str,
    ) -> Result<OdooId, ClientError> {
        let id = self
            .client
            .create(
                "hr.wfh.request",
                json!({
                    "employee_user_id": uid,
                    "request_date": request_date,
                    "reason": reason,
                }),
            )
            .await?;
        self.client
            .exec("hr.wfh.request", "action_submit", &[id])
            .await?;
        Ok(id)
    }

    /// Today's WFH request if it is approved or already in progress.
    pub async fn today_approved_wfh(
        &self,
        uid: OdooId,
    ) -> Result<Option<WfhRequest>, ClientError> {
        let mut records: Vec<WfhRequest> = self
            .client
            .search_read_as(
                "hr.wfh.request",
                Domain::new()
                    .eq("employee_user_id", uid)
                    .eq("request_date", time::today().to_string())
                    .is_in("state", WFH_ACTIVE_STATES),
                WFH_FIELDS,
                SearchReadOptions::limited(1),
            )
            .await?;
        Ok(records.pop())
    }

    pub async fn wfh_check_in(&self, request_id: OdooId) -> Result<(), ClientError> {
        self.client
            .exec("hr.wfh.request", "action_checkin", &[request_id])
            .await?;
        Ok(())
    }

    pub async fn wfh_check_out(&self, request_id: OdooId) -> Result<(), ClientError> {
        self.client
            .exec("hr.wfh.request", "action_checkout", &[request_id])
            .await?;
        Ok(())
    }

    /// Recent WFH history, newest first.
    pub async fn wfh_requests(&self, uid: OdooId) -> Result<Vec<WfhRequest>, ClientError> {
        self.client
            .search_read_as(
                "hr.wfh.request",
                Domain::new().eq("employee_user_id", uid),
                WFH_FIELDS,
                SearchReadOptions::limited(20).order("request_date desc"),
            )
            .await
    }
}

fn relation_id(value: Option<&Value>) -> Option<OdooId> {
    match value? {
        Value::Array(pair) => pair.first().and_then(Value::as_i64),
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
}
