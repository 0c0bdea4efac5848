//! Attendance commands: clock in/out, status, geofence checks.

use std::path::Path;

use anyhow::Result;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use fieldops_attendance::{AttendanceService, Employee};
use fieldops_core::{GeoPoint, OdooId};

use super::{build_client, print_json};

/// Who is clocking: either a numeric employee ID or a badge code.
#[derive(Debug)]
pub enum Who {
    Employee(OdooId),
    Badge(String),
}

async fn resolve(service: &AttendanceService, who: &Who) -> Result<Employee> {
    let found = match who {
        Who::Employee(id) => service.employee(*id).await?,
        Who::Badge(code) => service.employee_by_badge(code).await?,
    };
    found.ok_or_else(|| anyhow::anyhow!("Employee not found."))
}

/// Check the position against the employee's workplace geofence,
/// failing the command when outside it.
async fn enforce_geofence(
    service: &AttendanceService,
    employee: &Employee,
    position: GeoPoint,
    force: bool,
) -> Result<()> {
    let workplace = service.workplace_location(employee).await?;
    let check = service.verify_location(position, &workplace);
    if !check.within_range {
        if force {
            eprintln!(
                "warning: outside the \"{}\" geofence ({:.0}m away, allowed {:.0}m), continuing.",
                workplace.name, check.distance_m, check.radius_m
            );
            return Ok(());
        }
        anyhow::bail!(
            "Outside the \"{}\" geofence: {:.0}m away, allowed {:.0}m. Use --force to override.",
            workplace.name,
            check.distance_m,
            check.radius_m
        );
    }
    println!(
        "Within the \"{}\" geofence ({:.0}m away).",
        workplace.name, check.distance_m
    );
    Ok(())
}

fn read_photo(path: &str) -> Result<String> {
    let bytes = std::fs::read(path)
        .map_err(|e| anyhow::anyhow!("Cannot read photo {}: {}", path, e))?;
    Ok(BASE64.encode(bytes))
}

pub async fn check_in(
    who: &Who,
    position: Option<GeoPoint>,
    photo: Option<&str>,
    force: bool,
    client_config_path: &Path,
) -> Result<()> {
    let service = AttendanceService::new(build_client(client_config_path)?);
    let employee = resolve(&service, who).await?;

    if let Some(position) = position {
        enforce_geofence(&service, &employee, position, force).await?;
    }

    let attendance_id = service.check_in(employee.id).await?;
    if let Some(path) = photo {
        service
            .upload_photo(attendance_id, "checkin", &read_photo(path)?)
            .await?;
    }

    println!("{} checked in (attendance {}).", employee.name, attendance_id);
    Ok(())
}

pub async fn check_out(
    who: &Who,
    position: Option<GeoPoint>,
    photo: Option<&str>,
    force: bool,
    client_config_path: &Path,
) -> Result<()> {
    let service = AttendanceService::new(build_client(client_config_path)?);
    let employee = resolve(&service, who).await?;

    if let Some(position) = position {
        enforce_geofence(&service, &employee, position, force).await?;
    }

    let attendance_id = service.check_out(employee.id).await?;
    if let Some(path) = photo {
        service
            .upload_photo(attendance_id, "checkout", &read_photo(path)?)
            .await?;
    }

    println!("{} checked out (attendance {}).", employee.name, attendance_id);
    Ok(())
}

/// Show today's attendance record for the employee.
pub async fn status(who: &Who, client_config_path: &Path) -> Result<()> {
    let service = AttendanceService::new(build_client(client_config_path)?);
    let employee = resolve(&service, who).await?;

    match service.today_attendance(employee.id).await? {
        Some(attendance) => print_json(&attendance)?,
        None => println!("No attendance today for {}.", employee.name),
    }
    Ok(())
}

/// Report the geofence check without clocking anything.
pub async fn verify(who: &Who, position: GeoPoint, client_config_path: &Path) -> Result<()> {
    let service = AttendanceService::new(build_client(client_config_path)?);
    let employee = resolve(&service, who).await?;

    let workplace = service.workplace_location(&employee).await?;
    let check = service.verify_location(position, &workplace);
    print_json(&check)?;
    Ok(())
}
