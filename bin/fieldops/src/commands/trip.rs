//! Trip commands beyond the generic get/create.

use std::path::Path;

use anyhow::Result;

use fieldops_core::{GeoPoint, OdooId};
use fieldops_fleet::FleetService;

use super::{build_client, print_json};

pub async fn cancel(trip_id: OdooId, client_config_path: &Path) -> Result<()> {
    let service = FleetService::new(build_client(client_config_path)?);
    service.cancel_trip(trip_id).await?;
    println!("Trip {} cancelled.", trip_id);
    Ok(())
}

/// Check a position against a named trip endpoint's geofence.
pub async fn verify(location: &str, position: GeoPoint, client_config_path: &Path) -> Result<()> {
    let service = FleetService::new(build_client(client_config_path)?);
    let endpoint = service
        .locations(Some(location))
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("No trip location matching \"{}\".", location))?;
    let check = service.verify_trip_endpoint(&endpoint, position)?;
    print_json(&check)?;
    Ok(())
}

/// Report the user's live position.
pub async fn locate(
    uid: OdooId,
    position: GeoPoint,
    name: &str,
    accuracy: Option<f64>,
    client_config_path: &Path,
) -> Result<()> {
    let service = FleetService::new(build_client(client_config_path)?);
    let id = service
        .update_staff_location(uid, position, name, accuracy)
        .await?;
    println!("Staff location {} updated.", id);
    Ok(())
}
