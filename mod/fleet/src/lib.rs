//! Fleet: vehicle trips on `vehicle.tracking`, fuel logs, trip
//! locations, and live staff positions.

pub mod model;
pub mod service;

pub use model::{StaffLocation, Trip, TripLocation, VisitPurpose};
pub use service::FleetService;
