pub mod error;
pub mod geo;
pub mod media;
pub mod time;
pub mod types;

pub use error::ClientError;
pub use geo::{GeoPoint, GeofenceCheck};
pub use types::{Many2One, OdooId};
