//! Attendance: check-in/out against `hr.attendance`, workplace
//! geofencing, and work-from-home requests.

pub mod model;
pub mod service;

pub use model::{Attendance, Employee, WfhRequest, Workplace};
pub use service::AttendanceService;
