//! Transaction auditing on `audit.transaction`: listing, sign-off
//! capture, state changes, and voucher attachments.

pub mod model;
pub mod service;

pub use model::{AuditDetails, AuditInput, AuditLine, AuditSummary, Attachment, UploadOutcome};
pub use service::AuditService;
