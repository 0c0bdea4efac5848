//! Typed JSON-RPC client for the Odoo web API.
//!
//! One client owns one session cookie, one transport, and one retry
//! policy; the typed service crates sit on top of [`OdooClient`].

pub mod client;
pub mod config;
pub mod domain;
pub mod protocol;
pub mod session;
pub mod testing;
pub mod transport;

pub use client::{OdooClient, SearchReadOptions};
pub use config::{OdooConfig, RetryPolicy};
pub use domain::Domain;
pub use session::{SESSION_COOKIE_KEY, SessionStore};
pub use transport::{HttpTransport, Transport, WireResponse};
