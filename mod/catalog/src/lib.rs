//! Catalog lookups: products, stock levels, categories, customers,
//! and users.

pub mod model;
pub mod service;

pub use model::{Category, Customer, Product, ProductQuery, StockLevel, User};
pub use service::CatalogService;
