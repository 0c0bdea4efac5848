//! Inter-company stock transfers on `intercompany.stock.request`.

pub mod model;
pub mod service;

pub use model::{
    NewStockLine, NewStockRequest, StockRequest, StockRequestDetails, StockRequestLine,
    StockRequestPatch,
};
pub use service::StockService;
