pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod store;

pub use client::{HttpBackend, PosBackend};
pub use config::AppConfig;
pub use error::PosError;
pub use service::{CartService, MatchEngine, ScanService};
pub use store::{InventoryStore, ReceiptHistory};
