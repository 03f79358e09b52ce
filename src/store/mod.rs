pub mod history;
pub mod inventory;

pub use history::{HistoryPage, ReceiptHistory};
pub use inventory::InventoryStore;
