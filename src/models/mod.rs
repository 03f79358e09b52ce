pub mod cart;
pub mod inventory;
pub mod receipt;
pub mod scan;

pub use cart::{display_amount, CartLine, PaymentMethod, TAX_RATE, WALK_IN_CUSTOMER};
pub use inventory::InventoryItem;
pub use receipt::{
    Receipt, ReceiptLine, ReceiptStatus, ReceiptWire, RemoteReceipt, RemoteReceiptLine,
};
pub use scan::{MatchBuckets, ScannedCandidate, ScoredMatch};
