pub mod cart;
pub mod matcher;
pub mod scanner;

pub use cart::{CartService, CartView, SubmitOutcome};
pub use matcher::MatchEngine;
pub use scanner::{parse_receipt_text, ScanFailure, ScanOutcome, ScanService};
