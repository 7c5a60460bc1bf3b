//! Application Use Cases
//!
//! Use cases orchestrate domain logic to fulfill application requirements.

mod sync_trades;

pub use sync_trades::{SyncError, SyncTradesUseCase};
