//! Applying changes to the remote calendar.

mod driver;
mod report;
mod snapshot;

pub use driver::{SyncDriver, SyncOptions};
pub use report::{OutcomeStatus, SyncOutcome, SyncReport};
pub use snapshot::{CorruptEvent, RemoteSnapshot, decode_remote};
