//! Reading and writing opportunity snapshots.

pub mod error;
pub mod report;
pub mod snapshot;
pub mod writer;

pub use error::{IngestError, Result};
pub use report::{TempCodeEntry, read_code_report, write_code_report};
pub use snapshot::{Snapshot, SnapshotRow};
pub use writer::{replace_snapshot, write_snapshot};
