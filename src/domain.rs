//! Domain module - award records, field mapping and run reconciliation
//!
//! Pure types and rules with no I/O. Each module is its own file in the
//! domain/ directory; common items are re-exported here.

pub mod aggregation;
pub mod mapping;
pub mod pagination;
pub mod record;

pub use aggregation::{ExtractionOutcome, ResultAggregator};
pub use mapping::FieldMapping;
pub use pagination::ResultsSummary;
pub use record::{DetailLink, FieldRecord, FieldValue, ResultTable, StatusVector};
