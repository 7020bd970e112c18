//! FPDS award scraper
//!
//! Searches the FPDS portal for a list of names, follows every result page to
//! the award detail forms and extracts the mapped fields of each form into a
//! result table, together with a per-name status report.

// Module declarations
pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{RunReport, run};
