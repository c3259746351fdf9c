//! Readers and writers for the files `geogroup-tools` work with.
//!
//! - [`csv`]: tables of locations, one record per line, with a header row,
//! - [`grouping`]: the outcome of a grouping, as CSV.

pub mod csv;
pub mod grouping;

pub use crate::csv::Columns;
pub use crate::csv::Record;
pub use crate::csv::Table;
