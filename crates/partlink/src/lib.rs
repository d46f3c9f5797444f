//! Partlink - Spare Parts Lookup
//!
//! Normalizes the sheets of a multi-sheet spare-parts workbook into one
//! table, links each part to its China-side recommendation and answers
//! lookups by code, model or free text over the merged result.

pub mod catalog;
pub mod config;
pub mod display;
pub mod error;
pub mod images;
pub mod merge;
pub mod normalize;
pub mod options;
pub mod record;
pub mod search;
pub mod server;
pub mod workbook;

pub use catalog::{Catalog, Snapshot};
pub use config::Config;
pub use error::{PartsError, Result};
pub use merge::MergedTable;
pub use record::PartRecord;
pub use search::{search, Query, SearchOutcome, Status, StatusKind};
