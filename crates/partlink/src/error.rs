//! Error taxonomy for the parts pipeline.
//!
//! Every variant here is fatal for the table build. Search never produces
//! one of these; unmatched queries are reported through `search::Status`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PartsError {
  #[error("No part records found in any sheet of the primary source")]
  NoData,

  #[error("Column '{field}' not found in the primary source; check the sheet headers")]
  MissingKeyField { field: String },

  #[error("Column '{field}' not found in recommendation sheet '{sheet}'; check the sheet headers")]
  MissingRecommendationKey { sheet: String, field: String },

  #[error("Source file not found: {}", path.display())]
  SourceNotFound { path: PathBuf },

  #[error("Sheet '{sheet}' not found in {}", path.display())]
  SheetNotFound { path: PathBuf, sheet: String },

  #[error("Unsupported source type: {}", path.display())]
  UnsupportedSource { path: PathBuf },

  #[error("Failed to read workbook {}: {message}", path.display())]
  Workbook { path: PathBuf, message: String },

  #[error("Invalid configuration: {message}")]
  Config { message: String },

  #[error(transparent)]
  Io(#[from] std::io::Error),

  #[error(transparent)]
  Csv(#[from] csv::Error),

  #[error(transparent)]
  Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PartsError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_missing_key_field_names_the_column() {
    let err = PartsError::MissingKeyField { field: "Spare Part Code".to_string() };
    assert!(err.to_string().contains("'Spare Part Code'"));
  }

  #[test]
  fn test_missing_recommendation_key_names_sheet_and_column() {
    let err = PartsError::MissingRecommendationKey { sheet: "Sheet1".to_string(), field: "Model".to_string() };
    assert_eq!(err.to_string(), "Column 'Model' not found in recommendation sheet 'Sheet1'; check the sheet headers");
  }

  #[test]
  fn test_source_not_found_shows_path() {
    let err = PartsError::SourceNotFound { path: PathBuf::from("data/parts.xlsx") };
    assert_eq!(err.to_string(), "Source file not found: data/parts.xlsx");
  }
}
