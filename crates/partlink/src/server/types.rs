//! REST API request and response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::options::ModelOption;
use crate::record::PartRecord;
use crate::search::Status;

// Base Response Structure
// ======================

/// Base response object for all API endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct BaseResponse<T> {
  /// Transaction ID for logging correlation
  pub transaction_id: Uuid,

  /// Optional error information
  #[serde(skip_serializing_if = "Vec::is_empty", default)]
  pub errors: Vec<ApiError>,

  /// Response data (generic for different endpoint types)
  #[serde(flatten)]
  pub data: T,
}

/// Placeholder payload for error responses
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Empty {}

impl<T> BaseResponse<T> {
  pub fn success(data: T, transaction_id: Uuid) -> Self {
    Self { transaction_id, errors: Vec::new(), data }
  }

  pub fn error(errors: Vec<ApiError>, transaction_id: Uuid) -> BaseResponse<Empty> {
    BaseResponse { transaction_id, errors, data: Empty {} }
  }
}

/// API error information
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
  /// Error key, unique to the error source
  pub key: String,

  /// Human readable error message
  pub message: String,
}

impl ApiError {
  pub fn new(key: &str, message: &str) -> Self {
    Self { key: key.to_string(), message: message.to_string() }
  }
}

// Status Endpoints
// ================

/// Response for /status
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
  pub status: String,
  pub version: String,
  pub snapshot: SnapshotInfo,
  pub primary: String,
  pub recommendations: String,
}

/// Which build of the table served the request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotInfo {
  pub version: u64,
  pub built_at: DateTime<Utc>,
  pub records: usize,
}

/// Response for /reload
#[derive(Debug, Serialize, Deserialize)]
pub struct ReloadResponse {
  pub snapshot: SnapshotInfo,
}

// Lookup Endpoints
// ================

/// Response for /categories
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoriesResponse {
  /// Selector entries, the "All" sentinel first unless a sheet owns that name
  pub categories: Vec<String>,
}

/// Query string for /models
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ModelsParams {
  pub category: Option<String>,
  #[serde(default)]
  pub keyword: String,
}

/// Response for /models
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelsResponse {
  /// Present only when no option matched
  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub status: Option<Status>,
  pub options: Vec<ModelOption>,
}

/// Query string for /parts/code/{code}
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CodeParams {
  #[serde(default)]
  pub contains: bool,
}

/// Query string for /parts/search
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TextParams {
  #[serde(default)]
  pub q: String,
}

/// Response for every /parts lookup
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
  pub status: Status,
  pub count: usize,
  pub rows: Vec<PartRecord>,
  pub snapshot_version: u64,
}
