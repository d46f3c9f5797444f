//! Search and filtering over the merged parts table.
//!
//! A search never fails. Every outcome carries a `Status` describing what
//! happened: an empty query is a prompt, no matches is a warning echoing the
//! query, matches are a success with the count. The table is only read;
//! result rows are copies.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::merge::MergedTable;
use crate::record::{fields, PartRecord};

/// Columns shown in list views of a result set
pub const SUMMARY_COLUMNS: &[&str] = &[
  fields::MODEL,
  fields::PRODUCT_NAME,
  fields::SPARE_PART_CODE,
  fields::DESCRIPTION_TH,
  fields::DESCRIPTION_EN,
  fields::SPARE_PARTS_QTY,
];

/// One search request. Modes are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "term", rename_all = "snake_case")]
pub enum Query {
  /// Case-insensitive equality on Spare Part Code
  ExactCode(String),
  /// Case-insensitive substring of Spare Part Code
  CodeContains(String),
  /// Exact (trimmed) Model, as picked from the model options
  Model(String),
  /// Case-insensitive substring of Model, Product Name or CN Product Name
  Text(String),
}

impl Query {
  pub fn term(&self) -> &str {
    match self {
      Query::ExactCode(t) | Query::CodeContains(t) | Query::Model(t) | Query::Text(t) => t.trim(),
    }
  }

  fn needs_code_column(&self) -> bool {
    matches!(self, Query::ExactCode(_) | Query::CodeContains(_))
  }

  fn prompt(&self) -> &'static str {
    match self {
      Query::ExactCode(_) | Query::CodeContains(_) => "Enter a spare part code to start searching",
      Query::Model(_) => "Select a model to list all of its spare parts",
      Query::Text(_) => "Enter a model or product name to start searching",
    }
  }

  fn no_match(&self, term: &str) -> String {
    match self {
      Query::ExactCode(_) | Query::CodeContains(_) => format!("No spare parts found for code: {term}"),
      Query::Model(_) => format!("No spare parts found for model: {term}"),
      Query::Text(_) => format!("No product or model matches: {term}"),
    }
  }

  fn found(&self, count: usize, term: &str) -> String {
    match self {
      Query::ExactCode(_) | Query::CodeContains(_) => format!("Found {count} item(s) for code: {term}"),
      Query::Model(_) => format!("Found {count} spare part(s) for model: {term}"),
      Query::Text(_) => format!("Found {count} spare part(s) for search: {term}"),
    }
  }

  /// Whether a record satisfies this query. `needle` is the trimmed,
  /// lowercased term (the Model mode compares the trimmed term as-is).
  fn matches(&self, record: &PartRecord, term: &str, needle: &str) -> bool {
    match self {
      Query::ExactCode(_) => record.spare_part_code.to_lowercase() == needle,
      Query::CodeContains(_) => record.spare_part_code.to_lowercase().contains(needle),
      Query::Model(_) => record.model.trim() == term,
      Query::Text(_) => text_matches(record, needle),
    }
  }
}

/// OR across Model, Product Name and CN Product Name
pub(crate) fn text_matches(record: &PartRecord, needle: &str) -> bool {
  [&record.model, &record.product_name, &record.recommendation.cn_product_name]
    .iter()
    .any(|value| value.to_lowercase().contains(needle))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
  Info,
  Success,
  Warning,
  Error,
}

impl fmt::Display for StatusKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let label = match self {
      StatusKind::Info => "info",
      StatusKind::Success => "success",
      StatusKind::Warning => "warning",
      StatusKind::Error => "error",
    };
    f.write_str(label)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
  pub kind: StatusKind,
  pub message: String,
}

impl Status {
  pub fn info(message: impl Into<String>) -> Self {
    Self { kind: StatusKind::Info, message: message.into() }
  }

  pub fn success(message: impl Into<String>) -> Self {
    Self { kind: StatusKind::Success, message: message.into() }
  }

  pub fn warning(message: impl Into<String>) -> Self {
    Self { kind: StatusKind::Warning, message: message.into() }
  }

  pub fn error(message: impl Into<String>) -> Self {
    Self { kind: StatusKind::Error, message: message.into() }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOutcome {
  pub status: Status,
  pub rows: Vec<PartRecord>,
}

impl SearchOutcome {
  fn empty(status: Status) -> Self {
    Self { status, rows: Vec::new() }
  }
}

/// Run a query against the table.
pub fn search(table: &MergedTable, query: &Query) -> SearchOutcome {
  let term = query.term();
  if term.is_empty() {
    return SearchOutcome::empty(Status::info(query.prompt()));
  }

  if query.needs_code_column() && !table.has_column(fields::SPARE_PART_CODE) {
    return SearchOutcome::empty(Status::error(format!("The table has no '{}' column", fields::SPARE_PART_CODE)));
  }

  let needle = term.to_lowercase();
  let mut rows: Vec<PartRecord> =
    table.records().iter().filter(|record| query.matches(record, term, &needle)).cloned().collect();

  if rows.is_empty() {
    return SearchOutcome::empty(Status::warning(query.no_match(term)));
  }

  if table.has_column(fields::MODEL) && table.has_column(fields::SPARE_PART_CODE) {
    sort_rows(&mut rows);
  }

  let status = Status::success(query.found(rows.len(), term));
  SearchOutcome { status, rows }
}

/// Stable ascending sort by (Model, Spare Part Code), case-sensitive.
pub fn sort_rows(rows: &mut [PartRecord]) {
  rows.sort_by(|a, b| a.model.cmp(&b.model).then_with(|| a.spare_part_code.cmp(&b.spare_part_code)));
}
