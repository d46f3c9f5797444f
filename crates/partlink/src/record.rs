//! Canonical schema and the record types built from it.
//!
//! `Table` is the loosely-shaped intermediate used while sheets are being
//! normalized and concatenated. Once the key column is confirmed, rows are
//! lifted into `PartRecord`, where every field defaults to an empty string
//! so downstream code only ever checks for emptiness.

use serde::{Deserialize, Serialize};

/// Canonical column names
pub mod fields {
  pub const CATEGORY: &str = "Category";
  pub const SPARE_PART_CODE: &str = "Spare Part Code";
  pub const MODEL: &str = "Model";
  pub const PRODUCT_NAME: &str = "Product Name";
  pub const DESCRIPTION_EN: &str = "Description (EN)";
  pub const DESCRIPTION_TH: &str = "Description (TH)";
  pub const DESCRIPTION_CN: &str = "Description (CN)";
  pub const WARRANTY_TYPE: &str = "Warranty Type";
  pub const WARRANTY_PERIOD: &str = "Warranty Period";
  pub const UNIT_PRICE: &str = "Unit Price (CNY)";
  pub const SPARE_PARTS_QTY: &str = "Spare Parts Qty";
  pub const PRODUCT_IMAGE: &str = "Product Image";
  pub const SPARE_IMAGE: &str = "Spare Image";
  pub const CN_PRODUCT_NAME: &str = "CN Product Name";
  pub const CN_SPARE_PART_NAME: &str = "CN Spare Part Name";
  pub const CN_RECOMMENDED_QTY: &str = "CN Recommended Qty";
  pub const REMARK: &str = "Remark";
}

/// Blank means empty once surrounding whitespace is ignored.
pub fn is_blank(value: &str) -> bool {
  value.trim().is_empty()
}

/// Column-labelled rows; every row has exactly `columns.len()` cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
  pub columns: Vec<String>,
  pub rows: Vec<Vec<String>>,
}

impl Table {
  pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
    Self { columns, rows }
  }

  pub fn column_index(&self, name: &str) -> Option<usize> {
    self.columns.iter().position(|c| c == name)
  }

  pub fn has_column(&self, name: &str) -> bool {
    self.column_index(name).is_some()
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }

  pub fn len(&self) -> usize {
    self.rows.len()
  }

  /// Cell for `row` under `column`, empty when the column is absent
  pub fn value<'a>(&'a self, row: &'a [String], column: &str) -> &'a str {
    self.column_index(column).and_then(|ix| row.get(ix)).map(String::as_str).unwrap_or("")
  }

  /// Values of one column, top to bottom
  pub fn column_values(&self, name: &str) -> Vec<&str> {
    match self.column_index(name) {
      Some(ix) => self.rows.iter().map(|r| r.get(ix).map(String::as_str).unwrap_or("")).collect(),
      None => Vec::new(),
    }
  }

  /// Keep the first column of every header, dropping later repeats.
  pub fn drop_duplicate_columns(&mut self) {
    let mut keep = Vec::with_capacity(self.columns.len());
    for (ix, name) in self.columns.iter().enumerate() {
      if !self.columns[..ix].contains(name) {
        keep.push(ix);
      }
    }
    if keep.len() == self.columns.len() {
      return;
    }
    self.select_columns(&keep);
  }

  /// Restrict the table to the given column positions, in that order.
  pub fn select_columns(&mut self, keep: &[usize]) {
    self.columns = keep.iter().map(|&ix| self.columns[ix].clone()).collect();
    for row in &mut self.rows {
      *row = keep.iter().map(|&ix| row.get(ix).cloned().unwrap_or_default()).collect();
    }
  }

  /// Append a blank column unless one with that name already exists.
  pub fn ensure_column(&mut self, name: &str) {
    if self.has_column(name) {
      return;
    }
    self.columns.push(name.to_string());
    for row in &mut self.rows {
      row.push(String::new());
    }
  }
}

/// Recommendation fields attached by the left join; empty when unmatched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
  pub cn_product_name: String,
  pub cn_spare_part_name: String,
  pub cn_recommended_qty: String,
  pub remark: String,
}

impl Recommendation {
  pub fn is_empty(&self) -> bool {
    is_blank(&self.cn_product_name)
      && is_blank(&self.cn_spare_part_name)
      && is_blank(&self.cn_recommended_qty)
      && is_blank(&self.remark)
  }
}

/// One row of the secondary dataset, keyed by (model, spare part code).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationRecord {
  pub model: String,
  pub spare_part_code: String,
  pub fields: Recommendation,
}

impl RecommendationRecord {
  pub fn key(&self) -> (&str, &str) {
    (&self.model, &self.spare_part_code)
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartRecord {
  pub category: String,
  pub spare_part_code: String,
  pub model: String,
  pub product_name: String,
  pub description_en: String,
  pub description_th: String,
  pub description_cn: String,
  pub warranty_type: String,
  pub warranty_period: String,
  pub unit_price: String,
  pub spare_parts_qty: String,
  pub product_image: String,
  pub spare_image: String,
  /// Columns outside the canonical schema, in source order
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub extra: Vec<(String, String)>,
  #[serde(default)]
  pub recommendation: Recommendation,
}

impl PartRecord {
  /// Lift one normalized row into a record. All values are trimmed.
  pub fn from_row(columns: &[String], row: &[String]) -> Self {
    let mut record = PartRecord::default();
    for (column, value) in columns.iter().zip(row.iter()) {
      let value = value.trim().to_string();
      match record.slot_mut(column) {
        Some(slot) => *slot = value,
        None => record.extra.push((column.clone(), value)),
      }
    }
    record
  }

  fn slot_mut(&mut self, column: &str) -> Option<&mut String> {
    let slot = match column {
      fields::CATEGORY => &mut self.category,
      fields::SPARE_PART_CODE => &mut self.spare_part_code,
      fields::MODEL => &mut self.model,
      fields::PRODUCT_NAME => &mut self.product_name,
      fields::DESCRIPTION_EN => &mut self.description_en,
      fields::DESCRIPTION_TH => &mut self.description_th,
      fields::DESCRIPTION_CN => &mut self.description_cn,
      fields::WARRANTY_TYPE => &mut self.warranty_type,
      fields::WARRANTY_PERIOD => &mut self.warranty_period,
      fields::UNIT_PRICE => &mut self.unit_price,
      fields::SPARE_PARTS_QTY => &mut self.spare_parts_qty,
      fields::PRODUCT_IMAGE => &mut self.product_image,
      fields::SPARE_IMAGE => &mut self.spare_image,
      _ => return None,
    };
    Some(slot)
  }

  /// Look a value up by column name. Absent columns read as blank.
  pub fn get(&self, column: &str) -> &str {
    match column {
      fields::CATEGORY => &self.category,
      fields::SPARE_PART_CODE => &self.spare_part_code,
      fields::MODEL => &self.model,
      fields::PRODUCT_NAME => &self.product_name,
      fields::DESCRIPTION_EN => &self.description_en,
      fields::DESCRIPTION_TH => &self.description_th,
      fields::DESCRIPTION_CN => &self.description_cn,
      fields::WARRANTY_TYPE => &self.warranty_type,
      fields::WARRANTY_PERIOD => &self.warranty_period,
      fields::UNIT_PRICE => &self.unit_price,
      fields::SPARE_PARTS_QTY => &self.spare_parts_qty,
      fields::PRODUCT_IMAGE => &self.product_image,
      fields::SPARE_IMAGE => &self.spare_image,
      fields::CN_PRODUCT_NAME => &self.recommendation.cn_product_name,
      fields::CN_SPARE_PART_NAME => &self.recommendation.cn_spare_part_name,
      fields::CN_RECOMMENDED_QTY => &self.recommendation.cn_recommended_qty,
      fields::REMARK => self.remark(),
      other => self.extra.iter().find(|(k, _)| k == other).map(|(_, v)| v.as_str()).unwrap_or(""),
    }
  }

  /// A remark on the primary sheet wins over the recommendation's remark.
  pub fn remark(&self) -> &str {
    match self.extra.iter().find(|(k, _)| k == fields::REMARK) {
      Some((_, v)) if !is_blank(v) => v,
      _ => &self.recommendation.remark,
    }
  }

  pub fn join_key(&self) -> (&str, &str) {
    (&self.model, &self.spare_part_code)
  }
}
