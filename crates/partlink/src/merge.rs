//! Concatenation of normalized sheets and the recommendation left join.

use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::error::{PartsError, Result};
use crate::normalize::{drop_blank_rows, drop_unnamed_columns, normalize_sheet, rename_columns};
use crate::record::{fields, is_blank, PartRecord, Recommendation, RecommendationRecord, Table};
use crate::workbook::RawSheet;

/// Header variants used by the recommendation workbook
pub const RECOMMENDATION_RENAMES: &[(&str, &str)] = &[
  ("Product name", fields::CN_PRODUCT_NAME),
  ("Spare part number", fields::SPARE_PART_CODE),
  ("Spare part name", fields::CN_SPARE_PART_NAME),
  ("Recommended Quantity", fields::CN_RECOMMENDED_QTY),
];

/// The only recommendation columns that survive normalization
pub const RECOMMENDATION_COLUMNS: &[&str] = &[
  fields::MODEL,
  fields::SPARE_PART_CODE,
  fields::CN_PRODUCT_NAME,
  fields::CN_SPARE_PART_NAME,
  fields::CN_RECOMMENDED_QTY,
  fields::REMARK,
];

/// The denormalized parts table. Read-only once built.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MergedTable {
  columns: Vec<String>,
  records: Vec<PartRecord>,
}

impl MergedTable {
  pub fn new(columns: Vec<String>, records: Vec<PartRecord>) -> Self {
    Self { columns, records }
  }

  pub fn columns(&self) -> &[String] {
    &self.columns
  }

  pub fn records(&self) -> &[PartRecord] {
    &self.records
  }

  pub fn has_column(&self, name: &str) -> bool {
    self.columns.iter().any(|c| c == name)
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }
}

/// Normalized recommendation rows plus the columns the source carried
#[derive(Debug, Clone, Default)]
pub struct Recommendations {
  pub columns: Vec<String>,
  pub records: Vec<RecommendationRecord>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinStats {
  pub matched: usize,
  pub unmatched: usize,
  pub duplicate_keys: usize,
}

/// Stack tables vertically. Columns are the union in first-seen order;
/// rows keep their table order and are padded with blanks.
pub fn concat_tables(tables: Vec<Table>) -> Table {
  let mut columns: Vec<String> = Vec::new();
  for table in &tables {
    for column in &table.columns {
      if !columns.contains(column) {
        columns.push(column.clone());
      }
    }
  }

  let mut rows = Vec::with_capacity(tables.iter().map(Table::len).sum());
  for table in tables {
    let positions: Vec<Option<usize>> = columns.iter().map(|c| table.column_index(c)).collect();
    for row in table.rows {
      rows.push(positions.iter().map(|p| p.and_then(|ix| row.get(ix).cloned()).unwrap_or_default()).collect());
    }
  }

  Table::new(columns, rows)
}

/// Normalize and concatenate every primary sheet.
pub fn normalize_primary(sheets: &[RawSheet]) -> Result<Table> {
  let tables: Vec<Table> = sheets.iter().filter_map(normalize_sheet).collect();
  if tables.is_empty() {
    return Err(PartsError::NoData);
  }

  let mut table = concat_tables(tables);
  table.drop_duplicate_columns();

  if !table.has_column(fields::SPARE_PART_CODE) {
    return Err(PartsError::MissingKeyField { field: fields::SPARE_PART_CODE.to_string() });
  }

  table.ensure_column(fields::MODEL);
  table.ensure_column(fields::PRODUCT_NAME);
  Ok(table)
}

/// Rename, restrict to the allowlist and trim the join keys. Both key
/// columns must be present. Rows without a spare part code cannot be linked
/// and are skipped.
pub fn normalize_recommendations(sheet: &RawSheet) -> Result<Recommendations> {
  let mut table = Table::new(sheet.headers.clone(), sheet.rows.clone());
  drop_blank_rows(&mut table);
  drop_unnamed_columns(&mut table);
  table.drop_duplicate_columns();
  rename_columns(&mut table, RECOMMENDATION_RENAMES);
  table.drop_duplicate_columns();

  let keep: Vec<usize> = RECOMMENDATION_COLUMNS.iter().filter_map(|c| table.column_index(c)).collect();
  table.select_columns(&keep);

  if let Some(missing) = [fields::MODEL, fields::SPARE_PART_CODE].into_iter().find(|key| !table.has_column(key)) {
    return Err(PartsError::MissingRecommendationKey { sheet: sheet.name.clone(), field: missing.to_string() });
  }

  let records = table
    .rows
    .iter()
    .filter(|row| !is_blank(table.value(row, fields::SPARE_PART_CODE)))
    .map(|row| RecommendationRecord {
      model: table.value(row, fields::MODEL).trim().to_string(),
      spare_part_code: table.value(row, fields::SPARE_PART_CODE).trim().to_string(),
      fields: Recommendation {
        cn_product_name: table.value(row, fields::CN_PRODUCT_NAME).trim().to_string(),
        cn_spare_part_name: table.value(row, fields::CN_SPARE_PART_NAME).trim().to_string(),
        cn_recommended_qty: table.value(row, fields::CN_RECOMMENDED_QTY).trim().to_string(),
        remark: table.value(row, fields::REMARK).trim().to_string(),
      },
    })
    .collect();

  Ok(Recommendations { columns: table.columns, records })
}

/// Left outer join on (Model, Spare Part Code). Every part is kept, in
/// order; a duplicated recommendation key resolves to its first occurrence.
pub fn left_join(parts: Vec<PartRecord>, recommendations: &[RecommendationRecord]) -> (Vec<PartRecord>, JoinStats) {
  let mut stats = JoinStats::default();
  let mut by_key: HashMap<(&str, &str), &Recommendation> = HashMap::with_capacity(recommendations.len());

  for rec in recommendations {
    if by_key.contains_key(&rec.key()) {
      stats.duplicate_keys += 1;
      debug!("Duplicate recommendation key ({}, {}) ignored", rec.model, rec.spare_part_code);
      continue;
    }
    by_key.insert(rec.key(), &rec.fields);
  }

  let joined = parts
    .into_iter()
    .map(|mut part| {
      let found = by_key.get(&part.join_key()).map(|fields| (*fields).clone());
      match found {
        Some(fields) => {
          part.recommendation = fields;
          stats.matched += 1;
        }
        None => stats.unmatched += 1,
      }
      part
    })
    .collect();

  (joined, stats)
}

/// Run the whole pipeline over already-read sheets.
pub fn build(primary: &[RawSheet], recommendations: &RawSheet) -> Result<MergedTable> {
  let table = normalize_primary(primary)?;
  let parts: Vec<PartRecord> = table
    .rows
    .iter()
    .map(|row| PartRecord::from_row(&table.columns, row))
    .filter(|record| !is_record_blank(record))
    .collect();

  if parts.is_empty() {
    return Err(PartsError::NoData);
  }

  let recs = normalize_recommendations(recommendations)?;
  let (records, stats) = left_join(parts, &recs.records);

  let mut columns = table.columns;
  for column in recs.columns {
    if column != fields::MODEL && column != fields::SPARE_PART_CODE && !columns.contains(&column) {
      columns.push(column);
    }
  }

  info!(
    "Merged {} part records from {} sheet(s): {} linked to recommendations, {} unlinked",
    records.len(),
    primary.len(),
    stats.matched,
    stats.unmatched
  );

  Ok(MergedTable::new(columns, records))
}

/// A record carrying nothing but its category tag
fn is_record_blank(record: &PartRecord) -> bool {
  [
    &record.spare_part_code,
    &record.model,
    &record.product_name,
    &record.description_en,
    &record.description_th,
    &record.description_cn,
    &record.warranty_type,
    &record.warranty_period,
    &record.unit_price,
    &record.spare_parts_qty,
    &record.product_image,
    &record.spare_image,
  ]
  .iter()
  .all(|v| is_blank(v))
    && record.extra.iter().all(|(_, v)| is_blank(v))
}
