//! Schema normalization for the primary spare-parts sheets.
//!
//! Each sheet goes through the same steps, in order:
//! 1. drop rows that are blank in every column
//! 2. drop columns with a blank header
//! 3. drop repeated headers, keeping the first occurrence
//! 4. rename known header variants to the canonical schema
//! 5. drop repeats again (two variants may collapse to one name)
//! 6. forward-fill Model and Product Name down the sheet
//! 7. tag every row with the sheet name as its Category

use tracing::debug;

use crate::record::{fields, is_blank, Table};
use crate::workbook::RawSheet;

/// Every known spelling of a primary-sheet header and its canonical name.
/// Canonical names never appear on the left, which keeps renaming idempotent.
pub const PRIMARY_RENAMES: &[(&str, &str)] = &[
  ("Spare part code", fields::SPARE_PART_CODE),
  ("Spare part code ", fields::SPARE_PART_CODE),
  ("Spare Part code", fields::SPARE_PART_CODE),
  ("Spare part Code", fields::SPARE_PART_CODE),
  ("Description", fields::DESCRIPTION_EN),
  ("Description（Thai）", fields::DESCRIPTION_TH),
  ("Description(Thai)", fields::DESCRIPTION_TH),
  ("Description （Thai）", fields::DESCRIPTION_TH),
  ("Description（Chinese）", fields::DESCRIPTION_CN),
  ("Description(Chinese)", fields::DESCRIPTION_CN),
  ("Description （Chinese）", fields::DESCRIPTION_CN),
  ("Picture（Product）", fields::PRODUCT_IMAGE),
  ("Picture( Product )", fields::PRODUCT_IMAGE),
  ("Picture （Product）", fields::PRODUCT_IMAGE),
  ("Picture\n（Spare part）", fields::SPARE_IMAGE),
  ("Picture( Spare part )", fields::SPARE_IMAGE),
  ("Picture （Spare part）", fields::SPARE_IMAGE),
  ("Waranty", fields::WARRANTY_TYPE),
  ("Warranty", fields::WARRANTY_TYPE),
  ("Unit Price\n(CNY)", fields::UNIT_PRICE),
  ("Spare parts quantity", fields::SPARE_PARTS_QTY),
];

/// Columns whose blanks inherit the last value seen above them
pub const FORWARD_FILL_COLUMNS: &[&str] = &[fields::MODEL, fields::PRODUCT_NAME];

/// Canonical name for a header, or the header itself when unmapped.
pub fn canonical_name<'a>(header: &'a str, renames: &[(&'a str, &'a str)]) -> &'a str {
  renames.iter().find(|(variant, _)| *variant == header).map(|(_, canonical)| *canonical).unwrap_or(header)
}

/// Rename every column through the given table.
pub fn rename_columns(table: &mut Table, renames: &[(&str, &str)]) {
  for column in &mut table.columns {
    if let Some((_, canonical)) = renames.iter().find(|(variant, _)| *variant == column.as_str()) {
      *column = canonical.to_string();
    }
  }
}

/// Drop rows that are blank in every cell.
pub fn drop_blank_rows(table: &mut Table) -> usize {
  let before = table.rows.len();
  table.rows.retain(|row| !row.iter().all(|c| is_blank(c)));
  before - table.rows.len()
}

/// Drop columns whose header is blank.
pub fn drop_unnamed_columns(table: &mut Table) -> usize {
  let keep: Vec<usize> = (0..table.columns.len()).filter(|&ix| !is_blank(&table.columns[ix])).collect();
  let dropped = table.columns.len() - keep.len();
  if dropped > 0 {
    table.select_columns(&keep);
  }
  dropped
}

/// Carry the last non-blank value of `column` down into blank cells below it.
pub fn forward_fill(table: &mut Table, column: &str) {
  let Some(ix) = table.column_index(column) else {
    return;
  };

  let mut last: Option<String> = None;
  for row in &mut table.rows {
    if is_blank(&row[ix]) {
      if let Some(value) = &last {
        row[ix] = value.clone();
      }
    } else {
      last = Some(row[ix].clone());
    }
  }
}

/// Put `Category = sheet name` in front of every row. A source column that
/// is itself called Category is replaced.
pub fn tag_category(table: &mut Table, sheet_name: &str) {
  if let Some(ix) = table.column_index(fields::CATEGORY) {
    let keep: Vec<usize> = (0..table.columns.len()).filter(|&i| i != ix).collect();
    table.select_columns(&keep);
  }

  table.columns.insert(0, fields::CATEGORY.to_string());
  for row in &mut table.rows {
    row.insert(0, sheet_name.to_string());
  }
}

/// Normalize one primary sheet. Returns `None` when no data rows survive.
pub fn normalize_sheet(sheet: &RawSheet) -> Option<Table> {
  let width = sheet.headers.len();
  let rows = sheet
    .rows
    .iter()
    .map(|r| {
      let mut r = r.clone();
      r.resize(width, String::new());
      r
    })
    .collect();
  let mut table = Table::new(sheet.headers.clone(), rows);

  let blank_rows = drop_blank_rows(&mut table);
  if table.is_empty() {
    debug!("Sheet '{}' has no data rows, skipping", sheet.name);
    return None;
  }

  let unnamed = drop_unnamed_columns(&mut table);
  table.drop_duplicate_columns();
  rename_columns(&mut table, PRIMARY_RENAMES);
  table.drop_duplicate_columns();

  for column in FORWARD_FILL_COLUMNS {
    forward_fill(&mut table, column);
  }

  tag_category(&mut table, &sheet.name);

  debug!(
    "Sheet '{}': {} rows kept, {} blank rows dropped, {} unnamed columns dropped",
    sheet.name,
    table.len(),
    blank_rows,
    unnamed
  );

  Some(table)
}
