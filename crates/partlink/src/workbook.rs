//! Raw sheet reading for spreadsheet workbooks and csv exports.
//!
//! A source is one of:
//! - a workbook (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`); every worksheet
//!   becomes a `RawSheet`, in workbook order
//! - a single `.csv` file, read as one sheet named after the file stem
//! - a directory of `.csv` files, one sheet per file, sorted by file name

use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{PartsError, Result};
use crate::record::is_blank;

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// A sheet exactly as read: header row plus ragged data rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSheet {
  pub name: String,
  pub headers: Vec<String>,
  pub rows: Vec<Vec<String>>,
}

impl RawSheet {
  /// Build a sheet from its grid. The first row holding any non-blank cell
  /// becomes the header; rows above it are discarded.
  pub fn from_grid(name: &str, grid: Vec<Vec<String>>) -> Self {
    let mut rows = grid.into_iter().skip_while(|row| row.iter().all(|c| is_blank(c)));
    let headers = rows.next().unwrap_or_default();
    let rows: Vec<Vec<String>> = rows.collect();

    let width = rows.iter().map(Vec::len).chain(std::iter::once(headers.len())).max().unwrap_or(0);
    let pad = |mut row: Vec<String>| {
      row.resize(width, String::new());
      row
    };

    Self { name: name.to_string(), headers: pad(headers), rows: rows.into_iter().map(pad).collect() }
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceKind {
  Workbook,
  Csv,
  CsvDirectory,
}

fn source_kind(path: &Path) -> Result<SourceKind> {
  if !path.exists() {
    return Err(PartsError::SourceNotFound { path: path.to_path_buf() });
  }
  if path.is_dir() {
    return Ok(SourceKind::CsvDirectory);
  }

  let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("").to_lowercase();
  match ext.as_str() {
    "csv" => Ok(SourceKind::Csv),
    e if WORKBOOK_EXTENSIONS.contains(&e) => Ok(SourceKind::Workbook),
    _ => Err(PartsError::UnsupportedSource { path: path.to_path_buf() }),
  }
}

/// Read every sheet of a source, in source order.
pub fn read_sheets(path: &Path) -> Result<Vec<RawSheet>> {
  let sheets = match source_kind(path)? {
    SourceKind::Workbook => read_workbook(path)?,
    SourceKind::Csv => vec![read_csv(path)?],
    SourceKind::CsvDirectory => read_csv_directory(path)?,
  };
  debug!("Read {} sheet(s) from {}", sheets.len(), path.display());
  Ok(sheets)
}

/// Read a single named sheet. A lone csv file is its own sheet whatever
/// name is asked for; a workbook only converts the sheet asked for.
pub fn read_sheet(path: &Path, sheet: &str) -> Result<RawSheet> {
  match source_kind(path)? {
    SourceKind::Csv => read_csv(path),
    SourceKind::Workbook => {
      let mut workbook = open_workbook(path)?;
      if !workbook.sheet_names().iter().any(|name| name == sheet) {
        return Err(PartsError::SheetNotFound { path: path.to_path_buf(), sheet: sheet.to_string() });
      }
      let range = workbook.worksheet_range(sheet).map_err(|e| workbook_error(path, e))?;
      Ok(range_to_sheet(sheet, &range))
    }
    SourceKind::CsvDirectory => read_csv_directory(path)?
      .into_iter()
      .find(|s| s.name == sheet)
      .ok_or_else(|| PartsError::SheetNotFound { path: path.to_path_buf(), sheet: sheet.to_string() }),
  }
}

fn workbook_error(path: &Path, e: calamine::Error) -> PartsError {
  PartsError::Workbook { path: path.to_path_buf(), message: e.to_string() }
}

fn open_workbook(path: &Path) -> Result<Sheets<BufReader<File>>> {
  open_workbook_auto(path).map_err(|e| workbook_error(path, e))
}

fn range_to_sheet(name: &str, range: &Range<Data>) -> RawSheet {
  let grid = range.rows().map(|row| row.iter().map(cell_to_string).collect()).collect();
  RawSheet::from_grid(name, grid)
}

fn read_workbook(path: &Path) -> Result<Vec<RawSheet>> {
  let mut workbook = open_workbook(path)?;
  let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
  let mut sheets = Vec::with_capacity(sheet_names.len());

  for name in &sheet_names {
    match workbook.worksheet_range(name) {
      Ok(range) => sheets.push(range_to_sheet(name, &range)),
      Err(e) => warn!("Skipping sheet '{}' in {}: {}", name, path.display(), e),
    }
  }

  Ok(sheets)
}

/// Render a cell the way it reads in the spreadsheet.
fn cell_to_string(cell: &Data) -> String {
  match cell {
    Data::Empty => String::new(),
    Data::String(s) => s.clone(),
    Data::Int(i) => i.to_string(),
    Data::Float(f) => format_float(*f),
    Data::Bool(b) => b.to_string(),
    Data::DateTime(dt) => dt.as_datetime().map(|d| d.to_string()).unwrap_or_else(|| format_float(dt.as_f64())),
    Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    Data::Error(_) => String::new(),
  }
}

/// Whole numbers drop the trailing `.0` so numeric codes stay readable.
fn format_float(f: f64) -> String {
  if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
    format!("{}", f as i64)
  } else {
    format!("{f}")
  }
}

fn read_csv(path: &Path) -> Result<RawSheet> {
  let mut reader = csv::ReaderBuilder::new().has_headers(false).flexible(true).from_path(path)?;

  let mut grid = Vec::new();
  for record in reader.records() {
    let record = record?;
    grid.push(record.iter().map(|f| f.to_string()).collect::<Vec<String>>());
  }

  if let Some(first) = grid.first_mut().and_then(|row| row.first_mut()) {
    if let Some(stripped) = first.strip_prefix('\u{feff}') {
      *first = stripped.to_string();
    }
  }

  let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("Sheet1");
  Ok(RawSheet::from_grid(name, grid))
}

fn read_csv_directory(dir: &Path) -> Result<Vec<RawSheet>> {
  csv_files(dir)?.iter().map(|path| read_csv(path)).collect()
}

/// The csv files of a directory, sorted by name
pub fn csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
  let mut files = Vec::new();
  for entry in fs::read_dir(dir)? {
    let path = entry?.path();
    if path.is_file() && path.extension().and_then(|s| s.to_str()).map(|e| e.eq_ignore_ascii_case("csv")).unwrap_or(false)
    {
      files.push(path);
    }
  }
  files.sort();
  Ok(files)
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|s| s.to_string()).collect()
  }

  #[test]
  fn test_from_grid_skips_leading_blank_rows() {
    let grid = vec![row(&["", " "]), row(&["Model", "Spare part code"]), row(&["X70", "P1", "extra"])];
    let sheet = RawSheet::from_grid("Pump", grid);

    assert_eq!(sheet.headers, row(&["Model", "Spare part code", ""]));
    assert_eq!(sheet.rows, vec![row(&["X70", "P1", "extra"])]);
  }

  #[test]
  fn test_from_grid_empty() {
    let sheet = RawSheet::from_grid("Empty", Vec::new());
    assert!(sheet.headers.is_empty());
    assert!(sheet.is_empty());
  }

  #[test]
  fn test_cell_to_string_per_cell_type() {
    assert_eq!(cell_to_string(&Data::Empty), "");
    assert_eq!(cell_to_string(&Data::String("Rain Shower".into())), "Rain Shower");
    assert_eq!(cell_to_string(&Data::Int(42)), "42");
    assert_eq!(cell_to_string(&Data::Float(12345.0)), "12345");
    assert_eq!(cell_to_string(&Data::Float(0.25)), "0.25");
    assert_eq!(cell_to_string(&Data::Bool(true)), "true");
    assert_eq!(cell_to_string(&Data::Error(calamine::CellErrorType::Div0)), "");
  }

  #[test]
  fn test_format_float_drops_integral_fraction() {
    assert_eq!(format_float(12345.0), "12345");
    assert_eq!(format_float(12.5), "12.5");
  }

  #[test]
  fn test_read_csv_directory_in_name_order() -> Result<()> {
    let temp = TempDir::new()?;
    fs::write(temp.path().join("b_valve.csv"), "Model,Spare part code\nV1,C2\n")?;
    fs::write(temp.path().join("a_pump.csv"), "\u{feff}Model,Spare part code\nX70,P1\n")?;
    fs::write(temp.path().join("notes.txt"), "ignored")?;

    let sheets = read_sheets(temp.path())?;
    let names: Vec<&str> = sheets.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["a_pump", "b_valve"]);
    assert_eq!(sheets[0].headers[0], "Model");
    Ok(())
  }

  #[test]
  fn test_missing_source_is_fatal() {
    let err = read_sheets(Path::new("/definitely/not/here.xlsx")).unwrap_err();
    assert!(matches!(err, PartsError::SourceNotFound { .. }));
  }

  #[test]
  fn test_unsupported_extension() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("parts.txt");
    fs::write(&path, "nothing")?;
    assert!(matches!(read_sheets(&path), Err(PartsError::UnsupportedSource { .. })));
    Ok(())
  }

  #[test]
  fn test_read_sheet_missing_name_in_directory() -> Result<()> {
    let temp = TempDir::new()?;
    fs::write(temp.path().join("Sheet2.csv"), "Model\nX\n")?;
    let err = read_sheet(temp.path(), "Sheet1").unwrap_err();
    assert!(matches!(err, PartsError::SheetNotFound { .. }));
    Ok(())
  }
}
