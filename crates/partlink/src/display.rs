//! Display formatting utilities for CLI output

use colored::*;

use crate::images::ImageLookup;
use crate::options::ModelOption;
use crate::record::{fields, is_blank, PartRecord};
use crate::search::{Status, StatusKind, SUMMARY_COLUMNS};

const CARD_WIDTH: usize = 60;

/// Format a colored prefix for status lines
fn format_prefix(color: Color, prefix: &str) -> String {
  format!("[{}]{:<width$}", prefix.color(color).bold(), "", width = 7 - prefix.len() - 2)
}

pub fn format_status(status: &Status) -> String {
  let prefix = match status.kind {
    StatusKind::Info => format_prefix(Color::Blue, "info"),
    StatusKind::Success => format_prefix(Color::Green, "sccs"),
    StatusKind::Warning => format_prefix(Color::Yellow, "warn"),
    StatusKind::Error => format_prefix(Color::Red, "error"),
  };
  format!("{prefix} {}", status.message)
}

pub fn print_status(status: &Status) {
  println!("{}", format_status(status));
}

/// Fixed-width summary list, one line per part
pub fn print_summary(rows: &[PartRecord]) {
  let widths: Vec<usize> = SUMMARY_COLUMNS
    .iter()
    .map(|column| rows.iter().map(|r| r.get(column).chars().count()).chain([column.chars().count()]).max().unwrap_or(0))
    .collect();

  let header: Vec<String> = SUMMARY_COLUMNS.iter().zip(&widths).map(|(c, w)| pad(c, *w)).collect();
  println!("{}", header.join("  ").bold());

  for row in rows {
    let cells: Vec<String> = SUMMARY_COLUMNS.iter().zip(&widths).map(|(c, w)| pad(row.get(c), *w)).collect();
    println!("{}", cells.join("  ").trim_end());
  }
}

fn pad(text: &str, width: usize) -> String {
  let len = text.chars().count();
  format!("{text}{}", " ".repeat(width.saturating_sub(len)))
}

/// Detail card for a single part
pub fn print_card(record: &PartRecord, images: &ImageLookup) {
  let title = if record.spare_part_code.is_empty() { "(no code)" } else { record.spare_part_code.as_str() };
  println!("=== {} ===", title.yellow().bold());

  let subheading: Vec<String> = [
    (!record.model.is_empty()).then(|| format!("Model: {}", record.model)),
    (!record.product_name.is_empty()).then(|| record.product_name.clone()),
  ]
  .into_iter()
  .flatten()
  .collect();
  if !subheading.is_empty() {
    println!("{}", subheading.join(" · ").dimmed());
  }

  section("Basic Info");
  field("Category", &record.category);
  field("Model", &record.model);
  field("Product Name", &record.product_name);
  field("Warranty Type", &record.warranty_type);
  field("Warranty Period", &record.warranty_period);
  field("Unit Price (CNY)", &record.unit_price);
  field("Spare Parts Qty (from list)", &record.spare_parts_qty);
  field("Remark", record.remark());

  let descriptions =
    [("Thai", &record.description_th), ("English", &record.description_en), ("Chinese", &record.description_cn)];
  if descriptions.iter().any(|(_, text)| !is_blank(text)) {
    section("Description");
    for (language, text) in descriptions {
      if !is_blank(text) {
        field(language, text);
      }
    }
  }

  section("China Recommendation");
  field(fields::CN_PRODUCT_NAME, &record.recommendation.cn_product_name);
  field(fields::CN_SPARE_PART_NAME, &record.recommendation.cn_spare_part_name);
  field(fields::CN_RECOMMENDED_QTY, &record.recommendation.cn_recommended_qty);

  section("Images");
  let product = images.product_image(record).map(|s| s.display());
  let spare = images.spare_image(record).map(|s| s.display());
  field("Product image", product.as_deref().unwrap_or("-"));
  field("Spare part image", spare.as_deref().unwrap_or("-"));
  println!();
}

fn section(title: &str) {
  println!("{}", "-".repeat(CARD_WIDTH).dimmed());
  println!("{}", title.bold());
}

fn field(label: &str, value: &str) {
  println!("  {} {}", format!("{label}:").cyan(), value);
}

/// Model picker entries, numbered
pub fn print_options(options: &[ModelOption]) {
  for (ix, option) in options.iter().enumerate() {
    println!("{:>4}. {}", ix + 1, option.label);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_format_status_carries_message() {
    colored::control::set_override(false);
    let line = format_status(&Status::warning("No spare parts found for code: XYZ"));
    assert_eq!(line, "[warn]  No spare parts found for code: XYZ");
  }

  #[test]
  fn test_pad_counts_characters_not_bytes() {
    assert_eq!(pad("阀芯", 4), "阀芯  ");
    assert_eq!(pad("toolong", 3), "toolong");
  }
}
