//! Model picker support: the category list and the filtered model options.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use crate::merge::MergedTable;
use crate::search::{text_matches, Status};

/// Selector entry standing for every category. A sheet that is itself
/// named `All` shadows it; see `resolve_category`.
pub const ALL_CATEGORIES: &str = "All";

const LABEL_SEPARATOR: &str = " | ";

/// One entry of the model picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOption {
  pub label: String,
  pub model: String,
  pub product_name: String,
  pub category: String,
}

/// Filters applied to the model picker. Category AND keyword; the keyword
/// matches Model OR Product Name OR CN Product Name. No category (or a
/// blank one) means every category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionFilter {
  #[serde(default)]
  pub category: Option<String>,
  #[serde(default)]
  pub keyword: String,
}

impl OptionFilter {
  pub fn new(category: Option<&str>, keyword: &str) -> Self {
    Self { category: category.map(str::to_string), keyword: keyword.to_string() }
  }

  fn category(&self) -> Option<&str> {
    self.category.as_deref().map(str::trim).filter(|c| !c.is_empty())
  }
}

/// Turn a selector choice into a category filter. `All` means no filter,
/// unless the table has a category literally named `All`, which is then
/// selected like any other.
pub fn resolve_category(table: &MergedTable, picked: Option<&str>) -> Option<String> {
  let picked = picked.map(str::trim).filter(|c| !c.is_empty())?;
  if picked == ALL_CATEGORIES && !has_category(table, ALL_CATEGORIES) {
    return None;
  }
  Some(picked.to_string())
}

/// Selector entries: the `All` sentinel first, unless a real category
/// already carries that name, then the categories.
pub fn category_choices(table: &MergedTable) -> Vec<String> {
  let categories = categories(table);
  let sentinel = (!categories.iter().any(|c| c == ALL_CATEGORIES)).then(|| ALL_CATEGORIES.to_string());
  sentinel.into_iter().chain(categories).collect()
}

fn has_category(table: &MergedTable, name: &str) -> bool {
  table.records().iter().any(|r| r.category.trim() == name)
}

/// Distinct non-blank categories, sorted
pub fn categories(table: &MergedTable) -> Vec<String> {
  table
    .records()
    .iter()
    .map(|r| r.category.trim())
    .filter(|c| !c.is_empty())
    .collect::<BTreeSet<&str>>()
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// Build the deduplicated, label-sorted model options under `filter`.
pub fn build_model_options(table: &MergedTable, filter: &OptionFilter) -> Vec<ModelOption> {
  let category = filter.category();
  let needle = filter.keyword.trim().to_lowercase();

  let mut seen: HashSet<(&str, &str, &str)> = HashSet::new();
  let mut options = Vec::new();

  for record in table.records() {
    if category.is_some_and(|c| record.category != c) {
      continue;
    }
    if !needle.is_empty() && !text_matches(record, &needle) {
      continue;
    }

    let model = record.model.trim();
    let product_name = record.product_name.trim();
    let cat = record.category.trim();
    if model.is_empty() || !seen.insert((model, product_name, cat)) {
      continue;
    }

    let label = [cat, model, product_name].iter().filter(|p| !p.is_empty()).copied().collect::<Vec<_>>().join(LABEL_SEPARATOR);

    options.push(ModelOption {
      label,
      model: model.to_string(),
      product_name: product_name.to_string(),
      category: cat.to_string(),
    });
  }

  options.sort_by_cached_key(|o| o.label.to_lowercase());
  options
}

/// Status for an option list that came back empty, if it did
pub fn options_status(options: &[ModelOption]) -> Option<Status> {
  options
    .is_empty()
    .then(|| Status::info("No models match the selected filters; try another category or clear the keyword"))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::record::{fields, PartRecord};

  fn part(category: &str, model: &str, product: &str, code: &str) -> PartRecord {
    PartRecord {
      category: category.into(),
      model: model.into(),
      product_name: product.into(),
      spare_part_code: code.into(),
      ..Default::default()
    }
  }

  fn table(records: Vec<PartRecord>) -> MergedTable {
    MergedTable::new(vec![fields::CATEGORY.into(), fields::MODEL.into(), fields::SPARE_PART_CODE.into()], records)
  }

  fn sample() -> MergedTable {
    table(vec![
      part("Shower", "X70", "Rain Shower", "P1"),
      part("Shower", "X70", "Rain Shower", "P2"),
      part("Toilet", "ts3", "Smart Toilet", "T1"),
      part("Toilet", "", "Orphan", "T2"),
      part("Basin", "B9", "", "B1"),
    ])
  }

  #[test]
  fn test_options_are_deduplicated_and_sorted_by_label() {
    let options = build_model_options(&sample(), &OptionFilter::default());
    let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
    assert_eq!(labels, vec!["Basin | B9", "Shower | X70 | Rain Shower", "Toilet | ts3 | Smart Toilet"]);
  }

  #[test]
  fn test_category_and_keyword_combine_with_and() {
    let t = sample();

    let shower_x = build_model_options(&t, &OptionFilter::new(Some("Shower"), "x70"));
    assert_eq!(shower_x.len(), 1);

    let toilet_x = build_model_options(&t, &OptionFilter::new(Some("Toilet"), "x70"));
    assert!(toilet_x.is_empty());
    assert!(options_status(&toilet_x).is_some());
  }

  #[test]
  fn test_keyword_ors_product_name() {
    let options = build_model_options(&sample(), &OptionFilter::new(None, "SMART"));
    assert_eq!(options.len(), 1);
    assert_eq!(options[0].model, "ts3");
  }

  #[test]
  fn test_all_category_disables_filter() {
    let t = sample();
    let category = resolve_category(&t, Some(ALL_CATEGORIES));
    assert_eq!(category, None);
    let options = build_model_options(&t, &OptionFilter { category, keyword: String::new() });
    assert_eq!(options.len(), 3);
    assert_eq!(category_choices(&t), vec!["All", "Basin", "Shower", "Toilet"]);
  }

  #[test]
  fn test_sheet_named_all_stays_selectable() {
    let t = table(vec![part("All", "A1", "Everything Kit", "K1"), part("Shower", "X70", "Rain Shower", "P1")]);

    let category = resolve_category(&t, Some("All"));
    assert_eq!(category.as_deref(), Some("All"));
    let options = build_model_options(&t, &OptionFilter { category, keyword: String::new() });
    assert_eq!(options.len(), 1);
    assert_eq!(options[0].model, "A1");

    // no sentinel in the selector; leaving the category out lists everything
    assert_eq!(category_choices(&t), vec!["All", "Shower"]);
    assert_eq!(build_model_options(&t, &OptionFilter::default()).len(), 2);
  }

  #[test]
  fn test_categories_sorted_distinct() {
    assert_eq!(categories(&sample()), vec!["Basin", "Shower", "Toilet"]);
  }
}
