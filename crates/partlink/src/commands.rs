//! CLI command implementations over a built table

use partlink::display;
use partlink::images::ImageLookup;
use partlink::merge::MergedTable;
use partlink::options::{self, OptionFilter};
use partlink::record::PartRecord;
use partlink::search::{self, Query, SearchOutcome, Status, StatusKind};

/// How result rows are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
  Summary,
  Cards,
}

pub struct Lookup<'a> {
  pub table: &'a MergedTable,
  pub images: ImageLookup,
  pub view: View,
}

impl Lookup<'_> {
  pub fn run(&self, query: &Query) -> StatusKind {
    let outcome = search::search(self.table, query);
    self.show(&outcome);
    outcome.status.kind
  }

  fn show(&self, outcome: &SearchOutcome) {
    display::print_status(&outcome.status);
    if outcome.rows.is_empty() {
      return;
    }
    println!();
    match self.view {
      View::Summary => display::print_summary(&outcome.rows),
      View::Cards => {
        for row in &outcome.rows {
          display::print_card(row, &self.images);
        }
      }
    }
  }

  pub fn models(&self, category: Option<&str>, keyword: &str) -> StatusKind {
    let category = options::resolve_category(self.table, category);
    let filter = OptionFilter { category, keyword: keyword.to_string() };
    let found = options::build_model_options(self.table, &filter);
    match options::options_status(&found) {
      Some(status) => {
        display::print_status(&status);
        status.kind
      }
      None => {
        display::print_options(&found);
        StatusKind::Success
      }
    }
  }

  pub fn categories(&self) -> StatusKind {
    if options::categories(self.table).is_empty() {
      let status = Status::info("No categories in the merged table");
      display::print_status(&status);
      return status.kind;
    }
    for category in options::category_choices(self.table) {
      println!("{category}");
    }
    StatusKind::Success
  }

  /// Resolve both images for an exact code
  pub fn image(&self, code: &str) -> StatusKind {
    let outcome = search::search(self.table, &Query::ExactCode(code.to_string()));
    let Some(record) = outcome.rows.first() else {
      display::print_status(&outcome.status);
      return outcome.status.kind;
    };
    print_images(record, &self.images);
    StatusKind::Success
  }
}

fn print_images(record: &PartRecord, images: &ImageLookup) {
  let spare = images.spare_image(record).map(|s| s.display());
  let product = images.product_image(record).map(|s| s.display());
  println!("spare:   {}", spare.as_deref().unwrap_or("-"));
  println!("product: {}", product.as_deref().unwrap_or("-"));
}
