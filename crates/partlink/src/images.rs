//! Image lookup for parts and products.
//!
//! Images live on disk under the images directory:
//! `<images>/<code>.png`, `<images>/spare/<code>.png` for spare parts and
//! `<images>/product/<name>.png` for products, where `<name>` is the model
//! (raw or sanitized) or the sanitized product name. Each lookup walks an
//! ordered list of probes and the first hit wins.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::record::{is_blank, PartRecord};

const IMAGE_EXTENSION: &str = "png";

/// Replace every non-alphanumeric character with `_`.
pub fn sanitize_file_stem(name: &str) -> String {
  name.chars().map(|c| if c.is_alphanumeric() { c } else { '_' }).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ImageSource {
  /// An image file found on disk
  File(PathBuf),
  /// A path or URL stored on the record itself
  Reference(String),
}

impl ImageSource {
  pub fn display(&self) -> String {
    match self {
      ImageSource::File(path) => path.display().to_string(),
      ImageSource::Reference(reference) => reference.clone(),
    }
  }
}

/// A single lookup strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
  /// `<dir>/<spare part code>.png`
  CodeFile(PathBuf),
  /// `<dir>/<model>.png`
  ModelFile(PathBuf),
  /// `<dir>/<sanitized model>.png`
  SanitizedModelFile(PathBuf),
  /// `<dir>/<sanitized product name>.png`
  SanitizedProductFile(PathBuf),
  /// The record's Spare Image field
  SpareImageField,
  /// The record's Product Image field
  ProductImageField,
}

impl Probe {
  pub fn probe(&self, record: &PartRecord) -> Option<ImageSource> {
    match self {
      Probe::CodeFile(dir) => existing_file(dir, &record.spare_part_code),
      Probe::ModelFile(dir) => existing_file(dir, &record.model),
      Probe::SanitizedModelFile(dir) => existing_file(dir, &sanitize_file_stem(record.model.trim())),
      Probe::SanitizedProductFile(dir) => existing_file(dir, &sanitize_file_stem(record.product_name.trim())),
      Probe::SpareImageField => field_reference(&record.spare_image),
      Probe::ProductImageField => field_reference(&record.product_image),
    }
  }
}

/// Only a plain file name inside `dir` is tried; a stem carrying a path
/// separator is never joined.
fn existing_file(dir: &Path, stem: &str) -> Option<ImageSource> {
  let stem = stem.trim();
  if stem.is_empty() || stem.chars().any(|c| c == '/' || c == '\\' || std::path::is_separator(c)) {
    return None;
  }
  let path = dir.join(format!("{stem}.{IMAGE_EXTENSION}"));
  path.is_file().then_some(ImageSource::File(path))
}

fn field_reference(value: &str) -> Option<ImageSource> {
  (!is_blank(value)).then(|| ImageSource::Reference(value.trim().to_string()))
}

/// Ordered probe chains for spare-part and product images
#[derive(Debug, Clone)]
pub struct ImageLookup {
  spare: Vec<Probe>,
  product: Vec<Probe>,
}

impl ImageLookup {
  pub fn new(images_dir: &Path) -> Self {
    let spare_dir = images_dir.join("spare");
    let product_dir = images_dir.join("product");
    Self {
      spare: vec![
        Probe::CodeFile(images_dir.to_path_buf()),
        Probe::CodeFile(spare_dir),
        Probe::SpareImageField,
        Probe::ProductImageField,
      ],
      product: vec![
        Probe::ModelFile(product_dir.clone()),
        Probe::SanitizedModelFile(product_dir.clone()),
        Probe::SanitizedProductFile(product_dir),
        Probe::ProductImageField,
      ],
    }
  }

  pub fn spare_image(&self, record: &PartRecord) -> Option<ImageSource> {
    first_hit(&self.spare, record)
  }

  pub fn product_image(&self, record: &PartRecord) -> Option<ImageSource> {
    first_hit(&self.product, record)
  }
}

fn first_hit(probes: &[Probe], record: &PartRecord) -> Option<ImageSource> {
  probes.iter().find_map(|probe| probe.probe(record))
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;
  use tempfile::TempDir;

  fn record(code: &str, model: &str, product: &str) -> PartRecord {
    PartRecord {
      spare_part_code: code.into(),
      model: model.into(),
      product_name: product.into(),
      ..Default::default()
    }
  }

  #[test]
  fn test_sanitize_file_stem() {
    assert_eq!(sanitize_file_stem("X70 Pro/2"), "X70_Pro_2");
    assert_eq!(sanitize_file_stem("KD236-1179"), "KD236_1179");
  }

  #[test]
  fn test_spare_image_prefers_root_then_spare_dir() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("spare")).unwrap();
    fs::write(temp.path().join("spare").join("P1.png"), b"png").unwrap();

    let lookup = ImageLookup::new(temp.path());
    let rec = record("P1", "", "");
    assert_eq!(lookup.spare_image(&rec), Some(ImageSource::File(temp.path().join("spare/P1.png"))));

    fs::write(temp.path().join("P1.png"), b"png").unwrap();
    assert_eq!(lookup.spare_image(&rec), Some(ImageSource::File(temp.path().join("P1.png"))));
  }

  #[test]
  fn test_spare_image_falls_back_to_record_fields() {
    let temp = TempDir::new().unwrap();
    let lookup = ImageLookup::new(temp.path());

    let mut rec = record("P9", "", "");
    assert_eq!(lookup.spare_image(&rec), None);

    rec.product_image = "https://cdn.example/prod.png".into();
    assert_eq!(lookup.spare_image(&rec), Some(ImageSource::Reference("https://cdn.example/prod.png".into())));

    rec.spare_image = " img/spare.png ".into();
    assert_eq!(lookup.spare_image(&rec), Some(ImageSource::Reference("img/spare.png".into())));
  }

  #[test]
  fn test_codes_with_separators_stay_inside_images_dir() {
    let temp = TempDir::new().unwrap();
    let images = temp.path().join("images");
    fs::create_dir_all(images.join("spare")).unwrap();
    fs::write(temp.path().join("secret.png"), b"png").unwrap();

    let lookup = ImageLookup::new(&images);
    for code in ["../secret", "..\\secret", "spare/../../secret"] {
      assert_eq!(lookup.spare_image(&record(code, "", "")), None, "{code}");
    }

    // the raw model lookup is skipped too; the sanitized one still applies
    let product_dir = images.join("product");
    fs::create_dir_all(&product_dir).unwrap();
    fs::write(product_dir.join("___secret.png"), b"png").unwrap();
    let rec = record("P1", "../secret", "");
    assert_eq!(lookup.product_image(&rec), Some(ImageSource::File(product_dir.join("___secret.png"))));
  }

  #[test]
  fn test_product_image_uses_sanitized_names() {
    let temp = TempDir::new().unwrap();
    let product_dir = temp.path().join("product");
    fs::create_dir_all(&product_dir).unwrap();
    fs::write(product_dir.join("Rain_Shower.png"), b"png").unwrap();

    let lookup = ImageLookup::new(temp.path());
    let rec = record("P1", "X/70", "Rain Shower");
    assert_eq!(lookup.product_image(&rec), Some(ImageSource::File(product_dir.join("Rain_Shower.png"))));

    fs::write(product_dir.join("X_70.png"), b"png").unwrap();
    assert_eq!(lookup.product_image(&rec), Some(ImageSource::File(product_dir.join("X_70.png"))));
  }
}
