//! Configuration management for partlink
//!
//! Names the two source spreadsheets, the recommendation sheet and the
//! images directory. Values come from, in increasing precedence: built-in
//! defaults, a JSON config file, `PARTLINK_*` environment variables, and
//! finally whatever the caller sets explicitly (CLI flags).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{PartsError, Result};

pub const ENV_PRIMARY: &str = "PARTLINK_PRIMARY";
pub const ENV_RECOMMENDATIONS: &str = "PARTLINK_RECOMMENDATIONS";
pub const ENV_RECOMMENDATION_SHEET: &str = "PARTLINK_RECOMMENDATION_SHEET";
pub const ENV_IMAGES_DIR: &str = "PARTLINK_IMAGES_DIR";

const CONFIG_PATHS: &[&str] = &[".partlink.json", "partlink.json", ".partlink/config.json"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
  /// Multi-sheet spare-parts workbook (or csv / directory of csv)
  #[serde(default = "default_primary")]
  pub primary: PathBuf,
  /// Recommendation workbook
  #[serde(default = "default_recommendations")]
  pub recommendations: PathBuf,
  /// Sheet of the recommendation workbook to read
  #[serde(default = "default_recommendation_sheet")]
  pub recommendation_sheet: String,
  /// Root of the `<code>.png`, `spare/` and `product/` image files
  #[serde(default = "default_images_dir")]
  pub images_dir: PathBuf,
}

fn default_primary() -> PathBuf {
  PathBuf::from("Spare parts list for TOA- Combine_DATA.xlsx")
}
fn default_recommendations() -> PathBuf {
  PathBuf::from("TOA main spare parts recommendation DATA.xlsx")
}
fn default_recommendation_sheet() -> String {
  "Sheet1".to_string()
}
fn default_images_dir() -> PathBuf {
  PathBuf::from("images")
}

impl Default for Config {
  fn default() -> Self {
    Self {
      primary: default_primary(),
      recommendations: default_recommendations(),
      recommendation_sheet: default_recommendation_sheet(),
      images_dir: default_images_dir(),
    }
  }
}

impl Config {
  /// Load configuration from a file. Relative paths inside it resolve
  /// against the file's own directory.
  pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| PartsError::Config {
      message: format!("cannot read {}: {e}", path.display()),
    })?;
    let mut config: Config = serde_json::from_str(&content)?;

    if let Some(base) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      config.resolve_relative_to(base);
    }

    debug!("Loaded configuration from {}", path.display());
    Ok(config)
  }

  /// Load from the first config file found in the working directory, then
  /// `~/.partlink/config.json`, falling back to defaults. Environment
  /// overrides are applied on top.
  pub fn load() -> Result<Self> {
    let home_config = dirs::home_dir().map(|home| home.join(".partlink").join("config.json"));
    let found = CONFIG_PATHS.iter().map(PathBuf::from).chain(home_config).find(|p| p.exists());

    let config = match found {
      Some(path) => Self::load_from_file(path)?,
      None => Config::default(),
    };
    Ok(config.with_env_overrides())
  }

  /// Apply `PARTLINK_*` environment variables.
  pub fn with_env_overrides(mut self) -> Self {
    if let Ok(primary) = std::env::var(ENV_PRIMARY) {
      self.primary = PathBuf::from(primary);
    }
    if let Ok(recommendations) = std::env::var(ENV_RECOMMENDATIONS) {
      self.recommendations = PathBuf::from(recommendations);
    }
    if let Ok(sheet) = std::env::var(ENV_RECOMMENDATION_SHEET) {
      self.recommendation_sheet = sheet;
    }
    if let Ok(images) = std::env::var(ENV_IMAGES_DIR) {
      self.images_dir = PathBuf::from(images);
    }
    self
  }

  fn resolve_relative_to(&mut self, base: &Path) {
    for path in [&mut self.primary, &mut self.recommendations, &mut self.images_dir] {
      if path.is_relative() {
        *path = base.join(&*path);
      }
    }
  }

  /// Save configuration to a file
  pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
    let content = serde_json::to_string_pretty(self)?;
    std::fs::write(path, content)?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;
  use std::fs;
  use tempfile::TempDir;

  #[test]
  fn test_defaults_match_deployment_files() {
    let config = Config::default();
    assert_eq!(config.recommendation_sheet, "Sheet1");
    assert_eq!(config.images_dir, PathBuf::from("images"));
    assert!(config.primary.to_string_lossy().ends_with("Combine_DATA.xlsx"));
  }

  #[test]
  fn test_partial_file_fills_defaults_and_resolves_paths() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("partlink.json");
    fs::write(&path, r#"{ "primary": "data/parts.xlsx" }"#)?;

    let config = Config::load_from_file(&path)?;
    assert_eq!(config.primary, temp.path().join("data/parts.xlsx"));
    assert_eq!(config.recommendations, temp.path().join("TOA main spare parts recommendation DATA.xlsx"));
    assert_eq!(config.recommendation_sheet, "Sheet1");
    Ok(())
  }

  #[test]
  fn test_save_and_reload() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("partlink.json");
    let config = Config {
      primary: PathBuf::from("/srv/parts.xlsx"),
      recommendations: PathBuf::from("/srv/recs.xlsx"),
      recommendation_sheet: "Data".to_string(),
      images_dir: PathBuf::from("/srv/images"),
    };
    config.save_to_file(&path)?;
    assert_eq!(Config::load_from_file(&path)?, config);
    Ok(())
  }

  #[test]
  fn test_invalid_json_is_an_error() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("partlink.json");
    fs::write(&path, "{ not json")?;
    assert!(matches!(Config::load_from_file(&path), Err(PartsError::Json(_))));
    Ok(())
  }

  #[test]
  #[serial]
  fn test_env_overrides() {
    std::env::set_var(ENV_PRIMARY, "/tmp/primary.csv");
    std::env::set_var(ENV_RECOMMENDATION_SHEET, "Recs");
    let config = Config::default().with_env_overrides();
    std::env::remove_var(ENV_PRIMARY);
    std::env::remove_var(ENV_RECOMMENDATION_SHEET);

    assert_eq!(config.primary, PathBuf::from("/tmp/primary.csv"));
    assert_eq!(config.recommendation_sheet, "Recs");
  }
}
