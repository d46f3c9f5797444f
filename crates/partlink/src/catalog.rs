//! Process-wide, read-only access to the merged table.
//!
//! The table is built once and published as an `Arc<Snapshot>`. Readers
//! take a clone of the `Arc` and keep using it for as long as they need;
//! a rebuild produces a whole new snapshot and swaps the shared reference
//! in one step, so no reader ever sees a half-built table.

use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::SystemTime;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::merge::{self, MergedTable};
use crate::workbook::{self, csv_files};

/// Read both sources and run the normalize/merge pipeline.
pub fn build_table(config: &Config) -> Result<MergedTable> {
  let primary = workbook::read_sheets(&config.primary)?;
  let recommendations = workbook::read_sheet(&config.recommendations, &config.recommendation_sheet)?;
  merge::build(&primary, &recommendations)
}

/// Modification times and sizes of every file feeding the table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFingerprint(Vec<(PathBuf, Option<SystemTime>, u64)>);

impl SourceFingerprint {
  pub fn of(config: &Config) -> Self {
    let mut entries = Vec::new();
    for source in [&config.primary, &config.recommendations] {
      for file in source_files(source) {
        let meta = fs::metadata(&file).ok();
        let modified = meta.as_ref().and_then(|m| m.modified().ok());
        let len = meta.map(|m| m.len()).unwrap_or(0);
        entries.push((file, modified, len));
      }
    }
    Self(entries)
  }
}

fn source_files(path: &Path) -> Vec<PathBuf> {
  if path.is_dir() {
    csv_files(path).unwrap_or_default()
  } else {
    vec![path.to_path_buf()]
  }
}

/// An immutable, versioned build of the merged table
#[derive(Debug)]
pub struct Snapshot {
  pub table: MergedTable,
  pub version: u64,
  pub built_at: DateTime<Utc>,
  fingerprint: SourceFingerprint,
}

impl Snapshot {
  pub fn fingerprint(&self) -> &SourceFingerprint {
    &self.fingerprint
  }
}

pub struct Catalog {
  config: Config,
  current: RwLock<Arc<Snapshot>>,
  rebuild: Mutex<()>,
  versions: AtomicU64,
  /// Sources as they were when the last rebuild failed
  last_failed: Mutex<Option<SourceFingerprint>>,
}

impl Catalog {
  /// Build the first snapshot. Any pipeline error is fatal here.
  pub fn open(config: Config) -> Result<Self> {
    let fingerprint = SourceFingerprint::of(&config);
    let table = build_table(&config)?;
    let first = Snapshot { table, version: 1, built_at: Utc::now(), fingerprint };
    info!("Catalog ready: {} records (version 1)", first.table.len());

    Ok(Self {
      config,
      current: RwLock::new(Arc::new(first)),
      rebuild: Mutex::new(()),
      versions: AtomicU64::new(1),
      last_failed: Mutex::new(None),
    })
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  /// The snapshot currently published
  pub fn snapshot(&self) -> Arc<Snapshot> {
    let guard = self.current.read().unwrap_or_else(|poisoned| poisoned.into_inner());
    Arc::clone(&guard)
  }

  /// Whether the sources changed since the current snapshot was built
  pub fn is_stale(&self) -> bool {
    SourceFingerprint::of(&self.config) != self.snapshot().fingerprint
  }

  /// Rebuild only if the sources changed. Returns the snapshot to read.
  ///
  /// Sources that already failed to build are not retried until they change
  /// again; the current snapshot keeps serving meanwhile.
  pub fn refresh_if_stale(&self) -> Result<Arc<Snapshot>> {
    let needed = |current: &Snapshot, sources: &SourceFingerprint| {
      *sources != current.fingerprint && !self.failed_on(sources)
    };

    let current = self.snapshot();
    if !needed(&current, &SourceFingerprint::of(&self.config)) {
      return Ok(current);
    }
    self.rebuild_with(needed)
  }

  /// Rebuild unconditionally.
  pub fn reload(&self) -> Result<Arc<Snapshot>> {
    self.rebuild_with(|_, _| true)
  }

  fn failed_on(&self, sources: &SourceFingerprint) -> bool {
    let last_failed = self.last_failed.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    last_failed.as_ref() == Some(sources)
  }

  fn record_failure(&self, sources: Option<SourceFingerprint>) {
    *self.last_failed.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = sources;
  }

  /// One rebuild at a time; readers keep the old snapshot until the swap.
  /// On failure the current snapshot stays published.
  fn rebuild_with(&self, still_needed: impl Fn(&Snapshot, &SourceFingerprint) -> bool) -> Result<Arc<Snapshot>> {
    let _rebuilding = self.rebuild.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

    let current = self.snapshot();
    let fingerprint = SourceFingerprint::of(&self.config);
    if !still_needed(&current, &fingerprint) {
      debug!("Snapshot {} already current, skipping rebuild", current.version);
      return Ok(current);
    }

    let table = match build_table(&self.config) {
      Ok(table) => table,
      Err(e) => {
        warn!("Rebuild failed, keeping snapshot {}: {e}", current.version);
        self.record_failure(Some(fingerprint));
        return Err(e);
      }
    };
    self.record_failure(None);

    let version = self.versions.fetch_add(1, Ordering::SeqCst) + 1;
    let next = Arc::new(Snapshot { table, version, built_at: Utc::now(), fingerprint });

    {
      let mut slot = self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner());
      *slot = Arc::clone(&next);
    }

    info!("Catalog rebuilt: {} records (version {})", next.table.len(), version);
    Ok(next)
  }
}
