use std::fmt::Display;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

use crate::public::ViewCache;

static NEXT_OPTIONS_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of one set of compile options
///
/// Public views are cached per options identity, so two builds running side by
/// side never hand out each other's wrappers.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct OptionsId(u64);

impl OptionsId {
  fn next() -> Self {
    let id = OptionsId(NEXT_OPTIONS_ID.fetch_add(1, Ordering::Relaxed));
    ViewCache::global().register(id);
    id
  }
}

impl Default for OptionsId {
  fn default() -> Self {
    OptionsId::next()
  }
}

impl Display for OptionsId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// The options passed into Atlaspack either through the CLI or the programmatic API
///
/// Dropping the options tears down every public view created under them.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AtlaspackOptions {
  #[serde(skip)]
  id: OptionsId,

  /// Path to the atlaspack core node_module. This will be used to resolve built-ins or runtime files.
  #[serde(default)]
  pub core_path: PathBuf,

  #[serde(default)]
  pub log_level: LogLevel,

  #[serde(default)]
  pub mode: BuildMode,

  #[serde(default)]
  pub project_root: PathBuf,
}

impl AtlaspackOptions {
  pub fn id(&self) -> OptionsId {
    self.id
  }
}

impl Drop for AtlaspackOptions {
  fn drop(&mut self) {
    ViewCache::global().release(self.id);
  }
}

#[derive(Clone, Debug, Default, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
  #[default]
  Development,
  Production,
  Other(String),
}

impl Display for BuildMode {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      BuildMode::Development => write!(f, "development"),
      BuildMode::Production => write!(f, "production"),
      BuildMode::Other(mode) => write!(f, "{}", mode.to_lowercase()),
    }
  }
}

impl<'de> Deserialize<'de> for BuildMode {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    let s = String::deserialize(deserializer)?;

    Ok(match s.as_str() {
      "development" => BuildMode::Development,
      "production" => BuildMode::Production,
      _ => BuildMode::Other(s),
    })
  }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
  #[default]
  Error,
  Info,
  None,
  Verbose,
  Warn,
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  #[test]
  fn every_instance_has_its_own_identity() {
    let first = AtlaspackOptions::default();
    let second = AtlaspackOptions::default();

    assert_ne!(first.id(), second.id());
  }

  #[test]
  fn deserialized_options_get_a_fresh_identity() {
    let existing = AtlaspackOptions::default();
    let options: AtlaspackOptions = serde_json::from_str(
      r#"{ "mode": "production", "logLevel": "verbose", "projectRoot": "/app" }"#,
    )
    .unwrap();

    assert_ne!(options.id(), existing.id());
    assert_eq!(options.mode, BuildMode::Production);
    assert_eq!(options.log_level, LogLevel::Verbose);
    assert_eq!(options.project_root, PathBuf::from("/app"));
  }
}
