use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use super::browsers::Browsers;
use super::version::Version;

/// The browsers list as it appears on the engines field.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EnginesBrowsers {
  List(Vec<String>),
  String(String),
}

impl EnginesBrowsers {
  pub fn new(browser_list: Vec<String>) -> Self {
    Self::List(browser_list)
  }

  pub fn list(&self) -> Vec<String> {
    match self {
      Self::List(list) => list.clone(),
      Self::String(string) => vec![string.clone()],
    }
  }

  /// Resolves the browserslist queries into a version matrix
  ///
  /// Queries browserslist cannot parse resolve to an empty matrix.
  pub fn resolve(&self) -> Browsers {
    match browserslist::resolve(self.list(), &Default::default()) {
      Ok(distribs) => Browsers::from(distribs),
      Err(error) => {
        tracing::debug!(%error, queries = ?self.list(), "Failed to resolve browserslist");
        Browsers::default()
      }
    }
  }
}

/// The engines field in package.json
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Engines {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub browsers: Option<EnginesBrowsers>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub node: Option<Version>,
}

/// Minimum engine versions required for some platform feature
///
/// Built from a fixed table, so a browser that is missing from the table is a
/// browser that is not known to support the feature.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EngineMinimums {
  versions: BTreeMap<&'static str, Version>,
}

impl EngineMinimums {
  pub fn from_table(table: &[(&'static str, &[u64])]) -> Self {
    EngineMinimums {
      versions: table
        .iter()
        .map(|(name, components)| (*name, Version::new(components)))
        .collect(),
    }
  }

  pub fn get(&self, browser: &str) -> Option<&Version> {
    self.versions.get(browser)
  }

  /// True when every browser in the matrix meets its minimum version
  pub fn satisfied_by(&self, browsers: &Browsers) -> bool {
    browsers.iter().all(|(name, version)| {
      self
        .versions
        .get(name.as_str())
        .is_some_and(|minimum| version >= minimum)
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn minimums() -> EngineMinimums {
    EngineMinimums::from_table(&[("chrome", &[63]), ("safari", &[11, 1])])
  }

  #[test]
  fn satisfied_when_every_browser_meets_the_minimum() {
    let browsers = Browsers::from_iter([
      ("chrome", Version::new(&[70])),
      ("safari", Version::new(&[11, 1])),
    ]);

    assert!(minimums().satisfied_by(&browsers));
  }

  #[test]
  fn not_satisfied_when_a_browser_is_too_old() {
    let browsers = Browsers::from_iter([
      ("chrome", Version::new(&[70])),
      ("safari", Version::new(&[11])),
    ]);

    assert!(!minimums().satisfied_by(&browsers));
  }

  #[test]
  fn not_satisfied_when_a_browser_is_unknown() {
    let browsers = Browsers::from_iter([("ie", Version::new(&[11]))]);

    assert!(!minimums().satisfied_by(&browsers));
  }

  #[test]
  fn resolves_browserslist_queries() {
    let browsers = EnginesBrowsers::new(vec![String::from("chrome 60")]).resolve();

    assert_eq!(browsers.get("chrome"), Some(&Version::new(&[60])));
  }
}
