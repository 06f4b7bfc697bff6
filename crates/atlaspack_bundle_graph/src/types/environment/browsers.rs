use std::collections::BTreeMap;

use browserslist::Distrib;

use super::version::Version;

/// The engine-version matrix a build targets.
///
/// Holds the lowest targeted version of each browser. Browserslist reports one
/// entry per version, so only the minimum is kept.
#[derive(Clone, Default, Debug, Eq, PartialEq)]
pub struct Browsers {
  data: BTreeMap<String, Version>,
}

impl Browsers {
  pub fn insert(&mut self, name: &str, version: Version) {
    match self.data.get_mut(name) {
      Some(existing) if *existing <= version => {}
      Some(existing) => *existing = version,
      None => {
        self.data.insert(name.to_string(), version);
      }
    }
  }

  pub fn get(&self, name: &str) -> Option<&Version> {
    self.data.get(name)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&String, &Version)> {
    self.data.iter()
  }

  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }
}

impl<'a> FromIterator<(&'a str, Version)> for Browsers {
  fn from_iter<T: IntoIterator<Item = (&'a str, Version)>>(iter: T) -> Self {
    let mut browsers = Browsers::default();
    for (name, version) in iter {
      browsers.insert(name, version);
    }
    browsers
  }
}

// Versions like "all" or "TP" cannot be compared and are dropped.
impl From<Vec<Distrib>> for Browsers {
  fn from(distribs: Vec<Distrib>) -> Self {
    let mut browsers = Browsers::default();
    for distrib in distribs {
      match Version::parse(distrib.version()) {
        Ok(version) => browsers.insert(distrib.name(), version),
        Err(_) => tracing::debug!(
          browser = distrib.name(),
          version = distrib.version(),
          "Skipping browser version that cannot be compared"
        ),
      }
    }

    browsers
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  #[test]
  fn keeps_the_lowest_version_per_browser() {
    let browsers = Browsers::from_iter([
      ("chrome", Version::new(&[90])),
      ("chrome", Version::new(&[60])),
      ("chrome", Version::new(&[75])),
      ("safari", Version::new(&[12])),
    ]);

    assert_eq!(browsers.get("chrome"), Some(&Version::new(&[60])));
    assert_eq!(browsers.get("safari"), Some(&Version::new(&[12])));
    assert_eq!(browsers.get("edge"), None);
  }
}
