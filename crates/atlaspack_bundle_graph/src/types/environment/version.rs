use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum VersionParseError {
  #[error("failed to parse version component in {0:?}")]
  InvalidComponent(String),
}

/// A permissive version number like `1.0.0`, `11.1` or `76`.
///
/// Missing trailing components compare as zero, so `11.1` equals `11.1.0`.
/// Ranges such as `15.2-15.3` (as reported by browserslist for some mobile
/// browsers) parse to their lower bound.
#[derive(Clone, Debug, Default)]
pub struct Version {
  components: tinyvec::TinyVec<[u64; 4]>,
}

impl Version {
  pub fn new(components: &[u64]) -> Self {
    let mut version = Version::default();
    version.components.extend_from_slice(components);
    version
  }

  pub fn parse(value: &str) -> Result<Self, VersionParseError> {
    let lower_bound = value.split('-').next().unwrap_or(value).trim();
    let mut components = tinyvec::tiny_vec!();
    for part in lower_bound.split('.') {
      if part.is_empty() {
        components.push(0);
        continue;
      }

      let component = part
        .parse::<u64>()
        .map_err(|_| VersionParseError::InvalidComponent(value.to_string()))?;
      components.push(component);
    }

    Ok(Version { components })
  }

  pub fn components(&self) -> &[u64] {
    self.components.as_slice()
  }

  fn component(&self, index: usize) -> u64 {
    self.components.get(index).copied().unwrap_or(0)
  }

  fn significant_components(&self) -> &[u64] {
    let len = self
      .components
      .iter()
      .rposition(|c| *c != 0)
      .map_or(0, |i| i + 1);
    &self.components[..len]
  }
}

impl PartialEq for Version {
  fn eq(&self, other: &Self) -> bool {
    self.significant_components() == other.significant_components()
  }
}

impl Eq for Version {}

impl Hash for Version {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.significant_components().hash(state);
  }
}

impl Ord for Version {
  fn cmp(&self, other: &Self) -> Ordering {
    let len = self.components.len().max(other.components.len());
    for index in 0..len {
      match self.component(index).cmp(&other.component(index)) {
        Ordering::Equal => continue,
        ordering => return ordering,
      }
    }
    Ordering::Equal
  }
}

impl PartialOrd for Version {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl FromStr for Version {
  type Err = VersionParseError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Version::parse(s)
  }
}

impl Display for Version {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let parts = self
      .components
      .iter()
      .map(|c| c.to_string())
      .collect::<Vec<_>>();
    write!(f, "{}", parts.join("."))
  }
}

impl Serialize for Version {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    self.to_string().serialize(serializer)
  }
}

impl<'de> Deserialize<'de> for Version {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    let value: String = Deserialize::deserialize(deserializer)?;
    Version::parse(&value).map_err(serde::de::Error::custom)
  }
}
