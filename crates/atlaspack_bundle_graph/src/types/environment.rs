use serde::Deserialize;
use serde::Serialize;

pub use output_format::OutputFormat;

use self::engines::{EngineMinimums, Engines};

pub mod browsers;
pub mod engines;
mod output_format;
pub mod version;

/// The environment the built code will run in
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
  /// The environment the output should run in
  pub context: EnvironmentContext,

  /// The engines supported by the environment
  #[serde(default)]
  pub engines: Engines,

  /// Whether this is a library build
  ///
  /// Treats the target as a library that would be published to npm and consumed by another tool,
  /// rather than used directly in a browser or other target environment.
  #[serde(default)]
  pub is_library: bool,

  /// Determines what type of module to output
  pub output_format: OutputFormat,

  #[serde(default)]
  pub should_scope_hoist: bool,
}

impl Environment {
  pub fn is_browser(&self) -> bool {
    self.context.is_browser()
  }

  pub fn is_node(&self) -> bool {
    self.context.is_node()
  }

  /// Checks the targeted engines against a table of minimum versions
  ///
  /// Only browser environments with an explicit browsers query are checked.
  /// Anything else is assumed to match. A browser environment without a query
  /// is treated as targeting modern browsers, where Parcel's `matchesEngines`
  /// resolves the browserslist defaults and can return false.
  pub fn matches_engines(&self, minimums: &EngineMinimums) -> bool {
    if !self.is_browser() {
      return true;
    }

    let Some(browsers) = self.engines.browsers.as_ref() else {
      return true;
    };

    minimums.satisfied_by(&browsers.resolve())
  }
}

/// The environment the output should run in
///
/// This informs Atlaspack what environment-specific APIs are available.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnvironmentContext {
  #[default]
  Browser,
  ElectronMain,
  ElectronRenderer,
  Node,
  ServiceWorker,
  WebWorker,
  Worklet,
}

impl EnvironmentContext {
  pub fn is_node(&self) -> bool {
    use EnvironmentContext::*;
    matches!(self, Node | ElectronMain | ElectronRenderer)
  }

  pub fn is_browser(&self) -> bool {
    use EnvironmentContext::*;
    matches!(
      self,
      Browser | WebWorker | ServiceWorker | Worklet | ElectronRenderer
    )
  }

  pub fn is_worker(&self) -> bool {
    use EnvironmentContext::*;
    matches!(self, WebWorker | ServiceWorker)
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::engines::EnginesBrowsers;
  use super::*;

  fn minimums() -> EngineMinimums {
    EngineMinimums::from_table(&[("chrome", &[63]), ("firefox", &[67])])
  }

  fn browser_env(queries: &[&str]) -> Environment {
    Environment {
      engines: Engines {
        browsers: Some(EnginesBrowsers::new(
          queries.iter().map(|q| q.to_string()).collect(),
        )),
        ..Engines::default()
      },
      output_format: OutputFormat::EsModule,
      ..Environment::default()
    }
  }

  #[test]
  fn matches_when_no_browsers_are_targeted() {
    assert!(Environment::default().matches_engines(&minimums()));
  }

  #[test]
  fn node_environments_always_match() {
    let env = Environment {
      context: EnvironmentContext::Node,
      ..browser_env(&["chrome 50"])
    };

    assert!(env.matches_engines(&minimums()));
  }

  #[test]
  fn matches_modern_browser_targets() {
    assert!(browser_env(&["chrome 70", "firefox 70"]).matches_engines(&minimums()));
  }

  #[test]
  fn does_not_match_old_browser_targets() {
    assert!(!browser_env(&["chrome 70", "firefox 60"]).matches_engines(&minimums()));
  }

  #[test]
  fn deserializes_from_camel_case() {
    let env: Environment = serde_json::from_str(
      r#"{
        "context": "web-worker",
        "engines": { "browsers": "chrome 70" },
        "isLibrary": true,
        "outputFormat": "esmodule"
      }"#,
    )
    .unwrap();

    assert_eq!(
      env,
      Environment {
        context: EnvironmentContext::WebWorker,
        engines: Engines {
          browsers: Some(EnginesBrowsers::String(String::from("chrome 70"))),
          node: None,
        },
        is_library: true,
        output_format: OutputFormat::EsModule,
        should_scope_hoist: false,
      }
    );
  }
}
