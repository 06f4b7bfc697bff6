use std::collections::HashMap;

use atlaspack_bundle_graph::plugin::RuntimeModule;
use atlaspack_bundle_graph::types::environment::engines::EngineMinimums;
use atlaspack_bundle_graph::types::{EnvironmentContext, FileType};
use once_cell::sync::Lazy;

/// Browsers that support dynamic `import()` natively, with the first version that does
///
/// See https://caniuse.com/#feat=es6-module-dynamic-import
const DYNAMIC_IMPORT_BROWSERS: &[(&str, &[u64])] = &[
  ("edge", &[76]),
  ("firefox", &[67]),
  ("chrome", &[63]),
  ("safari", &[11, 1]),
  ("opera", &[50]),
];

pub static DYNAMIC_IMPORT_MINIMUMS: Lazy<EngineMinimums> =
  Lazy::new(|| EngineMinimums::from_table(DYNAMIC_IMPORT_BROWSERS));

const IMPORT_POLYFILL: &str = "./loaders/browser/import-polyfill";

const LOADERS: &[(EnvironmentContext, FileType, &str)] = &[
  (
    EnvironmentContext::Browser,
    FileType::Css,
    "./loaders/browser/css-loader",
  ),
  (
    EnvironmentContext::Browser,
    FileType::Html,
    "./loaders/browser/html-loader",
  ),
  (
    EnvironmentContext::Browser,
    FileType::Js,
    "./loaders/browser/js-loader",
  ),
  (
    EnvironmentContext::Browser,
    FileType::Wasm,
    "./loaders/browser/wasm-loader",
  ),
  (
    EnvironmentContext::Node,
    FileType::Css,
    "./loaders/node/css-loader",
  ),
  (
    EnvironmentContext::Node,
    FileType::Html,
    "./loaders/node/html-loader",
  ),
  (
    EnvironmentContext::Node,
    FileType::Js,
    "./loaders/node/js-loader",
  ),
  (
    EnvironmentContext::Node,
    FileType::Wasm,
    "./loaders/node/wasm-loader",
  ),
];

/// Loader modules by the context of the requesting bundle and the type of the bundle being loaded
///
/// Pairs that are not in the table have no loader.
#[derive(Clone, Debug)]
pub struct LoaderTable {
  loaders: HashMap<(EnvironmentContext, FileType), &'static str>,
  import_polyfill: &'static str,
}

impl Default for LoaderTable {
  fn default() -> Self {
    LoaderTable::new(LOADERS, IMPORT_POLYFILL)
  }
}

impl LoaderTable {
  pub fn new(
    loaders: &[(EnvironmentContext, FileType, &'static str)],
    import_polyfill: &'static str,
  ) -> Self {
    LoaderTable {
      loaders: loaders
        .iter()
        .map(|(context, file_type, specifier)| ((*context, file_type.clone()), *specifier))
        .collect(),
      import_polyfill,
    }
  }

  pub fn get(&self, context: EnvironmentContext, file_type: &FileType) -> Option<RuntimeModule> {
    self
      .loaders
      .get(&(context, file_type.clone()))
      .map(|specifier| RuntimeModule::Loader(specifier))
  }

  /// Loads ES module bundles in browsers without native dynamic `import()`
  pub fn import_polyfill(&self) -> RuntimeModule {
    RuntimeModule::Loader(self.import_polyfill)
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  #[test]
  fn finds_loaders_for_known_pairs() {
    let loaders = LoaderTable::default();

    assert_eq!(
      loaders.get(EnvironmentContext::Node, &FileType::Wasm),
      Some(RuntimeModule::Loader("./loaders/node/wasm-loader"))
    );
    assert_eq!(
      loaders.import_polyfill(),
      RuntimeModule::Loader("./loaders/browser/import-polyfill")
    );
  }

  #[test]
  fn has_no_loader_for_other_pairs() {
    let loaders = LoaderTable::default();

    assert_eq!(loaders.get(EnvironmentContext::WebWorker, &FileType::Js), None);
    assert_eq!(loaders.get(EnvironmentContext::Browser, &FileType::Json), None);
  }

  #[test]
  fn dynamic_import_minimums_use_dotted_versions() {
    assert_eq!(
      DYNAMIC_IMPORT_MINIMUMS.get("safari").map(|v| v.to_string()),
      Some(String::from("11.1"))
    );
  }
}
