use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;

use crate::public::{BundleGraphView, BundleView, DependencyView};
use crate::types::AssetId;

pub struct RuntimeContext<'a> {
  pub bundle: &'a Arc<BundleView>,
  pub bundle_graph: &'a Arc<BundleGraphView>,
}

/// Modules shipped alongside the runtime that generated code can require
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum RuntimeModule {
  /// Exposes `getBundleURL()`, the base URL of the running bundle
  BundleUrl,
  /// A function turning a bundle URL into a URL a worker can be started from
  GetWorkerUrl,
  /// A function that loads a bundle from a URL and resolves once it has executed
  Loader(&'static str),
}

impl RuntimeModule {
  pub fn specifier(&self) -> &'static str {
    match self {
      RuntimeModule::BundleUrl => "./bundle-url",
      RuntimeModule::GetWorkerUrl => "./get-worker-url",
      RuntimeModule::Loader(specifier) => specifier,
    }
  }
}

/// What runs once a promise settles
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Continuation {
  /// Resolve with the last element of the settled array
  LastResult,
  /// Resolve with the exports of an asset from the global module registry
  RegistryLookup(AssetId),
}

/// Code produced by a runtime, kept as a tree until packaging prints it
#[derive(Clone, Debug, PartialEq)]
pub enum RuntimeExpr {
  /// A string literal
  Literal(String),
  /// The exports of a runtime module
  Module(RuntimeModule),
  Call {
    callee: Box<RuntimeExpr>,
    args: Vec<RuntimeExpr>,
  },
  Member {
    object: Box<RuntimeExpr>,
    property: String,
  },
  /// Native dynamic `import()` of a relative path
  Import(String),
  /// Synchronous `require()` of a relative path
  Require(String),
  /// A promise already resolved with the value of the expression
  Resolve(Box<RuntimeExpr>),
  /// String concatenation
  Concat(Vec<RuntimeExpr>),
  /// A promise resolving once every promise in the list has
  All(Vec<RuntimeExpr>),
  /// Evaluates each expression in order, producing the value of the last
  Sequence(Vec<RuntimeExpr>),
  Then {
    promise: Box<RuntimeExpr>,
    callback: Continuation,
  },
}

impl RuntimeExpr {
  pub fn call(callee: RuntimeExpr, args: Vec<RuntimeExpr>) -> Self {
    RuntimeExpr::Call {
      callee: Box::new(callee),
      args,
    }
  }

  pub fn member(object: RuntimeExpr, property: impl Into<String>) -> Self {
    RuntimeExpr::Member {
      object: Box::new(object),
      property: property.into(),
    }
  }

  pub fn then(self, callback: Continuation) -> Self {
    RuntimeExpr::Then {
      promise: Box::new(self),
      callback,
    }
  }
}

/// A synthetic asset a runtime adds to a bundle
///
/// The asset exports `code` and replaces the resolution of `dependency`.
#[derive(Clone, Debug)]
pub struct RuntimeAsset {
  pub file_path: PathBuf,
  pub code: RuntimeExpr,
  pub dependency: Arc<DependencyView>,
}

/// Injects code into bundles to load the bundles they depend on at runtime
///
/// Runtimes run once per bundle after bundles have been named. They only read
/// the bundle graph.
pub trait RuntimePlugin: Debug + Send + Sync {
  fn apply(&self, ctx: RuntimeContext<'_>) -> Result<Vec<RuntimeAsset>, anyhow::Error>;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug)]
  struct TestRuntimePlugin {}

  impl RuntimePlugin for TestRuntimePlugin {
    fn apply(&self, _ctx: RuntimeContext<'_>) -> Result<Vec<RuntimeAsset>, anyhow::Error> {
      todo!()
    }
  }

  #[test]
  fn can_be_dyn() {
    let _runtime: Box<dyn RuntimePlugin> = Box::new(TestRuntimePlugin {});
  }

  #[test]
  fn runtime_modules_have_stable_specifiers() {
    assert_eq!(RuntimeModule::BundleUrl.specifier(), "./bundle-url");
    assert_eq!(
      RuntimeModule::Loader("./loaders/browser/js-loader").specifier(),
      "./loaders/browser/js-loader"
    );
  }
}
