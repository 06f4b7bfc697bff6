use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use atlaspack_bundle_graph::plugin::{
  Continuation, RuntimeAsset, RuntimeContext, RuntimeExpr, RuntimeModule, RuntimePlugin,
};
use atlaspack_bundle_graph::public::{BundleGraphView, BundleView, DependencyView};
use atlaspack_bundle_graph::types::{Bundle, BundleGroup, FileType, OutputFormat};
use path_slash::PathBufExt;
use pathdiff::diff_paths;
use rayon::prelude::*;

use crate::loaders::{LoaderTable, DYNAMIC_IMPORT_MINIMUMS};

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
  #[error(
    "Expected exactly one bundle to load for dependency {dependency_id} of bundle {bundle_id}, found {count}"
  )]
  UnexpectedBundleCount {
    bundle_id: String,
    dependency_id: String,
    count: usize,
  },

  #[error("Bundle {bundle_id} must be named before runtimes are applied")]
  UnnamedBundle { bundle_id: String },
}

/// Adds loaders to JavaScript bundles for the bundles their dependencies live in
///
/// Each external dependency of a bundle is replaced by a synthetic asset that
/// evaluates to whatever the dependency should produce at runtime: a promise
/// for the exports of a lazily loaded bundle group, a URL, or an inline bundle id.
#[derive(Debug)]
pub struct JsRuntime {
  loaders: LoaderTable,
  runtime_dir: PathBuf,
}

impl JsRuntime {
  /// Creates a runtime whose synthetic assets are attributed to files in `runtime_dir`
  pub fn new(runtime_dir: impl Into<PathBuf>) -> Self {
    JsRuntime {
      loaders: LoaderTable::default(),
      runtime_dir: runtime_dir.into(),
    }
  }

  pub fn with_loaders(self, loaders: LoaderTable) -> Self {
    JsRuntime { loaders, ..self }
  }

  /// Plans the runtime assets of every bundle in parallel, keyed by bundle id
  pub fn apply_all(
    &self,
    bundle_graph: &Arc<BundleGraphView>,
  ) -> anyhow::Result<HashMap<String, Vec<RuntimeAsset>>> {
    let _span = tracing::trace_span!("apply_runtimes").entered();

    bundle_graph
      .get_bundles()
      .par_iter()
      .map(|bundle| {
        self
          .apply(RuntimeContext {
            bundle,
            bundle_graph,
          })
          .map(|assets| (bundle.id.clone(), assets))
      })
      .collect()
  }

  #[tracing::instrument(level = "trace", skip_all, fields(bundle_id = %bundle.id))]
  fn plan(
    &self,
    bundle: &BundleView,
    bundle_graph: &BundleGraphView,
  ) -> anyhow::Result<Vec<RuntimeAsset>> {
    if bundle.bundle_type != FileType::Js {
      return Ok(Vec::new());
    }

    let mut assets = Vec::new();
    for dependency in bundle_graph.get_external_dependencies(bundle) {
      if let Some(asset) = self.plan_dependency(bundle, bundle_graph, &dependency)? {
        assets.push(asset);
      }
    }

    Ok(assets)
  }

  fn plan_dependency(
    &self,
    bundle: &BundleView,
    bundle_graph: &BundleGraphView,
    dependency: &Arc<DependencyView>,
  ) -> anyhow::Result<Option<RuntimeAsset>> {
    let Some(bundle_group) = bundle_graph.resolve_external_dependency(dependency) else {
      // Unresolved URL dependencies keep their original specifier
      if dependency.is_url() {
        let code = RuntimeExpr::Literal(dependency.specifier.clone());
        return Ok(Some(self.runtime_asset(dependency, code)));
      }

      return Ok(None);
    };

    let bundles_in_group = bundle_graph.get_bundles_in_bundle_group(&bundle_group);
    let Some(first_bundle) = bundles_in_group.first() else {
      return Err(
        RuntimeError::UnexpectedBundleCount {
          bundle_id: bundle.id.clone(),
          dependency_id: dependency.id.clone(),
          count: 0,
        }
        .into(),
      );
    };

    if first_bundle.is_inline() {
      return Ok(Some(RuntimeAsset {
        file_path: self
          .runtime_dir
          .join("bundles")
          .join(format!("{}.js", first_bundle.id)),
        code: RuntimeExpr::Literal(dependency.id.clone()),
        dependency: Arc::clone(dependency),
      }));
    }

    // URL dependencies always evaluate to a URL, never to a loaded bundle
    if dependency.is_url() {
      return self.url_runtime(dependency, bundle, first_bundle).map(Some);
    }

    let external_bundles = load_order(bundle, &bundle_group, &bundles_in_group);

    let mut loaders = Vec::new();
    for external_bundle in &external_bundles {
      if let Some(loader) = self.loader_expression(bundle, external_bundle)? {
        loaders.push(loader);
      }
    }

    if loaders.is_empty() {
      let [external_bundle] = external_bundles.as_slice() else {
        return Err(
          RuntimeError::UnexpectedBundleCount {
            bundle_id: bundle.id.clone(),
            dependency_id: dependency.id.clone(),
            count: external_bundles.len(),
          }
          .into(),
        );
      };

      return self.url_runtime(dependency, bundle, external_bundle).map(Some);
    }

    let is_global = bundle.env.output_format == OutputFormat::Global;
    let all_js = external_bundles
      .iter()
      .all(|external_bundle| external_bundle.bundle_type == FileType::Js);

    let mut code = if loaders.len() > 1 && (is_global || !all_js) {
      let all = RuntimeExpr::All(loaders);
      if is_global {
        all
      } else {
        all.then(Continuation::LastResult)
      }
    } else if loaders.len() == 1 {
      loaders.remove(0)
    } else {
      RuntimeExpr::Sequence(loaders)
    };

    if is_global {
      code = code.then(Continuation::RegistryLookup(
        bundle_group.entry_asset_id.clone(),
      ));
    }

    Ok(Some(self.runtime_asset(dependency, code)))
  }

  /// The expression that loads `external_bundle` from `bundle`, if a loader is available
  fn loader_expression(
    &self,
    bundle: &BundleView,
    external_bundle: &BundleView,
  ) -> anyhow::Result<Option<RuntimeExpr>> {
    let Some(mut loader) = self
      .loaders
      .get(bundle.env.context, &external_bundle.bundle_type)
    else {
      tracing::debug!(
        context = ?bundle.env.context,
        bundle_type = external_bundle.bundle_type.extension(),
        "No loader for bundle type"
      );
      return Ok(None);
    };

    if external_bundle.bundle_type == FileType::Js {
      match external_bundle.env.output_format {
        OutputFormat::EsModule => {
          if !self.needs_import_polyfill(bundle) {
            let path = relative_bundle_path(bundle, external_bundle, true)?;
            return Ok(Some(RuntimeExpr::Import(path)));
          }

          loader = self.loaders.import_polyfill();
        }
        OutputFormat::CommonJS => {
          let path = relative_bundle_path(bundle, external_bundle, true)?;
          return Ok(Some(RuntimeExpr::Resolve(Box::new(RuntimeExpr::Require(
            path,
          )))));
        }
        OutputFormat::Global => {}
      }
    }

    let path = relative_bundle_path(bundle, external_bundle, false)?;
    Ok(Some(RuntimeExpr::call(
      RuntimeExpr::Module(loader),
      vec![bundle_url(path)],
    )))
  }

  /// Whether browsers targeted by `bundle` lack native dynamic `import()`
  fn needs_import_polyfill(&self, bundle: &BundleView) -> bool {
    bundle.env.is_browser() && !bundle.env.matches_engines(&DYNAMIC_IMPORT_MINIMUMS)
  }

  fn url_runtime(
    &self,
    dependency: &Arc<DependencyView>,
    bundle: &BundleView,
    external_bundle: &BundleView,
  ) -> anyhow::Result<RuntimeAsset> {
    let path = relative_bundle_path(bundle, external_bundle, false)?;
    let code = if dependency.is_webworker() {
      RuntimeExpr::call(
        RuntimeExpr::Module(RuntimeModule::GetWorkerUrl),
        vec![RuntimeExpr::Literal(path)],
      )
    } else {
      bundle_url(path)
    };

    Ok(self.runtime_asset(dependency, code))
  }

  fn runtime_asset(&self, dependency: &Arc<DependencyView>, code: RuntimeExpr) -> RuntimeAsset {
    RuntimeAsset {
      file_path: self.runtime_dir.join("JSRuntime.js"),
      code,
      dependency: Arc::clone(dependency),
    }
  }
}

impl RuntimePlugin for JsRuntime {
  fn apply(&self, ctx: RuntimeContext<'_>) -> Result<Vec<RuntimeAsset>, anyhow::Error> {
    self.plan(ctx.bundle, ctx.bundle_graph)
  }
}

/// Non-inline bundles of a group, with the bundle holding the group's entry asset last
///
/// CommonJS is synchronous, so only the entry bundle is loaded and it requires
/// its siblings itself. Libraries do the same since the consuming bundler
/// resolves the sibling imports.
fn load_order(
  bundle: &BundleView,
  bundle_group: &BundleGroup,
  bundles_in_group: &[Arc<BundleView>],
) -> Vec<Arc<BundleView>> {
  let mut external_bundles: Vec<Arc<BundleView>> = bundles_in_group
    .iter()
    .filter(|external_bundle| !external_bundle.is_inline())
    .cloned()
    .collect();

  external_bundles.sort_by_key(|external_bundle| {
    external_bundle
      .entry_asset_ids
      .contains(&bundle_group.entry_asset_id)
  });

  if bundle.env.output_format == OutputFormat::CommonJS || bundle.env.is_library {
    let last = external_bundles.len().saturating_sub(1);
    external_bundles = external_bundles.split_off(last);
  }

  external_bundles
}

/// `getBundleURL() + path`
fn bundle_url(path: String) -> RuntimeExpr {
  RuntimeExpr::Concat(vec![
    RuntimeExpr::call(
      RuntimeExpr::member(RuntimeExpr::Module(RuntimeModule::BundleUrl), "getBundleURL"),
      Vec::new(),
    ),
    RuntimeExpr::Literal(path),
  ])
}

/// Path of `to` relative to the directory of `from`, with forward slashes
fn relative_bundle_path(
  from: &Bundle,
  to: &Bundle,
  leading_dot_slash: bool,
) -> Result<String, RuntimeError> {
  let from_path = bundle_file_path(from)?;
  let to_path = bundle_file_path(to)?;
  let from_dir = from_path.parent().unwrap_or(Path::new(""));

  let relative = diff_paths(&to_path, from_dir)
    .unwrap_or(to_path)
    .to_slash_lossy();

  if leading_dot_slash && !relative.starts_with('.') {
    return Ok(format!("./{relative}"));
  }

  Ok(relative)
}

fn bundle_file_path(bundle: &Bundle) -> Result<PathBuf, RuntimeError> {
  bundle
    .file_path()
    .ok_or_else(|| RuntimeError::UnnamedBundle {
      bundle_id: bundle.id.clone(),
    })
}
