use std::path::PathBuf;
use std::sync::Arc;

use atlaspack_bundle_graph::bundle_graph::BundleGraphEdgeType;
use atlaspack_bundle_graph::public::BundleGraphView;
use atlaspack_bundle_graph::types::environment::engines::{Engines, EnginesBrowsers};
use atlaspack_bundle_graph::types::{
  Asset, AtlaspackOptions, Bundle, BundleBehavior, BundleGroup, Dependency, Environment,
  EnvironmentContext, ExportSymbol, FileType, OutputFormat, Priority, SpecifierType, Symbol,
  Target, STAR_SYMBOL,
};
use atlaspack_bundle_graph::BundleGraph;

/// Id of the bundle graph root, for bundle groups that are entries of the build
pub const ROOT: &str = "@@root";

pub fn default_target() -> Target {
  Target {
    dist_dir: PathBuf::from("/dist"),
    name: String::from("default"),
    public_url: String::from("/"),
  }
}

pub fn env(context: EnvironmentContext, output_format: OutputFormat) -> Environment {
  Environment {
    context,
    output_format,
    ..Environment::default()
  }
}

/// A browser environment targeting the given browserslist queries
pub fn browser_env(output_format: OutputFormat, browsers: &[&str]) -> Environment {
  Environment {
    engines: Engines {
      browsers: Some(EnginesBrowsers::new(
        browsers.iter().map(|query| query.to_string()).collect(),
      )),
      ..Engines::default()
    },
    ..env(EnvironmentContext::Browser, output_format)
  }
}

pub fn js_asset(id: &str) -> Asset {
  Asset {
    id: id.into(),
    file_path: PathBuf::from(format!("/src/{id}.js")),
    file_type: FileType::Js,
    env: Arc::new(env(EnvironmentContext::Browser, OutputFormat::EsModule)),
    ..Asset::default()
  }
}

/// An asset exporting each of `locals` under its own name
pub fn asset_exporting(id: &str, locals: &[&str]) -> Asset {
  Asset {
    symbols: locals
      .iter()
      .map(|local| (local.to_string(), ExportSymbol::local(id, *local)))
      .collect(),
    ..js_asset(id)
  }
}

pub fn dependency(id: &str, source_asset_id: &str, specifier: &str) -> Dependency {
  Dependency {
    id: id.into(),
    source_asset_id: Some(source_asset_id.into()),
    specifier: specifier.into(),
    ..Dependency::default()
  }
}

pub fn async_dependency(id: &str, source_asset_id: &str, specifier: &str) -> Dependency {
  Dependency {
    priority: Priority::Lazy,
    ..dependency(id, source_asset_id, specifier)
  }
}

pub fn url_dependency(id: &str, source_asset_id: &str, specifier: &str) -> Dependency {
  Dependency {
    specifier_type: SpecifierType::Url,
    ..dependency(id, source_asset_id, specifier)
  }
}

pub fn webworker_dependency(id: &str, source_asset_id: &str, specifier: &str) -> Dependency {
  let mut dependency = url_dependency(id, source_asset_id, specifier);
  dependency
    .meta
    .insert(String::from("webworker"), serde_json::Value::Bool(true));
  dependency
}

/// An `export * from` dependency
pub fn wildcard_dependency(id: &str, source_asset_id: &str, specifier: &str) -> Dependency {
  Dependency {
    symbols: vec![Symbol {
      local: STAR_SYMBOL.into(),
      exported: STAR_SYMBOL.into(),
      is_weak: true,
    }],
    ..dependency(id, source_asset_id, specifier)
  }
}

/// A named js bundle written to `/dist/<id>.js`
pub fn js_bundle(id: &str, entry_asset_ids: &[&str], env: Environment) -> Bundle {
  Bundle {
    id: id.into(),
    public_id: Some(id.into()),
    bundle_type: FileType::Js,
    entry_asset_ids: entry_asset_ids.iter().map(|id| id.to_string()).collect(),
    main_entry_id: entry_asset_ids.last().map(|id| id.to_string()),
    env: Arc::new(env),
    name: Some(format!("{id}.js")),
    target: default_target(),
    ..Bundle::default()
  }
}

pub fn inline_bundle(id: &str, entry_asset_ids: &[&str], env: Environment) -> Bundle {
  Bundle {
    bundle_behavior: Some(BundleBehavior::Inline),
    ..js_bundle(id, entry_asset_ids, env)
  }
}

pub fn bundle_group_id(entry_asset_id: &str) -> String {
  BundleGroup::new(entry_asset_id, default_target()).id()
}

/// Builds bundle graphs for tests
///
/// ```ignore
/// let bundle_graph = BundleGraphFixture::new()
///   .asset(js_asset("index"))
///   .bundle(js_bundle("main", &["index"], env), &["index"])
///   .bundle_group("index", ROOT, &["main"])
///   .build();
/// ```
#[derive(Default)]
pub struct BundleGraphFixture {
  bundle_graph: BundleGraph,
}

impl BundleGraphFixture {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn asset(mut self, asset: Asset) -> Self {
    self.bundle_graph.add_asset(Arc::new(asset));
    self
  }

  /// Adds a dependency, connected to its source asset
  pub fn dependency(mut self, dependency: Dependency) -> Self {
    let id = dependency.id.clone();
    let source_asset_id = dependency.source_asset_id.clone();
    self.bundle_graph.add_dependency(Arc::new(dependency));

    if let Some(source_asset_id) = source_asset_id {
      self
        .bundle_graph
        .add_edge(&source_asset_id, &id, BundleGraphEdgeType::Null);
    }
    self
  }

  /// Resolves a dependency to an asset
  pub fn resolve(mut self, dependency_id: &str, asset_id: &str) -> Self {
    self
      .bundle_graph
      .add_edge(dependency_id, asset_id, BundleGraphEdgeType::Null);
    self
  }

  /// Resolves a dependency to the bundle group of an entry asset
  pub fn resolve_to_group(mut self, dependency_id: &str, entry_asset_id: &str) -> Self {
    self.bundle_graph.add_edge(
      dependency_id,
      &bundle_group_id(entry_asset_id),
      BundleGraphEdgeType::Null,
    );
    self
  }

  /// Adds a bundle containing `contents`, in addition to its entry assets
  pub fn bundle(mut self, bundle: Bundle, contents: &[&str]) -> Self {
    let id = bundle.id.clone();
    let entry_asset_ids = bundle.entry_asset_ids.clone();
    self.bundle_graph.add_bundle(Arc::new(bundle));

    for entry_asset_id in &entry_asset_ids {
      self
        .bundle_graph
        .add_edge(&id, entry_asset_id, BundleGraphEdgeType::Null);
      self.bundle_graph.add_to_bundle(&id, entry_asset_id);
    }

    for node_id in contents {
      self.bundle_graph.add_to_bundle(&id, node_id);
    }
    self
  }

  /// Adds a bundle group loaded by `loaded_by`, either [`ROOT`] or a bundle id
  pub fn bundle_group(mut self, entry_asset_id: &str, loaded_by: &str, bundle_ids: &[&str]) -> Self {
    let group_id = self
      .bundle_graph
      .add_bundle_group(Arc::new(BundleGroup::new(entry_asset_id, default_target())));

    self.bundle_graph.add_bundle_group_loader(loaded_by, &group_id);
    for bundle_id in bundle_ids {
      self
        .bundle_graph
        .add_bundle_to_bundle_group(&group_id, bundle_id);
    }
    self
  }

  /// Loads an existing bundle group from another bundle
  pub fn load_bundle_group(mut self, bundle_id: &str, entry_asset_id: &str) -> Self {
    self
      .bundle_graph
      .add_bundle_group_loader(bundle_id, &bundle_group_id(entry_asset_id));
    self
  }

  pub fn reference(mut self, bundle_id: &str, sibling_id: &str) -> Self {
    self.bundle_graph.add_bundle_reference(bundle_id, sibling_id);
    self
  }

  pub fn remove(mut self, node_id: &str) -> Self {
    self.bundle_graph.remove_node(node_id);
    self
  }

  pub fn build(self) -> BundleGraph {
    self.bundle_graph
  }

  /// Builds the graph and wraps it in a view for `options`
  pub fn view(self, options: &AtlaspackOptions) -> Arc<BundleGraphView> {
    BundleGraphView::new(&Arc::new(self.bundle_graph), options)
  }
}
