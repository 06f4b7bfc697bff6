use atlaspack_bundle_graph::types::{EnvironmentContext, FileType, OutputFormat};
use atlaspack_bundle_graph::BundleGraph;
use atlaspack_test_fixtures::*;
use pretty_assertions::assert_eq;

fn ids<T: AsRef<str>>(items: impl IntoIterator<Item = T>) -> Vec<String> {
  items
    .into_iter()
    .map(|item| item.as_ref().to_string())
    .collect()
}

fn browser() -> atlaspack_bundle_graph::types::Environment {
  env(EnvironmentContext::Browser, OutputFormat::EsModule)
}

/// `main` holds `index` and `lib`. `index` imports `lib` synchronously, lazily
/// imports `lazy` from the bundle group of `lazy_bundle` and imports
/// `missing`, which did not resolve.
fn app() -> BundleGraph {
  BundleGraphFixture::new()
    .asset(js_asset("index"))
    .asset(js_asset("lib"))
    .asset(js_asset("lazy"))
    .dependency(dependency("index->lib", "index", "./lib"))
    .dependency(async_dependency("index->lazy", "index", "./lazy"))
    .dependency(dependency("index->missing", "index", "./missing"))
    .resolve("index->lib", "lib")
    .resolve("index->lazy", "lazy")
    .bundle(
      js_bundle("main", &["index"], browser()),
      &["index->lib", "lib", "index->lazy", "index->missing"],
    )
    .bundle(js_bundle("lazy_bundle", &["lazy"], browser()), &[])
    .bundle_group("index", ROOT, &["main"])
    .bundle_group("lazy", "main", &["lazy_bundle"])
    .resolve_to_group("index->lazy", "lazy")
    .build()
}

#[test]
fn dependencies_resolve_either_internally_or_externally() {
  let bundle_graph = app();

  for id in ["index->lib", "index->lazy", "index->missing"] {
    let dependency = bundle_graph.get_dependency_by_id(id).unwrap();
    let internal = bundle_graph.get_dependency_resolution(dependency);
    let external = bundle_graph.resolve_external_dependency(dependency);

    assert!(internal.is_none() || external.is_none(), "{id}");
  }

  let lib = bundle_graph.get_dependency_by_id("index->lib").unwrap();
  assert_eq!(
    bundle_graph.get_dependency_resolution(lib).map(|asset| asset.id.as_str()),
    Some("lib")
  );

  let lazy = bundle_graph.get_dependency_by_id("index->lazy").unwrap();
  assert!(bundle_graph.get_dependency_resolution(lazy).is_none());
  assert_eq!(
    bundle_graph
      .resolve_external_dependency(lazy)
      .map(|bundle_group| bundle_group.entry_asset_id.as_str()),
    Some("lazy")
  );
}

#[test]
fn external_dependencies_cross_bundle_groups_or_are_unresolved() {
  let bundle_graph = app();
  let main = bundle_graph.get_bundle_by_id("main").unwrap();

  assert_eq!(
    ids(
      bundle_graph
        .get_external_dependencies(main)
        .into_iter()
        .map(|dependency| &dependency.id)
    ),
    vec!["index->lazy", "index->missing"]
  );
}

#[test]
fn bundle_assets_are_walked_from_the_entries() {
  let bundle_graph = app();
  let main = bundle_graph.get_bundle_by_id("main").unwrap();

  assert_eq!(
    ids(
      bundle_graph
        .get_bundle_assets(main)
        .into_iter()
        .map(|asset| &asset.id)
    ),
    vec!["index", "lib"]
  );

  let lazy = bundle_graph.get_asset_by_id("lazy").unwrap();
  assert!(!bundle_graph.bundle_has_asset(main, lazy));
  assert_eq!(
    ids(
      bundle_graph
        .find_bundles_with_asset(lazy)
        .into_iter()
        .map(|bundle| &bundle.id)
    ),
    vec!["lazy_bundle"]
  );
}

#[test]
fn stale_dependencies_do_not_reference_assets() {
  let bundle_graph = BundleGraphFixture::new()
    .asset(js_asset("index"))
    .asset(js_asset("removed"))
    .asset(js_asset("lib"))
    .dependency(dependency("index->lib", "index", "./lib"))
    .dependency(dependency("removed->lib", "removed", "./lib"))
    .resolve("index->lib", "lib")
    .resolve("removed->lib", "lib")
    .remove("removed")
    .build();

  let lib = bundle_graph.get_asset_by_id("lib").unwrap();

  assert_eq!(
    ids(
      bundle_graph
        .get_incoming_dependencies(lib)
        .into_iter()
        .map(|dependency| &dependency.id)
    ),
    vec!["index->lib"]
  );
  assert!(bundle_graph.is_asset_referenced(lib));
  assert!(bundle_graph.is_asset_referenced_by_asset_type(lib, &FileType::Js));
  assert!(!bundle_graph.is_asset_referenced_by_asset_type(lib, &FileType::Css));
}

#[test]
fn siblings_are_group_members_then_references() {
  let bundle_graph = BundleGraphFixture::new()
    .asset(js_asset("index"))
    .asset(js_asset("react"))
    .asset(js_asset("theme"))
    .bundle(js_bundle("main", &["index"], browser()), &[])
    .bundle(js_bundle("vendor", &["react"], browser()), &[])
    .bundle(js_bundle("styles", &["theme"], browser()), &[])
    .bundle_group("index", ROOT, &["vendor", "main"])
    .reference("main", "styles")
    .reference("main", "vendor")
    .build();

  let main = bundle_graph.get_bundle_by_id("main").unwrap();

  assert_eq!(
    ids(
      bundle_graph
        .get_sibling_bundles(main)
        .into_iter()
        .map(|bundle| &bundle.id)
    ),
    vec!["vendor", "styles"]
  );
  assert!(bundle_graph.get_parent_bundles(main).is_empty());
  assert!(!bundle_graph.has_parent_bundle_of_type(main, &FileType::Js));
}

#[test]
fn child_bundles_are_loaded_through_bundle_groups() {
  let bundle_graph = app();
  let main = bundle_graph.get_bundle_by_id("main").unwrap();
  let lazy = bundle_graph.get_bundle_by_id("lazy_bundle").unwrap();

  assert_eq!(
    ids(
      bundle_graph
        .get_child_bundles(main)
        .into_iter()
        .map(|bundle| &bundle.id)
    ),
    vec!["lazy_bundle"]
  );
  assert!(bundle_graph.has_parent_bundle_of_type(lazy, &FileType::Js));
  assert!(bundle_graph.validate().is_ok());
}

/// Runs `test` on a thread with a small stack so deep recursion fails loudly
fn on_small_stack(test: impl FnOnce() + Send + 'static) {
  std::thread::Builder::new()
    .stack_size(2 * 1024 * 1024)
    .spawn(test)
    .unwrap()
    .join()
    .unwrap();
}

#[test]
fn long_import_chains_are_walked_without_recursing() {
  const LENGTH: usize = 20_000;

  on_small_stack(|| {
    let mut fixture = BundleGraphFixture::new();
    let mut contents = Vec::new();
    for i in 0..LENGTH {
      let id = format!("a{i}");
      fixture = fixture.asset(js_asset(&id));
      if i > 0 {
        contents.push(id.clone());
      }

      let next = format!("a{}", i + 1);
      let dependency_id = format!("{id}->{next}");
      fixture = fixture.dependency(dependency(&dependency_id, &id, &format!("./{next}")));
      if i + 1 < LENGTH {
        fixture = fixture.resolve(&dependency_id, &next);
      }
      contents.push(dependency_id);
    }

    let contents = contents.iter().map(String::as_str).collect::<Vec<_>>();
    let bundle_graph = fixture
      .bundle(js_bundle("main", &["a0"], browser()), &contents)
      .build();
    let main = bundle_graph.get_bundle_by_id("main").unwrap();

    let last = format!("a{}->a{LENGTH}", LENGTH - 1);
    assert_eq!(
      ids(
        bundle_graph
          .get_external_dependencies(main)
          .into_iter()
          .map(|dependency| &dependency.id)
      ),
      vec![last]
    );
    assert_eq!(bundle_graph.get_bundle_assets(main).len(), LENGTH);
  });
}
