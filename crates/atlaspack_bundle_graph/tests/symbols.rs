use atlaspack_bundle_graph::bundle_graph::ResolvedSymbol;
use atlaspack_bundle_graph::types::{Asset, ExportSymbol, STAR_SYMBOL};
use atlaspack_bundle_graph::BundleGraph;
use atlaspack_test_fixtures::*;
use pretty_assertions::assert_eq;

fn reexporting(id: &str, exports: &[(&str, &str, &str)]) -> Asset {
  Asset {
    symbols: exports
      .iter()
      .map(|(exported, asset, symbol)| (exported.to_string(), ExportSymbol::reexport(*asset, *symbol)))
      .collect(),
    ..js_asset(id)
  }
}

/// `index` re-exports everything from `lib1` then `lib2`
fn wildcards() -> BundleGraph {
  BundleGraphFixture::new()
    .asset(asset_exporting("index", &["own"]))
    .asset(asset_exporting("lib1", &["one", "default"]))
    .asset(asset_exporting("lib2", &["two", "one"]))
    .dependency(wildcard_dependency("index->lib1", "index", "./lib1"))
    .dependency(wildcard_dependency("index->lib2", "index", "./lib2"))
    .resolve("index->lib1", "lib1")
    .resolve("index->lib2", "lib2")
    .build()
}

fn asset<'a>(bundle_graph: &'a BundleGraph, id: &str) -> &'a Asset {
  bundle_graph.get_asset_by_id(id).unwrap()
}

#[test]
fn follows_reexport_chains_to_the_defining_asset() {
  let bundle_graph = BundleGraphFixture::new()
    .asset(reexporting("index", &[("foo", "middle", "bar")]))
    .asset(reexporting("middle", &[("bar", "lib", "baz")]))
    .asset(asset_exporting("lib", &["baz"]))
    .build();

  let resolution = bundle_graph.resolve_symbol(asset(&bundle_graph, "index"), "foo");

  assert_eq!(resolution.asset.id, "lib");
  assert_eq!(resolution.export_symbol, "baz");
  assert_eq!(resolution.symbol, ResolvedSymbol::Local("baz".into()));
}

#[test]
fn reexport_cycles_resolve_dynamically() {
  let bundle_graph = BundleGraphFixture::new()
    .asset(reexporting("a", &[("x", "b", "x")]))
    .asset(reexporting("b", &[("x", "a", "x")]))
    .build();

  let resolution = bundle_graph.resolve_symbol(asset(&bundle_graph, "a"), "x");

  assert!(resolution.is_dynamic());
  assert_eq!(resolution.asset.id, "a");
}

#[test]
fn tries_wildcard_reexports_in_declaration_order() {
  let bundle_graph = wildcards();
  let index = asset(&bundle_graph, "index");

  assert_eq!(bundle_graph.resolve_symbol(index, "one").asset.id, "lib1");
  assert_eq!(bundle_graph.resolve_symbol(index, "two").asset.id, "lib2");

  let unknown = bundle_graph.resolve_symbol(index, "three");
  assert!(unknown.is_dynamic());
  assert_eq!(unknown.asset.id, "index");
}

#[test]
fn wildcards_do_not_forward_default_exports() {
  let bundle_graph = wildcards();
  let resolution = bundle_graph.resolve_symbol(asset(&bundle_graph, "index"), "default");

  assert!(resolution.is_dynamic());
  assert_eq!(resolution.asset.id, "index");
}

#[test]
fn the_namespace_symbol_is_always_dynamic() {
  let bundle_graph = wildcards();
  let resolution = bundle_graph.resolve_symbol(asset(&bundle_graph, "lib1"), STAR_SYMBOL);

  assert_eq!(resolution.symbol, ResolvedSymbol::Dynamic);
  assert_eq!(resolution.asset.id, "lib1");
}

#[test]
fn lists_direct_then_wildcard_exports_once() {
  let bundle_graph = wildcards();

  let exported = bundle_graph
    .get_exported_symbols(asset(&bundle_graph, "index"))
    .into_iter()
    .map(|resolution| (resolution.export_symbol, resolution.asset.id.clone()))
    .collect::<Vec<_>>();

  assert_eq!(
    exported,
    vec![
      (String::from("own"), String::from("index")),
      (String::from("one"), String::from("lib1")),
      (String::from("two"), String::from("lib2")),
    ]
  );
}

#[test]
fn wildcard_cycles_are_listed_once() {
  let bundle_graph = BundleGraphFixture::new()
    .asset(asset_exporting("a", &["x"]))
    .asset(asset_exporting("b", &["y"]))
    .dependency(wildcard_dependency("a->b", "a", "./b"))
    .dependency(wildcard_dependency("b->a", "b", "./a"))
    .resolve("a->b", "b")
    .resolve("b->a", "a")
    .build();

  let exported = bundle_graph
    .get_exported_symbols(asset(&bundle_graph, "a"))
    .into_iter()
    .map(|resolution| resolution.export_symbol)
    .collect::<Vec<_>>();

  assert_eq!(exported, vec!["x", "y"]);
}

#[test]
fn long_reexport_chains_resolve_without_recursing() {
  const LENGTH: usize = 20_000;

  std::thread::Builder::new()
    .stack_size(2 * 1024 * 1024)
    .spawn(|| {
      let mut fixture = BundleGraphFixture::new();
      for i in 0..LENGTH {
        let next = format!("a{}", i + 1);
        fixture = fixture.asset(reexporting(&format!("a{i}"), &[("x", &next, "x")]));
      }
      let last = format!("a{LENGTH}");
      let bundle_graph = fixture.asset(asset_exporting(&last, &["x"])).build();

      let resolution = bundle_graph.resolve_symbol(asset(&bundle_graph, "a0"), "x");

      assert_eq!(resolution.asset.id, last);
      assert_eq!(resolution.symbol, ResolvedSymbol::Local("x".into()));
    })
    .unwrap()
    .join()
    .unwrap();
}
