use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use super::{AssetView, BundleGraphView, BundleView, DependencyView};
use crate::types::OptionsId;

type ViewMap<V> = HashMap<<V as CachedView>::Key, Arc<V>>;

static VIEW_CACHE: Lazy<ViewCache> = Lazy::new(ViewCache::default);

/// Views created under one set of options, keyed by the addresses of the values they wrap
#[derive(Default)]
pub(crate) struct Partition {
  assets: ViewMap<AssetView>,
  bundles: ViewMap<BundleView>,
  bundle_graphs: ViewMap<BundleGraphView>,
  dependencies: ViewMap<DependencyView>,
}

impl Partition {
  fn len(&self) -> usize {
    self.assets.len() + self.bundles.len() + self.bundle_graphs.len() + self.dependencies.len()
  }
}

/// Address of a shared value, used as a cache key
pub(crate) fn address<T>(value: &Arc<T>) -> usize {
  Arc::as_ptr(value) as *const () as usize
}

pub(crate) trait CachedView: Sized + Send + Sync + 'static {
  type Key: Copy + Eq + Hash;

  fn views(partition: &Partition) -> &ViewMap<Self>;
  fn views_mut(partition: &mut Partition) -> &mut ViewMap<Self>;
}

macro_rules! cached_view {
  ($view:ty, $key:ty, $field:ident) => {
    impl CachedView for $view {
      type Key = $key;

      fn views(partition: &Partition) -> &ViewMap<Self> {
        &partition.$field
      }

      fn views_mut(partition: &mut Partition) -> &mut ViewMap<Self> {
        &mut partition.$field
      }
    }
  };
}

cached_view!(AssetView, usize, assets);
// A bundle is viewed through the graph it belongs to, and cloned graphs share bundles
cached_view!(BundleView, (usize, usize), bundles);
cached_view!(BundleGraphView, usize, bundle_graphs);
cached_view!(DependencyView, usize, dependencies);

/// Hands out one view per (options, wrapped values) pair
///
/// Each [`crate::types::AtlaspackOptions`] registers a partition when it is
/// created and releases it when dropped. Views hold on to the value they wrap,
/// so an address cannot be reused while its entry is alive. Keys are built
/// with [`address`].
#[derive(Default)]
pub struct ViewCache {
  partitions: RwLock<HashMap<OptionsId, Partition>>,
}

impl ViewCache {
  pub fn global() -> &'static ViewCache {
    &VIEW_CACHE
  }

  pub fn register(&self, options_id: OptionsId) {
    self.partitions.write().entry(options_id).or_default();
  }

  pub fn release(&self, options_id: OptionsId) {
    let partition = self.partitions.write().remove(&options_id);

    // Dropped outside the lock, views may own the last reference to a graph
    if let Some(partition) = partition {
      tracing::trace!(%options_id, views = partition.len(), "Released view cache partition");
      drop(partition);
    }
  }

  pub fn is_registered(&self, options_id: OptionsId) -> bool {
    self.partitions.read().contains_key(&options_id)
  }

  /// Number of views cached for a set of options
  pub fn view_count(&self, options_id: OptionsId) -> usize {
    self
      .partitions
      .read()
      .get(&options_id)
      .map_or(0, Partition::len)
  }

  /// Returns the cached view under `key`, creating it with `create` on first use
  ///
  /// Views requested for options that are not registered, for example after
  /// the options were dropped, are created fresh and not cached.
  pub(crate) fn get_or_create<V>(
    &self,
    options_id: OptionsId,
    key: V::Key,
    create: impl FnOnce() -> V,
  ) -> Arc<V>
  where
    V: CachedView,
  {
    if let Some(view) = self
      .partitions
      .read()
      .get(&options_id)
      .and_then(|partition| V::views(partition).get(&key))
    {
      return Arc::clone(view);
    }

    let mut partitions = self.partitions.write();
    let Some(partition) = partitions.get_mut(&options_id) else {
      tracing::debug!(%options_id, "Creating uncached view for unregistered options");
      return Arc::new(create());
    };

    Arc::clone(
      V::views_mut(partition)
        .entry(key)
        .or_insert_with(|| Arc::new(create())),
    )
  }
}
