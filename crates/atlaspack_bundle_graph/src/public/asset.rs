use std::ops::Deref;
use std::sync::Arc;

use super::view_cache::address;
use super::ViewCache;
use crate::types::{Asset, OptionsId};

#[derive(Debug)]
pub struct AssetView {
  asset: Arc<Asset>,
  options_id: OptionsId,
}

impl AssetView {
  pub fn new(asset: &Arc<Asset>, options_id: OptionsId) -> Arc<Self> {
    ViewCache::global().get_or_create(options_id, address(asset), || AssetView {
      asset: Arc::clone(asset),
      options_id,
    })
  }

  pub fn inner(&self) -> &Arc<Asset> {
    &self.asset
  }

  pub fn options_id(&self) -> OptionsId {
    self.options_id
  }
}

impl Deref for AssetView {
  type Target = Asset;

  fn deref(&self) -> &Self::Target {
    &self.asset
  }
}
