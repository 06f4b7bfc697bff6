use std::ops::Deref;
use std::sync::Arc;

use super::view_cache::address;
use super::ViewCache;
use crate::types::{Dependency, OptionsId};

#[derive(Debug)]
pub struct DependencyView {
  dependency: Arc<Dependency>,
  options_id: OptionsId,
}

impl DependencyView {
  pub fn new(dependency: &Arc<Dependency>, options_id: OptionsId) -> Arc<Self> {
    ViewCache::global().get_or_create(options_id, address(dependency), || DependencyView {
      dependency: Arc::clone(dependency),
      options_id,
    })
  }

  pub fn inner(&self) -> &Arc<Dependency> {
    &self.dependency
  }

  pub fn options_id(&self) -> OptionsId {
    self.options_id
  }
}

impl Deref for DependencyView {
  type Target = Dependency;

  fn deref(&self) -> &Self::Target {
    &self.dependency
  }
}
