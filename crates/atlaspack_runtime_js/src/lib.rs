pub use js_runtime::*;
pub use loaders::*;

mod js_runtime;
mod loaders;
