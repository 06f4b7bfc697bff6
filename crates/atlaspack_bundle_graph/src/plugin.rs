pub use runtime_plugin::*;

mod runtime_plugin;
