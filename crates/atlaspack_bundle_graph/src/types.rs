pub use self::asset::*;
pub use self::atlaspack_options::*;
pub use self::bundle::*;
pub use self::dependency::*;
pub use self::environment::*;
pub use self::file_type::*;
pub use self::json::*;
pub use self::symbol::*;
pub use self::target::*;

mod asset;
mod atlaspack_options;
mod bundle;
mod dependency;
pub mod environment;
mod file_type;
mod json;
mod symbol;
mod target;
