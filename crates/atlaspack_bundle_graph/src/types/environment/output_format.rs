use serde::Deserialize;
use serde::Serialize;

/// The module convention of the emitted bundle
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
  /// Classic script that registers its modules on a global registry
  #[default]
  Global,
  CommonJS,
  EsModule,
}
