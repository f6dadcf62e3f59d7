mod loader;
mod types;

pub use loader::{ConfigError, load_from_env};
pub use types::HarnessConfig;
