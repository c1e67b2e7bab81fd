#[cfg(feature = "cli")]
pub mod cli;
pub mod runtime;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command};
pub use runtime::RuntimeConfig;
pub use toml_config::ClientConfig;
