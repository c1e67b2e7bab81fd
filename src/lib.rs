pub mod adapters;
pub mod api;
#[cfg(feature = "cli")]
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod pages;
pub mod state;
pub mod utils;

pub use adapters::{FilePreferenceStore, MemoryPreferenceStore};
pub use api::{ApiClient, BackendClient};
#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{ClientConfig, RuntimeConfig};
pub use crate::core::{Session, SessionOptions};
pub use domain::ports::{BookingApi, PreferenceStore};
pub use utils::error::{ClientError, Result};
