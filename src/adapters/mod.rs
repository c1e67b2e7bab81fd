// Adapters layer: concrete implementations for external systems (preference storage).

pub mod storage;

pub use storage::{FilePreferenceStore, MemoryPreferenceStore};
