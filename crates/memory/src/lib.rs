//! Client-side persistence for Cartmanify.
//!
//! Two generic key-value stores ([`InMemoryStore`], [`FileStore`]) and the
//! two things kept in them: the bounded [`HistoryLog`] and the
//! [`SensorPreference`].

pub mod file_backend;
pub mod history;
pub mod in_memory;
pub mod preferences;

pub use file_backend::FileStore;
pub use history::{DEFAULT_HISTORY_CAPACITY, HISTORY_KEY, HistoryLog};
pub use in_memory::InMemoryStore;
pub use preferences::{SENSOR_LEVEL_KEY, SensorPreference};
