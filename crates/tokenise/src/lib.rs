//! tokenise library: Exposes the command-line components for testing.
//!
//! This is a thin library layer over the binary, allowing integration tests
//! to drive the interactive session with a scripted provider.

pub mod analysis;
pub mod commands;
pub mod config;
pub mod download;
pub mod providers;
pub mod session;
pub mod sink;

// Re-export key types for convenience
pub use commands::{dispatch, Action, MenuEntry, MENU};
pub use config::{Config, ConfigError};
pub use providers::{build_provider, Prediction, PredictionProvider};
pub use session::{fill_mask, Session};
pub use sink::JsonSink;
