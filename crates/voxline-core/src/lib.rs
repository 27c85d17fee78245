//! # Voxline Core
//! Shared configuration and error types.

pub mod config;
pub mod error;

pub use config::{CalendarConfig, GateConfig, PlatformConfig, ServerConfig, VoxlineConfig};
pub use error::{Result, VoxlineError};
