//! Shared utilities
//!
//! Logging setup and timing helpers used across the engine.

pub mod logger;
pub mod timer;

pub use logger::init_logger;
pub use timer::Timer;
