//! Logging utilities.
//!
//! Centralizes logger initialization. Library code logs through the `log`
//! facade only; `env_logger` is installed by the binary via `init_logging`.

mod init;

pub use init::{DEFAULT_FILTER, LoggingConfig, init_logging};
