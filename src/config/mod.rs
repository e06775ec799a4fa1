//! Run configuration.
//!
//! - [`SimConfig`]: validated settings of one run
//! - [`load_configs`]: a single file or every `*.toml` in a folder
//! - [`ConfigError`]: missing keys, bad values, unreadable files

mod error;
mod sim_config;

pub use error::ConfigError;
pub use sim_config::{SimConfig, SpillConfig, load_configs};
