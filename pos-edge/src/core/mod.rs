//! 核心模块 - 终端配置
//!
//! - [`Config`] - 配置

pub mod config;

pub use config::{Config, ConfigError};
