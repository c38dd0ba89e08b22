//! Venue point-of-sale core - 单店桌台/订单状态管理
//!
//! # 架构概述
//!
//! - **桌台账本** (`tables::ledger`): 桌台记录与状态机
//! - **营业额** (`tables::revenue`): 当日营业额累计
//! - **会话** (`tables::session`): 当前桌台选择与命令入口
//! - **持久化** (`tables::storage`): redb 快照存储
//!
//! # 模块结构
//!
//! ```text
//! pos-edge/src/
//! ├── core/          # 配置
//! ├── tables/        # 桌台状态机、营业额、会话、持久化
//! └── utils/         # 日志、输入校验
//! ```

pub mod core;
pub mod tables;
pub mod utils;

// Re-export 公共类型
pub use crate::core::{Config, ConfigError};
pub use tables::{
    PersistenceStore, PosError, PosResult, RedbStore, RevenueTracker, SessionController,
    SessionEvent, StartupSource, TableLedger, TableView,
};

// Re-export logger functions
pub use utils::logger::init_logger_with_file;

/// 设置运行环境: dotenv, 配置, 工作目录, 日志
pub fn setup_environment() -> anyhow::Result<Config> {
    dotenv::dotenv().ok();

    let config = Config::from_env()?;
    std::fs::create_dir_all(&config.work_dir)?;
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());

    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
    ____  ____  _____
   / __ \/ __ \/ ___/
  / /_/ / / / /\__ \
 / ____/ /_/ /___/ /
/_/    \____//____/
    "#
    );
}
