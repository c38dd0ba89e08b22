use shared::error::ErrorCode;
use shared::models::TableId;
use thiserror::Error;

/// Default table layout: four numbered tables and the to-go counter
pub const DEFAULT_TABLES: &str = "1,2,3,4,togo";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("POS_TABLES must list at least one table")]
    NoTables,

    #[error("Invalid table identifier in POS_TABLES: {0:?}")]
    InvalidTable(String),

    #[error("Duplicate table identifier in POS_TABLES: {0}")]
    DuplicateTable(TableId),
}

impl ConfigError {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::InvalidConfig
    }
}

/// 终端配置 - 所有配置项
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./pos-data | 工作目录 (数据库) |
/// | POS_DB_FILE | pos.redb | 数据库文件名 |
/// | POS_TABLES | 1,2,3,4,togo | 桌台列表 (显示顺序) |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | (未设置) | 日志目录, 按天滚动 |
/// | ENVIRONMENT | development | 运行环境 |
///
/// # 示例
///
/// ```ignore
/// POS_TABLES=1,2,3,4,5,6,togo WORK_DIR=/data/pos cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库文件
    pub work_dir: String,
    /// 数据库文件名 (相对于 work_dir)
    pub db_file: String,
    /// 桌台标识, 按显示顺序
    pub tables: Vec<TableId>,
    pub log_level: String,
    pub log_dir: Option<String>,
    /// 运行环境: development | production
    pub environment: String,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Result<Self, ConfigError> {
        let tables = std::env::var("POS_TABLES").unwrap_or_else(|_| DEFAULT_TABLES.into());
        Ok(Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./pos-data".into()),
            db_file: std::env::var("POS_DB_FILE").unwrap_or_else(|_| "pos.redb".into()),
            tables: parse_table_list(&tables)?,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        })
    }

    /// 使用指定桌台构建配置
    ///
    /// 常用于测试场景
    pub fn with_tables(work_dir: impl Into<String>, tables: Vec<TableId>) -> Self {
        Self {
            work_dir: work_dir.into(),
            db_file: "pos.redb".into(),
            tables,
            log_level: "info".into(),
            log_dir: None,
            environment: "development".into(),
        }
    }

    /// 数据库文件完整路径
    pub fn db_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.work_dir).join(&self.db_file)
    }
}

/// Parse a comma-separated table list, keeping its order
pub fn parse_table_list(raw: &str) -> Result<Vec<TableId>, ConfigError> {
    let mut tables = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let id: TableId = part
            .parse()
            .map_err(|_| ConfigError::InvalidTable(part.to_string()))?;
        if tables.contains(&id) {
            return Err(ConfigError::DuplicateTable(id));
        }
        tables.push(id);
    }
    if tables.is_empty() {
        return Err(ConfigError::NoTables);
    }
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_tables() {
        let tables = parse_table_list(DEFAULT_TABLES).unwrap();
        assert_eq!(
            tables,
            vec![
                TableId::Number(1),
                TableId::Number(2),
                TableId::Number(3),
                TableId::Number(4),
                TableId::ToGo,
            ]
        );
    }

    #[test]
    fn test_parse_keeps_order_and_ignores_blanks() {
        let tables = parse_table_list(" togo, 7 ,,3").unwrap();
        assert_eq!(tables, vec![TableId::ToGo, TableId::Number(7), TableId::Number(3)]);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_table_list(""), Err(ConfigError::NoTables));
        assert_eq!(
            parse_table_list("1,0"),
            Err(ConfigError::InvalidTable("0".into()))
        );
        assert_eq!(
            parse_table_list("1,patio"),
            Err(ConfigError::InvalidTable("patio".into()))
        );
        assert_eq!(
            parse_table_list("2,togo,2"),
            Err(ConfigError::DuplicateTable(TableId::Number(2)))
        );
        assert_eq!(ConfigError::NoTables.code(), ErrorCode::InvalidConfig);
    }

    #[test]
    fn test_with_tables() {
        let config = Config::with_tables("/tmp/pos", vec![TableId::ToGo]);
        assert_eq!(config.db_path(), std::path::Path::new("/tmp/pos/pos.redb"));
        assert_eq!(config.environment, "development");
    }
}
