// error.rs - 外围层（配置 / 导出）的错误类型

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum GlobeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("config file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
}

