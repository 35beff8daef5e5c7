//! # 统一错误处理模块
//!
//! 定义 cwf 的所有错误类型，使用 `thiserror` 派生。
//!
//! 选项解析阶段（延迟默认值、延迟候选集、类型转换）产生的错误会直接
//! 传播到 `main`，在命令主体执行前终止本次调用。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// cwf 统一错误类型
#[derive(Error, Debug)]
pub enum CwfError {
    // ─────────────────────────────────────────────────────────────
    // 外部协作者错误（注册表 / 数据存储）
    // ─────────────────────────────────────────────────────────────
    #[error("Plugin registry is not accessible: {reason}")]
    RegistryAccess { reason: String },

    #[error("Data store is not available at {path}\nReason: {reason}")]
    StoreUnavailable { path: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // 结构构建错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to construct crystal: {0}")]
    GeometryConstruction(String),

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid value '{value}' for '{option}': choose one of {}", .choices.join(", "))]
    InvalidChoice {
        option: String,
        value: String,
        choices: Vec<String>,
    },

    #[error("Missing required option '{option}'")]
    MissingRequiredOption { option: String },

    #[error("Invalid value for '{param}': {message}")]
    BadParameter { param: String, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Usage(String),

    #[error("{kind} not found: {identifier}")]
    NotFound { kind: String, identifier: String },

    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {path}")]
    Serialization {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, CwfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_choice_lists_choices() {
        let err = CwfError::InvalidChoice {
            option: "relaxation-type".to_string(),
            value: "bogus".to_string(),
            choices: vec!["atoms".to_string(), "cell".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("'bogus'"));
        assert!(msg.contains("atoms, cell"));
    }
}
