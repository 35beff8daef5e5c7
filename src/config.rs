//! # 配置
//!
//! profile 目录与注册表清单路径的解析。优先级：命令行参数 > 环境变量
//! （由 clap 的 `env` 处理）> 默认值 `$HOME/.cwf`。
//!
//! ## 依赖关系
//! - 被 `main.rs` 和 `context.rs` 使用
//! - 使用 `dirs` 获取 home 目录

use crate::error::{CwfError, Result};
use std::path::PathBuf;

/// profile 目录名（位于 home 下）
const PROFILE_DIR_NAME: &str = ".cwf";

/// 注册表清单文件名（位于 profile 下）
const REGISTRY_FILE_NAME: &str = "entry_points.json";

/// 已解析的运行配置
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// 存放 `store.json` 的目录
    pub profile_dir: PathBuf,
    /// 插件注册表清单
    pub registry_file: PathBuf,
}

impl Config {
    pub fn resolve(profile_dir: Option<PathBuf>, registry_file: Option<PathBuf>) -> Result<Self> {
        let profile_dir = match profile_dir {
            Some(dir) => dir,
            None => dirs::home_dir()
                .map(|home| home.join(PROFILE_DIR_NAME))
                .ok_or_else(|| {
                    CwfError::InvalidArgument(
                        "cannot determine the home directory; pass --profile-dir".to_string(),
                    )
                })?,
        };
        let registry_file = registry_file.unwrap_or_else(|| profile_dir.join(REGISTRY_FILE_NAME));

        Ok(Config {
            profile_dir,
            registry_file,
        })
    }
}
