//! # 运行上下文
//!
//! 持有注册表与数据存储两个外部协作者，显式传入需要它们的组件。
//! 上下文在命令行解析完成后才构建，选项定义本身不依赖它。
//!
//! ## 依赖关系
//! - 被 `options/`（延迟计算）和 `commands/` 使用
//! - 使用 `config.rs`、`registry/`、`store/`

use crate::config::Config;
use crate::error::Result;
use crate::registry::{EntryPointSource, ManifestRegistry};
use crate::store::{JsonStore, Store};

pub struct Context {
    pub registry: Box<dyn EntryPointSource>,
    pub store: Box<dyn Store>,
}

impl Context {
    pub fn new(registry: Box<dyn EntryPointSource>, store: Box<dyn Store>) -> Self {
        Context { registry, store }
    }

    /// 按配置打开 JSON 清单注册表与 JSON 存储
    pub fn open(config: &Config) -> Result<Self> {
        let registry = ManifestRegistry::new(&config.registry_file);
        let store = JsonStore::open(&config.profile_dir)?;
        tracing::debug!(
            profile = %config.profile_dir.display(),
            registry = %registry.path().display(),
            "opened context"
        );
        Ok(Context::new(Box::new(registry), Box::new(store)))
    }
}
