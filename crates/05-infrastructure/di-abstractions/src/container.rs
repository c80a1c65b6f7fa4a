//! 容器配置和统计信息

use crate::scope::ROOT_SCOPE_TAG;
use infrastructure_common::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, error};

/// 环境变量前缀
pub const ENV_PREFIX: &str = "ADSP_DI";

/// 容器配置
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// 根作用域标签
    pub root_scope_tag: String,
    /// 是否为每次激活创建 tracing span
    pub trace_activations: bool,
    /// 是否收集解析统计信息
    pub collect_stats: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            root_scope_tag: ROOT_SCOPE_TAG.to_string(),
            trace_activations: false,
            collect_stats: true,
        }
    }
}

impl ContainerConfig {
    /// 从配置文件和 `ADSP_DI_*` 环境变量加载配置
    ///
    /// 文件格式由扩展名决定（toml 或 json）。
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        debug!("加载容器配置: {}", path.display());
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| {
                error!("配置构建失败: {}", e);
                ConfigError::parse_error(e)
            })?;

        let config: Self = settings.try_deserialize().map_err(ConfigError::parse_error)?;
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 字符串解析配置
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::parse_error)?;
        config.validate()?;
        Ok(config)
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.root_scope_tag.trim().is_empty() {
            return Err(ConfigError::validation_error("root_scope_tag 不能为空"));
        }
        Ok(())
    }

    /// 设置根作用域标签
    pub fn with_root_scope_tag(mut self, tag: impl Into<String>) -> Self {
        self.root_scope_tag = tag.into();
        self
    }

    /// 设置是否跟踪激活
    pub fn with_trace_activations(mut self, enabled: bool) -> Self {
        self.trace_activations = enabled;
        self
    }

    /// 设置是否收集统计信息
    pub fn with_collect_stats(mut self, enabled: bool) -> Self {
        self.collect_stats = enabled;
        self
    }
}

/// 容器统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContainerStats {
    /// 已注册组件数量
    pub registered_components: usize,
    /// 顶层解析请求数量
    pub resolve_requests: u64,
    /// 成功解析数量
    pub successful_resolutions: u64,
    /// 未注册的探测次数
    pub not_registered: u64,
    /// 解析错误数量
    pub resolution_errors: u64,
    /// 其中的循环依赖数量
    pub circular_dependencies: u64,
}
