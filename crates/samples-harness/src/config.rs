use anyhow::{anyhow, Result};
use ::config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Harness 配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// 编译好的样例模块
    pub module_path: PathBuf,
    /// 单行 guest 输出的最大字节数，超出部分截断
    pub max_log_len: usize,
    /// `HostFuncWithBufferAndLength` 返回给 guest 的状态码
    pub buffer_status: i32,
    /// tracing 过滤规则，`RUST_LOG` 优先
    pub log_filter: String,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            module_path: PathBuf::from(concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/../../target/wasm32-unknown-unknown/release/wasm_samples.wasm"
            )),
            max_log_len: 4096,
            buffer_status: 0,
            log_filter: "info,wasm_guest=debug".to_string(),
        }
    }
}

impl HarnessConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_log_len == 0 {
            return Err(anyhow!("max_log_len must be greater than 0"));
        }
        Ok(())
    }
}

/// 配置加载器
///
/// 依次合并：默认值、`<config_dir>/harness.toml`（可选）、`SAMPLES_HARNESS_*` 环境变量。
pub struct ConfigLoader {
    config_dir: PathBuf,
}

impl ConfigLoader {
    pub const FILE_NAME: &'static str = "harness.toml";
    pub const ENV_PREFIX: &'static str = "SAMPLES_HARNESS";

    pub fn new<P: AsRef<Path>>(config_dir: P) -> Self {
        Self {
            config_dir: config_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self) -> Result<HarnessConfig> {
        let config_path = self.config_dir.join(Self::FILE_NAME);

        let mut builder = Config::builder();
        if config_path.exists() {
            builder = builder.add_source(File::new(
                config_path.to_str().ok_or_else(|| anyhow!("Invalid config path"))?,
                FileFormat::Toml,
            ));
        }
        builder = builder.add_source(Environment::with_prefix(Self::ENV_PREFIX).try_parsing(true));

        let config: HarnessConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}
