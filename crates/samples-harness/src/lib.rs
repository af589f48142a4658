//! wasm 样例模块的测试 harness
//!
//! 用 wasmtime 加载 `wasm_samples.wasm`，提供 guest 导入的 host 函数并记录
//! guest 的调用，测试从 host 侧检查每个导出函数的所有权约定。

pub mod config;
pub mod host;
pub mod logging;
pub mod memory;
pub mod runner;

pub use crate::config::{ConfigLoader, HarnessConfig};
pub use crate::host::{HostState, SampleHost};
pub use crate::runner::SampleInstance;
