//! wasm 样例模块的 guest 侧支持
//!
//! - [`host`]: host 提供的函数，统一放在 [`Host`] trait 后面
//! - [`memory`]: 带头部的分配器和标明所有权的 buffer
//! - [`descriptor`]: 指针 + 长度的字符串约定
//! - [`logging`]: `host_print!` 和分级日志宏

pub mod descriptor;
pub mod error;
pub mod host;
pub mod logging;
pub mod macros;
pub mod memory;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{GuestError, Result};
pub use host::Host;
#[cfg(target_arch = "wasm32")]
pub use host::ImportedHost;
pub use memory::{OwnedBuffer, OwnedCStr};
pub use samples_types::{GuestString, LogLevel};
