//! Guest 样例函数
//!
//! 每个模块是一组样例的逻辑，对 [`Host`](samples_guest_sdk::Host) 泛型。
//! `entry` 负责裸指针与所有权句柄之间的转换，`exports` 是只在 wasm32 上编译的
//! `extern "C"` 薄包装。
//!
//! 构建：`cargo build -p wasm_samples --target wasm32-unknown-unknown --release`

use samples_guest_sdk::export_guest_alloc;

pub mod component;
pub mod entry;
pub mod hello;
pub mod host_function;
pub mod run_wasm;
pub mod rust_samples;

#[cfg(target_arch = "wasm32")]
mod exports;

export_guest_alloc!();
