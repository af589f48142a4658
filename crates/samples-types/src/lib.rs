//! 样例模块与测试 harness 共用的 ABI
//!
//! 只有纯数据：导出/导入函数的名字和签名、长度头编解码、字符串描述符布局。
//! guest 和 host 两侧都依赖这个 crate。

pub mod abi;
pub mod descriptor;
pub mod error;
pub mod level;
pub mod limits;
pub mod prefix;

pub use abi::{
    find_export, ExportSpec, ImportSpec, Ownership, ValType, EXPORTS, IMPORTS, IMPORT_MODULE,
};
pub use descriptor::{GuestString, WasmStringDescriptor};
pub use error::AbiError;
pub use level::LogLevel;
pub use prefix::{decode_header, encode_header, split_prefixed, LENGTH_PREFIX_SIZE};
