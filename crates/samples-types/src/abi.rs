//! 导出函数注册表
//!
//! 每个导出函数的名字、wasm 层面的参数/返回类型以及内存所有权约定。
//! Guest 通过 `#[export_name]` 导出这些函数，harness 在加载模块时用这张表校验。

/// Host 导入函数所在的 wasm 模块名
pub const IMPORT_MODULE: &str = "env";

/// wasm 层面的值类型。指针在 wasm32 上是 i32。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValType {
    I32,
    I64,
}

/// 跨边界 buffer 的所有权约定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// 只有标量参数，没有 buffer 跨边界
    None,
    /// Host 保留所有权，guest 只在调用期间读取
    Borrowed,
    /// Guest 接管参数并负责释放
    TakesArgument,
    /// 返回值的所有权转移给调用方
    TransfersResult,
    /// 接管参数，并把新分配的返回值交给调用方
    TakesArgumentTransfersResult,
    /// 原地修改，所有权不变
    InPlace,
}

impl Ownership {
    /// 调用方是否需要用 `free` 释放返回的 buffer
    pub fn caller_frees_result(self) -> bool {
        matches!(
            self,
            Ownership::TransfersResult | Ownership::TakesArgumentTransfersResult
        )
    }

    /// 调用结束后参数 buffer 是否已被 guest 释放
    pub fn guest_frees_argument(self) -> bool {
        matches!(
            self,
            Ownership::TakesArgument | Ownership::TakesArgumentTransfersResult
        )
    }
}

/// 一个导出函数的签名
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSpec {
    pub name: &'static str,
    pub params: &'static [ValType],
    pub results: &'static [ValType],
    pub ownership: Ownership,
}

/// 一个 host 提供的导入函数的签名
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSpec {
    pub name: &'static str,
    pub params: &'static [ValType],
    pub results: &'static [ValType],
}

pub mod export {
    pub const HELLO: &str = "Hello";
    pub const HELLO_WORLD: &str = "HelloWorld";
    pub const PASS_BUFFER_AND_LENGTH_TO_HOST: &str = "PassBufferAndLengthToHost";
    pub const CALC_FIB: &str = "CalcFib";
    pub const RECEIVE_BYTE_ARRAY: &str = "ReceiveByteArray";
    pub const WASM_PRINT_USING_HOST_PRINT: &str = "WasmPrintUsingHostPrint";
    pub const PRINT_HELLO_WORLD: &str = "PrintHelloWorld";
    pub const PRINT: &str = "Print";
    pub const ECHO: &str = "Echo";
    pub const TO_UPPER: &str = "ToUpper";
    pub const PRINT_UPPER: &str = "PrintUpper";
    pub const KEEP_CPU_BUSY: &str = "KeepCPUBusy";
    pub const GUEST_ECHO: &str = "guest_echo";
    pub const GUEST_STRING_FREE: &str = "guest_string_free";
    pub const RUST_HELLO_WORLD: &str = "hello_world";
    pub const ADD: &str = "add";
    pub const CALL_HOST_FUNCTION: &str = "call_host_function";
    pub const SIMD_TEST: &str = "simd_test";
    pub const MALLOC: &str = "malloc";
    pub const FREE: &str = "free";
}

pub mod import {
    pub const HOST_PRINT: &str = "HostPrint";
    pub const HOST_FUNC_WITH_BUFFER_AND_LENGTH: &str = "HostFuncWithBufferAndLength";
    pub const GET_TIME_SINCE_BOOT_MICROSECOND: &str = "GetTimeSinceBootMicrosecond";
    pub const TEST_HOST_FUNC: &str = "TestHostFunc";
}

use ValType::{I32, I64};

/// 所有导出函数。顺序与样例源文件一致。
pub static EXPORTS: &[ExportSpec] = &[
    ExportSpec {
        name: export::HELLO,
        params: &[],
        results: &[I32],
        ownership: Ownership::None,
    },
    ExportSpec {
        name: export::HELLO_WORLD,
        params: &[I32],
        results: &[I32],
        ownership: Ownership::Borrowed,
    },
    ExportSpec {
        name: export::PASS_BUFFER_AND_LENGTH_TO_HOST,
        params: &[],
        results: &[I32],
        ownership: Ownership::None,
    },
    ExportSpec {
        name: export::CALC_FIB,
        params: &[I32],
        results: &[I32],
        ownership: Ownership::None,
    },
    ExportSpec {
        name: export::RECEIVE_BYTE_ARRAY,
        params: &[I32, I32],
        results: &[I32],
        ownership: Ownership::TakesArgumentTransfersResult,
    },
    ExportSpec {
        name: export::WASM_PRINT_USING_HOST_PRINT,
        params: &[I32],
        results: &[I32],
        ownership: Ownership::TakesArgument,
    },
    ExportSpec {
        name: export::PRINT_HELLO_WORLD,
        params: &[],
        results: &[],
        ownership: Ownership::None,
    },
    ExportSpec {
        name: export::PRINT,
        params: &[I32],
        results: &[],
        ownership: Ownership::TakesArgument,
    },
    ExportSpec {
        name: export::ECHO,
        params: &[I32],
        results: &[I32],
        ownership: Ownership::TransfersResult,
    },
    ExportSpec {
        name: export::TO_UPPER,
        params: &[I32],
        results: &[I32],
        ownership: Ownership::InPlace,
    },
    ExportSpec {
        name: export::PRINT_UPPER,
        params: &[I32],
        results: &[],
        ownership: Ownership::TakesArgument,
    },
    ExportSpec {
        name: export::KEEP_CPU_BUSY,
        params: &[I32],
        results: &[I32],
        ownership: Ownership::None,
    },
    ExportSpec {
        name: export::GUEST_ECHO,
        params: &[I32, I32],
        results: &[],
        ownership: Ownership::TakesArgumentTransfersResult,
    },
    ExportSpec {
        name: export::GUEST_STRING_FREE,
        params: &[I32],
        results: &[],
        ownership: Ownership::TakesArgument,
    },
    ExportSpec {
        name: export::RUST_HELLO_WORLD,
        params: &[],
        results: &[I32],
        ownership: Ownership::None,
    },
    ExportSpec {
        name: export::ADD,
        params: &[I32, I32],
        results: &[I32],
        ownership: Ownership::None,
    },
    ExportSpec {
        name: export::CALL_HOST_FUNCTION,
        params: &[I32],
        results: &[I32],
        ownership: Ownership::None,
    },
    ExportSpec {
        name: export::SIMD_TEST,
        params: &[],
        results: &[I32],
        ownership: Ownership::None,
    },
    ExportSpec {
        name: export::MALLOC,
        params: &[I32],
        results: &[I32],
        ownership: Ownership::TransfersResult,
    },
    ExportSpec {
        name: export::FREE,
        params: &[I32],
        results: &[],
        ownership: Ownership::TakesArgument,
    },
];

/// 所有 host 导入函数，都在 [`IMPORT_MODULE`] 下
pub static IMPORTS: &[ImportSpec] = &[
    ImportSpec {
        name: import::HOST_PRINT,
        params: &[I32],
        results: &[I32],
    },
    ImportSpec {
        name: import::HOST_FUNC_WITH_BUFFER_AND_LENGTH,
        params: &[I32, I32],
        results: &[I32],
    },
    ImportSpec {
        name: import::GET_TIME_SINCE_BOOT_MICROSECOND,
        params: &[],
        results: &[I64],
    },
    ImportSpec {
        name: import::TEST_HOST_FUNC,
        params: &[I32],
        results: &[I32],
    },
];

/// 按名字查找导出函数
pub fn find_export(name: &str) -> Option<&'static ExportSpec> {
    EXPORTS.iter().find(|spec| spec.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_export_names_are_unique() {
        let names: HashSet<_> = EXPORTS.iter().map(|s| s.name).collect();
        assert_eq!(names.len(), EXPORTS.len());
    }

    #[test]
    fn test_find_export() {
        let spec = find_export("ReceiveByteArray").unwrap();
        assert_eq!(spec.params, &[ValType::I32, ValType::I32]);
        assert!(spec.ownership.caller_frees_result());
        assert!(spec.ownership.guest_frees_argument());

        assert!(find_export("NoSuchExport").is_none());
    }

    #[test]
    fn test_in_place_and_borrowed_keep_ownership() {
        for name in ["ToUpper", "HelloWorld"] {
            let ownership = find_export(name).unwrap().ownership;
            assert!(!ownership.caller_frees_result());
            assert!(!ownership.guest_frees_argument());
        }
    }

    #[test]
    fn test_simd_test_export() {
        let spec = find_export(export::SIMD_TEST).unwrap();
        assert!(spec.params.is_empty());
        assert_eq!(spec.results, &[ValType::I32]);
        assert!(!spec.ownership.caller_frees_result());
    }

    #[test]
    fn test_clock_import_returns_i64() {
        let clock = IMPORTS
            .iter()
            .find(|i| i.name == import::GET_TIME_SINCE_BOOT_MICROSECOND)
            .unwrap();
        assert!(clock.params.is_empty());
        assert_eq!(clock.results, &[ValType::I64]);
    }
}
