//! wasm 导出函数
//!
//! 只把调用转发给 `entry` 或各样例模块，host 固定为 [`ImportedHost`]。

#![allow(non_snake_case)]

use std::os::raw::c_char;

use samples_guest_sdk::{GuestString, ImportedHost};

use crate::{entry, hello, host_function, run_wasm, rust_samples};

const HOST: ImportedHost = ImportedHost;

#[no_mangle]
pub extern "C" fn Hello() -> i32 {
    hello::hello(&HOST)
}

/// # Safety
///
/// 见 [`entry::hello_world`]。
#[no_mangle]
pub unsafe extern "C" fn HelloWorld(msg: *const c_char) -> i32 {
    entry::hello_world(&HOST, msg)
}

#[no_mangle]
pub extern "C" fn PassBufferAndLengthToHost() -> i32 {
    host_function::pass_buffer_and_length_to_host(&HOST)
}

#[no_mangle]
pub extern "C" fn CalcFib(n: i32) -> i32 {
    run_wasm::calc_fib(n)
}

/// # Safety
///
/// 见 [`entry::receive_byte_array`]。
#[no_mangle]
pub unsafe extern "C" fn ReceiveByteArray(data: *mut u8, length: i32) -> *mut u8 {
    entry::receive_byte_array(&HOST, data, length)
}

/// # Safety
///
/// 见 [`entry::wasm_print_using_host_print`]。
#[no_mangle]
pub unsafe extern "C" fn WasmPrintUsingHostPrint(msg: *mut c_char) -> i32 {
    entry::wasm_print_using_host_print(&HOST, msg)
}

#[no_mangle]
pub extern "C" fn PrintHelloWorld() {
    run_wasm::print_hello_world(&HOST)
}

/// # Safety
///
/// 见 [`entry::print`]。
#[no_mangle]
pub unsafe extern "C" fn Print(msg: *mut c_char) {
    entry::print(&HOST, msg)
}

/// # Safety
///
/// 见 [`entry::echo`]。
#[no_mangle]
pub unsafe extern "C" fn Echo(msg: *mut c_char) -> *mut c_char {
    entry::echo(msg)
}

/// # Safety
///
/// 见 [`entry::to_upper`]。
#[no_mangle]
pub unsafe extern "C" fn ToUpper(msg: *mut c_char) -> *mut c_char {
    entry::to_upper(msg)
}

/// # Safety
///
/// 见 [`entry::print_upper`]。
#[no_mangle]
pub unsafe extern "C" fn PrintUpper(msg: *mut c_char) {
    entry::print_upper(&HOST, msg)
}

#[no_mangle]
pub extern "C" fn KeepCPUBusy(ms: i32) -> i32 {
    run_wasm::keep_cpu_busy(&HOST, ms)
}

/// # Safety
///
/// 见 [`entry::guest_echo`]。
#[no_mangle]
pub unsafe extern "C" fn guest_echo(msg: *mut GuestString, ret: *mut GuestString) {
    entry::guest_echo(&HOST, msg, ret)
}

#[no_mangle]
pub extern "C" fn hello_world() -> i32 {
    rust_samples::hello_world(&HOST)
}

#[no_mangle]
pub extern "C" fn add(left: usize, right: usize) -> usize {
    rust_samples::add(left, right)
}

#[no_mangle]
pub extern "C" fn call_host_function(a: i32) -> i32 {
    rust_samples::call_host_function(&HOST, a)
}

#[no_mangle]
pub extern "C" fn simd_test() -> i32 {
    rust_samples::simd_test()
}
