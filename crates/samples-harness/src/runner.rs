//! 加载样例模块并按各导出函数的所有权约定调用
//!
//! Host 侧的规则：
//! - 传给 guest 的 buffer 一律用 guest 的 `malloc` 分配
//! - guest 借用的参数，调用结束后由 host 用 `free` 释放
//! - guest 接管的参数，host 不再释放
//! - guest 返回的 buffer，host 读取后用 `free` / `guest_string_free` 释放

use anyhow::{anyhow, bail, Context, Result};
use samples_types::abi::export;
use samples_types::{ExportSpec, ValType, WasmStringDescriptor, EXPORTS};
use wasmtime::{ExternType, Instance, Memory, Module, Store, TypedFunc, WasmParams, WasmResults};

use crate::host::{HostState, SampleHost};
use crate::memory;

pub struct SampleInstance {
    store: Store<HostState>,
    instance: Instance,
    memory: Memory,
    malloc: TypedFunc<i32, i32>,
    free: TypedFunc<i32, ()>,
    max_string_len: usize,
}

fn wasm_type(ty: &wasmtime::ValType) -> Option<ValType> {
    match ty {
        wasmtime::ValType::I32 => Some(ValType::I32),
        wasmtime::ValType::I64 => Some(ValType::I64),
        _ => None,
    }
}

/// 检查模块的导出是否与注册表一致
pub fn check_exports(module: &Module) -> Result<()> {
    for spec in EXPORTS {
        check_export(module, spec)?;
    }
    Ok(())
}

fn check_export(module: &Module, spec: &ExportSpec) -> Result<()> {
    let func = match module.get_export(spec.name) {
        Some(ExternType::Func(func)) => func,
        Some(_) => bail!("Export '{}' is not a function", spec.name),
        None => bail!("Sample module must export '{}'", spec.name),
    };

    let params: Vec<_> = func.params().map(|t| wasm_type(&t)).collect();
    let results: Vec<_> = func.results().map(|t| wasm_type(&t)).collect();
    let expected_params: Vec<_> = spec.params.iter().copied().map(Some).collect();
    let expected_results: Vec<_> = spec.results.iter().copied().map(Some).collect();

    if params != expected_params || results != expected_results {
        bail!(
            "Export '{}' has signature {:?} -> {:?}, expected {:?} -> {:?}",
            spec.name,
            params,
            results,
            spec.params,
            spec.results
        );
    }
    Ok(())
}

impl SampleInstance {
    /// 用配置里的模块路径加载并实例化
    pub fn load(host: &SampleHost) -> Result<Self> {
        let module = host.load_configured_module()?;
        Self::instantiate(host, &module)
    }

    pub fn instantiate(host: &SampleHost, module: &Module) -> Result<Self> {
        check_exports(module)?;

        let linker = host.create_linker()?;
        let mut store = host.create_store();
        let instance = linker
            .instantiate(&mut store, module)
            .context("Failed to instantiate sample module")?;

        let memory = instance
            .get_memory(&mut store, "memory")
            .context("Sample module must export 'memory'")?;
        let malloc = instance
            .get_typed_func::<i32, i32>(&mut store, export::MALLOC)
            .context("Sample module must export 'malloc' function")?;
        let free = instance
            .get_typed_func::<i32, ()>(&mut store, export::FREE)
            .context("Sample module must export 'free' function")?;

        Ok(Self {
            store,
            instance,
            memory,
            malloc,
            free,
            max_string_len: host.config().max_log_len.max(64 * 1024),
        })
    }

    pub fn state(&self) -> &HostState {
        self.store.data()
    }

    pub fn state_mut(&mut self) -> &mut HostState {
        self.store.data_mut()
    }

    /// 当前线性内存大小（字节）
    pub fn memory_size(&self) -> usize {
        self.memory.data_size(&self.store)
    }

    fn func<P: WasmParams, R: WasmResults>(&mut self, name: &str) -> Result<TypedFunc<P, R>> {
        self.instance
            .get_typed_func::<P, R>(&mut self.store, name)
            .with_context(|| format!("Sample module must export '{}' function", name))
    }

    /// 调用任意导出函数
    pub fn call<P: WasmParams, R: WasmResults>(&mut self, name: &str, params: P) -> Result<R> {
        let func = self.func::<P, R>(name)?;
        func.call(&mut self.store, params)
            .with_context(|| format!("Call to '{}' failed", name))
    }

    fn write_c_string(&mut self, s: &str) -> Result<i32> {
        memory::write_c_string(&self.memory, &mut self.store, &self.malloc, s)
    }

    fn read_string(&self, ptr: i32) -> Result<String> {
        let bytes = memory::read_c_string(&self.memory, &self.store, ptr, self.max_string_len)?;
        String::from_utf8(bytes).context("Guest returned a non-UTF-8 string")
    }

    fn free(&mut self, ptr: i32) -> Result<()> {
        self.free.call(&mut self.store, ptr).context("Guest free failed")
    }

    /// 调用一个借用字符串参数的导出：调用结束后 host 自己释放参数
    fn call_with_borrowed_string<R: WasmResults>(&mut self, name: &str, msg: &str) -> Result<R> {
        let ptr = self.write_c_string(msg)?;
        let result = self.call::<i32, R>(name, ptr);
        let freed = self.free(ptr);

        // 优先返回调用本身的错误
        let value = result?;
        freed?;
        Ok(value)
    }

    pub fn hello(&mut self) -> Result<i32> {
        self.call(export::HELLO, ())
    }

    pub fn hello_world(&mut self, msg: &str) -> Result<i32> {
        self.call_with_borrowed_string(export::HELLO_WORLD, msg)
    }

    pub fn pass_buffer_and_length_to_host(&mut self) -> Result<i32> {
        self.call(export::PASS_BUFFER_AND_LENGTH_TO_HOST, ())
    }

    pub fn calc_fib(&mut self, n: i32) -> Result<i32> {
        self.call(export::CALC_FIB, n)
    }

    /// guest 接管 `data`，返回带长度头的新 buffer；host 读出 payload 后释放它
    pub fn receive_byte_array(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        let len = i32::try_from(data.len()).context("Buffer too large for wasm32")?;
        self.receive_byte_array_with_len(data, len)
    }

    /// 同上，但长度参数由调用方指定
    pub fn receive_byte_array_with_len(&mut self, data: &[u8], length: i32) -> Result<Vec<u8>> {
        self.try_receive_byte_array(data, length)?
            .ok_or_else(|| anyhow!("ReceiveByteArray returned null"))
    }

    /// guest 返回空指针时得到 `Ok(None)`
    pub fn try_receive_byte_array(&mut self, data: &[u8], length: i32) -> Result<Option<Vec<u8>>> {
        let ptr = memory::write_bytes(&self.memory, &mut self.store, &self.malloc, data)?;
        let out = self.call::<(i32, i32), i32>(export::RECEIVE_BYTE_ARRAY, (ptr, length))?;
        if out == 0 {
            return Ok(None);
        }
        let payload = memory::read_length_prefixed(&self.memory, &self.store, out)?;
        self.free(out)?;
        Ok(Some(payload))
    }

    /// guest 接管 `msg`
    pub fn wasm_print_using_host_print(&mut self, msg: &str) -> Result<i32> {
        let ptr = self.write_c_string(msg)?;
        self.call(export::WASM_PRINT_USING_HOST_PRINT, ptr)
    }

    pub fn print_hello_world(&mut self) -> Result<()> {
        self.call(export::PRINT_HELLO_WORLD, ())
    }

    /// guest 接管 `msg`
    pub fn print(&mut self, msg: &str) -> Result<()> {
        let ptr = self.write_c_string(msg)?;
        self.call(export::PRINT, ptr)
    }

    /// guest 把同一块 buffer 交还给 host；返回内容和是否保持了指针身份
    pub fn echo(&mut self, msg: &str) -> Result<(String, bool)> {
        let ptr = self.write_c_string(msg)?;
        let out = self.call::<i32, i32>(export::ECHO, ptr)?;
        if out == 0 {
            bail!("Echo returned null");
        }
        let text = self.read_string(out)?;
        self.free(out)?;
        Ok((text, out == ptr))
    }

    /// 原地转大写。所有权不变，host 读取后释放自己的 buffer。空字符串得到 `None`。
    pub fn to_upper(&mut self, msg: &str) -> Result<Option<String>> {
        let ptr = self.write_c_string(msg)?;
        let out = self.call::<i32, i32>(export::TO_UPPER, ptr);

        let result = match out {
            Ok(0) => Ok(None),
            Ok(out) if out == ptr => self.read_string(out).map(Some),
            Ok(out) => Err(anyhow!("ToUpper returned {} instead of its argument {}", out, ptr)),
            Err(e) => Err(e),
        };
        self.free(ptr)?;
        result
    }

    /// guest 接管 `msg`
    pub fn print_upper(&mut self, msg: &str) -> Result<()> {
        let ptr = self.write_c_string(msg)?;
        self.call(export::PRINT_UPPER, ptr)
    }

    pub fn keep_cpu_busy(&mut self, ms: i32) -> Result<i32> {
        self.call(export::KEEP_CPU_BUSY, ms)
    }

    /// 描述符约定的 echo：host 分配输入描述符和数据，guest 释放输入数据并写出
    /// 新的描述符；host 读取后用 `guest_string_free` 释放返回数据，
    /// 最后释放两个描述符本身
    pub fn guest_echo(&mut self, msg: &str) -> Result<String> {
        let data =
            memory::write_bytes(&self.memory, &mut self.store, &self.malloc, msg.as_bytes())?;
        let len = u32::try_from(msg.len()).context("String too large for wasm32")?;
        let zeroed = [0u8; WasmStringDescriptor::SIZE];

        let input = memory::write_bytes(&self.memory, &mut self.store, &self.malloc, &zeroed)?;
        memory::write_descriptor(
            &self.memory,
            &mut self.store,
            input,
            WasmStringDescriptor { ptr: data as u32, len },
        )?;
        let output = memory::write_bytes(&self.memory, &mut self.store, &self.malloc, &zeroed)?;

        self.call::<(i32, i32), ()>(export::GUEST_ECHO, (input, output))?;

        let consumed = memory::read_descriptor(&self.memory, &self.store, input)?;
        if consumed != WasmStringDescriptor::default() {
            bail!("guest_echo did not release its input descriptor: {:?}", consumed);
        }

        let returned = memory::read_descriptor(&self.memory, &self.store, output)?;
        if returned.is_null() {
            bail!("guest_echo returned a null descriptor");
        }
        let bytes = memory::read_bytes(
            &self.memory,
            &self.store,
            returned.ptr as i32,
            returned.len as i32,
        )?;

        self.call::<i32, ()>(export::GUEST_STRING_FREE, output)?;
        self.free(input)?;
        self.free(output)?;

        String::from_utf8(bytes).context("guest_echo returned a non-UTF-8 string")
    }

    pub fn rust_hello_world(&mut self) -> Result<i32> {
        self.call(export::RUST_HELLO_WORLD, ())
    }

    pub fn add(&mut self, left: i32, right: i32) -> Result<i32> {
        self.call(export::ADD, (left, right))
    }

    pub fn call_host_function(&mut self, a: i32) -> Result<i32> {
        self.call(export::CALL_HOST_FUNCTION, a)
    }

    pub fn simd_test(&mut self) -> Result<i32> {
        self.call(export::SIMD_TEST, ())
    }
}
