use std::time::Instant;

use anyhow::{Context, Result};
use samples_types::abi::import;
use samples_types::{LogLevel, IMPORT_MODULE};
use wasmtime::{Caller, Config, Engine, Linker, Module, Store};

use crate::memory;
use crate::HarnessConfig;

/// 每个 store 的 host 状态：记录 guest 调用 host 函数时传来的数据
#[derive(Debug)]
pub struct HostState {
    started: Instant,
    max_log_len: usize,
    buffer_status: i32,
    output: Vec<String>,
    received: Vec<Vec<u8>>,
}

impl HostState {
    pub fn new(config: &HarnessConfig) -> Self {
        Self {
            started: Instant::now(),
            max_log_len: config.max_log_len,
            buffer_status: config.buffer_status,
            output: Vec::new(),
            received: Vec::new(),
        }
    }

    /// 所有 `HostPrint` 输出，按调用顺序
    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }

    /// 所有 `HostFuncWithBufferAndLength` 收到的 buffer
    pub fn received(&self) -> &[Vec<u8>] {
        &self.received
    }

    pub fn set_buffer_status(&mut self, status: i32) {
        self.buffer_status = status;
    }

    fn elapsed_us(&self) -> i64 {
        i64::try_from(self.started.elapsed().as_micros()).unwrap_or(i64::MAX)
    }
}

pub struct SampleHost {
    engine: Engine,
    config: HarnessConfig,
}

impl SampleHost {
    pub fn new(config: HarnessConfig) -> Result<Self> {
        let mut wasm_config = Config::new();
        wasm_config.cranelift_opt_level(wasmtime::OptLevel::Speed);

        let engine = Engine::new(&wasm_config)?;
        Ok(Self { engine, config })
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn load_module(&self, wasm_bytes: &[u8]) -> Result<Module> {
        Module::new(&self.engine, wasm_bytes)
    }

    /// 加载配置里的样例模块
    pub fn load_configured_module(&self) -> Result<Module> {
        Module::from_file(&self.engine, &self.config.module_path).with_context(|| {
            format!(
                "Failed to load sample module from {:?}",
                self.config.module_path
            )
        })
    }

    /// 为新实例准备一个干净的 store
    pub fn create_store(&self) -> Store<HostState> {
        Store::new(&self.engine, HostState::new(&self.config))
    }

    /// 注册样例模块导入的全部 host 函数
    pub fn create_linker(&self) -> Result<Linker<HostState>> {
        let mut linker = Linker::new(&self.engine);

        linker
            .func_wrap(IMPORT_MODULE, import::HOST_PRINT, Self::host_print)
            .with_context(|| format!("Failed to register {}", import::HOST_PRINT))?;

        linker
            .func_wrap(
                IMPORT_MODULE,
                import::HOST_FUNC_WITH_BUFFER_AND_LENGTH,
                Self::host_func_with_buffer_and_length,
            )
            .with_context(|| {
                format!("Failed to register {}", import::HOST_FUNC_WITH_BUFFER_AND_LENGTH)
            })?;

        linker
            .func_wrap(
                IMPORT_MODULE,
                import::GET_TIME_SINCE_BOOT_MICROSECOND,
                |caller: Caller<'_, HostState>| -> i64 { caller.data().elapsed_us() },
            )
            .with_context(|| {
                format!("Failed to register {}", import::GET_TIME_SINCE_BOOT_MICROSECOND)
            })?;

        linker
            .func_wrap(IMPORT_MODULE, import::TEST_HOST_FUNC, |a: i32| -> i32 {
                tracing::debug!("TestHostFunc called with {}", a);
                a.wrapping_add(1)
            })
            .with_context(|| format!("Failed to register {}", import::TEST_HOST_FUNC))?;

        Ok(linker)
    }

    /// `HostPrint`: 读取 guest 字符串，记录下来并转发到 tracing
    ///
    /// 带 `[LEVEL] ` 前缀的行按对应级别输出，其余按 INFO。返回打印的字节数，出错返回 -1。
    fn host_print(mut caller: Caller<'_, HostState>, ptr: i32) -> i32 {
        let memory = match caller.get_export("memory") {
            Some(wasmtime::Extern::Memory(mem)) => mem,
            _ => {
                tracing::error!("Wasm guest: failed to get memory export");
                return -1;
            }
        };

        let max_len = caller.data().max_log_len;
        let bytes = match memory::read_c_string(&memory, &caller, ptr, max_len) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!("Invalid string in HostPrint: {:#}", e);
                return -1;
            }
        };

        let text = String::from_utf8_lossy(&bytes).into_owned();
        let line = text.trim_end_matches('\n');
        match LogLevel::parse_line(line) {
            Some((LogLevel::Trace, msg)) => tracing::trace!(target: "wasm_guest", "{}", msg),
            Some((LogLevel::Debug, msg)) => tracing::debug!(target: "wasm_guest", "{}", msg),
            Some((LogLevel::Info, msg)) => tracing::info!(target: "wasm_guest", "{}", msg),
            Some((LogLevel::Warn, msg)) => tracing::warn!(target: "wasm_guest", "{}", msg),
            Some((LogLevel::Error, msg)) => tracing::error!(target: "wasm_guest", "{}", msg),
            None => tracing::info!(target: "wasm_guest", "{}", line),
        }

        let written = i32::try_from(bytes.len()).unwrap_or(i32::MAX);
        caller.data_mut().output.push(text);
        written
    }

    /// `HostFuncWithBufferAndLength`: 借用 guest 的 buffer，复制一份记录下来
    fn host_func_with_buffer_and_length(
        mut caller: Caller<'_, HostState>,
        ptr: i32,
        len: i32,
    ) -> i32 {
        let memory = match caller.get_export("memory") {
            Some(wasmtime::Extern::Memory(mem)) => mem,
            _ => {
                tracing::error!("Wasm guest: failed to get memory export");
                return -1;
            }
        };

        let bytes = match memory::read_bytes(&memory, &caller, ptr, len) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!("Invalid buffer in HostFuncWithBufferAndLength: {:#}", e);
                return -1;
            }
        };

        tracing::debug!(
            "Host function received buffer: {} ({} bytes)",
            String::from_utf8_lossy(&bytes),
            len
        );
        caller.data_mut().received.push(bytes);
        caller.data().buffer_status
    }
}
