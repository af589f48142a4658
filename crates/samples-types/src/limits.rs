//! 样例模块的编译期常量

/// `KeepCPUBusy` 每轮计算的 Fibonacci 输入
pub const BUSY_LOOP_FIB_INPUT: i32 = 10;

/// 忙循环计数器到达此值后归零
pub const BUSY_LOOP_COUNTER_LIMIT: i32 = i32::MAX;

/// `HelloWorld` 分配的临时 buffer 大小
pub const SCRATCH_BUFFER_SIZE: usize = 1024;

/// `HelloWorld` 写进临时 buffer 的内容
pub const SCRATCH_CONTENTS: &str = "1234";

/// `PassBufferAndLengthToHost` 借给 host 的静态数据，不带 NUL
pub const HOST_BUFFER_PAYLOAD: &[u8] = b"Hello World!";
