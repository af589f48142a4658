use samples_types::AbiError;
use thiserror::Error;

/// Guest 侧错误。只在 guest 内部用 `?` 传播，导出函数边界处转换成哨兵值。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuestError {
    #[error("Allocation of {size} bytes failed")]
    AllocationFailed { size: usize },

    #[error("Invalid length {length} for a buffer of capacity {capacity}")]
    InvalidLength { length: i32, capacity: usize },

    #[error("No NUL terminator within {capacity} bytes")]
    MissingTerminator { capacity: usize },

    #[error("Interior NUL byte at offset {position}")]
    InteriorNul { position: usize },

    #[error("Null pointer passed where an owned buffer was expected")]
    NullPointer,

    #[error(transparent)]
    Abi(#[from] AbiError),
}

pub type Result<T> = std::result::Result<T, GuestError>;
