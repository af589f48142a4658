use thiserror::Error;

/// 边界数据编解码错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
    #[error("Payload too large for a length prefix: {0} bytes")]
    PayloadTooLarge(usize),

    #[error("Negative length in prefix header: {0}")]
    NegativeLength(i32),

    #[error("Buffer too short: need {needed} bytes, got {actual}")]
    Truncated { needed: usize, actual: usize },
}
