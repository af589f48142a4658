//! 带长度头的 buffer：4 字节本机字节序 `i32` 长度头，后面跟 payload

use crate::AbiError;

/// 长度头大小
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// 为 `len` 字节的 payload 编码长度头
pub fn encode_header(len: usize) -> Result<[u8; LENGTH_PREFIX_SIZE], AbiError> {
    let len = i32::try_from(len).map_err(|_| AbiError::PayloadTooLarge(len))?;
    Ok(len.to_ne_bytes())
}

/// 从长度头解出 payload 长度
pub fn decode_header(header: [u8; LENGTH_PREFIX_SIZE]) -> Result<usize, AbiError> {
    let len = i32::from_ne_bytes(header);
    usize::try_from(len).map_err(|_| AbiError::NegativeLength(len))
}

/// 拆开一整块带长度头的 buffer，返回 payload
///
/// 声明长度之后的多余字节被忽略。
pub fn split_prefixed(buf: &[u8]) -> Result<&[u8], AbiError> {
    let header: [u8; LENGTH_PREFIX_SIZE] = buf
        .get(..LENGTH_PREFIX_SIZE)
        .and_then(|h| h.try_into().ok())
        .ok_or(AbiError::Truncated {
            needed: LENGTH_PREFIX_SIZE,
            actual: buf.len(),
        })?;
    let len = decode_header(header)?;
    let needed = LENGTH_PREFIX_SIZE + len;
    buf.get(LENGTH_PREFIX_SIZE..needed).ok_or(AbiError::Truncated {
        needed,
        actual: buf.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_is_native_i32() {
        assert_eq!(encode_header(3).unwrap(), 3i32.to_ne_bytes());
        assert_eq!(decode_header(258i32.to_ne_bytes()).unwrap(), 258);
    }

    #[test]
    fn test_payload_too_large() {
        let too_big = i32::MAX as usize + 1;
        assert_eq!(encode_header(too_big), Err(AbiError::PayloadTooLarge(too_big)));
    }

    #[test]
    fn test_negative_header_rejected() {
        assert_eq!(
            decode_header((-1i32).to_ne_bytes()),
            Err(AbiError::NegativeLength(-1))
        );
    }

    #[test]
    fn test_split_prefixed() {
        let mut buf = 3i32.to_ne_bytes().to_vec();
        buf.extend_from_slice(&[0x01, 0x02, 0x03, 0xff]);
        assert_eq!(split_prefixed(&buf).unwrap(), &[0x01, 0x02, 0x03]);
    }

    #[test]
    fn test_split_truncated() {
        assert_eq!(
            split_prefixed(&[0x00, 0x01]),
            Err(AbiError::Truncated { needed: 4, actual: 2 })
        );

        let mut buf = 8i32.to_ne_bytes().to_vec();
        buf.extend_from_slice(b"abc");
        assert_eq!(
            split_prefixed(&buf),
            Err(AbiError::Truncated { needed: 12, actual: 7 })
        );
    }

    #[test]
    fn test_empty_payload() {
        let buf = encode_header(0).unwrap();
        assert!(split_prefixed(&buf).unwrap().is_empty());
    }
}
