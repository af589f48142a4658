use samples_guest_sdk::Host;
use samples_types::limits::HOST_BUFFER_PAYLOAD;

/// `PassBufferAndLengthToHost`: 把一段静态数据借给 host，返回 host 的状态码
pub fn pass_buffer_and_length_to_host<H: Host>(host: &H) -> i32 {
    host.receive_buffer(HOST_BUFFER_PAYLOAD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use samples_guest_sdk::testing::RecordingHost;

    #[test]
    fn test_host_receives_hello_world() {
        let host = RecordingHost::new();
        assert_eq!(pass_buffer_and_length_to_host(&host), 0);
        assert_eq!(host.received(), vec![b"Hello World!".to_vec()]);
        assert_eq!(host.received()[0].len(), 12);
    }

    #[test]
    fn test_host_status_is_returned() {
        let host = RecordingHost::new().with_buffer_status(-7);
        assert_eq!(pass_buffer_and_length_to_host(&host), -7);
    }
}
