use tracing_subscriber::EnvFilter;

/// 初始化 tracing，`RUST_LOG` 优先于 `filter`
///
/// 可以重复调用：已经初始化过时静默返回，测试里每个用例都能调用。
pub fn init_tracing(filter: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_test_writer()
        .try_init();
}
