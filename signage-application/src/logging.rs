use tracing_subscriber::{EnvFilter, fmt};

/// 安装全局日志订阅者；`RUST_LOG` 优先，否则使用 `fallback`。重复调用无副作用。
pub fn init_logging(fallback: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = fmt().with_env_filter(filter).try_init();
}
