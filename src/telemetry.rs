//! 控制台日志
//! 由 `Console::bootstrap` 安装；宿主进程已有 subscriber 时保持不动

use crate::config::LoggingConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// 本 crate 的日志 target
const CONSOLE_TARGET: &str = "ops_console_authz";

/// 未设置 RUST_LOG 时的过滤规则：本 crate 按配置级别，其它依赖只看 warn
fn default_directives(level: &str) -> String {
    format!("warn,{}={}", CONSOLE_TARGET, level.to_lowercase())
}

fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.level)))
}

/// 安装控制台日志，返回本次调用是否真正安装了 subscriber
pub fn init_telemetry(config: &LoggingConfig) -> bool {
    let layer = match config.format.to_lowercase().as_str() {
        // 守卫判定、保存结果等事件以结构化字段输出，便于按 role_id / decision 检索
        "json" => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .with_target(true)
            .boxed(),
        _ => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(false)
            .boxed(),
    };

    let installed = tracing_subscriber::registry()
        .with(build_filter(config))
        .with(layer)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(
            level = %config.level,
            format = %config.format,
            "Console logging installed"
        );
    }

    installed
}
