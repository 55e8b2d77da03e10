//! # 错误处理和 Panic 配置模块
//!
//! 安装 color-eyre 的错误报告钩子，并替换默认的 panic hook。
//!
//! panic 时的处理顺序：
//!
//! ```text
//! 发生 Panic
//!     │
//!     ├─ 1. 退出 TUI 模式，恢复终端（原始模式、备用屏幕）
//!     ├─ 2. 通过 tracing 把去掉 ANSI 转义的报告写入日志
//!     ├─ 3. Debug: better-panic 完整堆栈
//!     │     Release: human-panic 生成崩溃转储并提示用户
//!     └─ 4. 以 EXIT_FAILURE 退出
//! ```
//!
//! 崩溃提示（panic section 与 human-panic 的 support 信息）指向
//! 数据目录下的日志文件 `scan_capture.log`。
//!
//! `trace_dbg!` 宏与 `std::dbg!` 用法相同，但输出到 tracing 日志而不是 stderr，
//! 因为 stderr 正被 TUI 占用。

use color_eyre::Result;
use tracing::error;

use super::logging::LOG_FILE;

/// Where to find details of a crash, the data directory is listed by `--version`.
fn crash_note() -> String {
    format!(
        "{} crashed. Please attach `{}` from the data directory and, if possible, \
         the key sequence that was being scanned when reporting it to {}.",
        env!("CARGO_PKG_NAME"),
        LOG_FILE.as_str(),
        env!("CARGO_PKG_AUTHORS"),
    )
}

pub fn init() -> Result<()> {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .panic_section(crash_note())
        .capture_span_trace_by_default(false)
        .display_location_section(false)
        .display_env_section(false)
        .into_hooks();
    eyre_hook.install()?;
    std::panic::set_hook(Box::new(move |panic_info| {
        if let Ok(mut t) = crate::tui::Tui::new() {
            if let Err(r) = t.exit() {
                error!("Unable to exit Terminal: {:?}", r);
            }
        }

        #[cfg(not(debug_assertions))]
        {
            use human_panic::{handle_dump, metadata, print_msg};
            let metadata = metadata!().support(crash_note());
            let file_path = handle_dump(&metadata, panic_info);
            // prints human-panic message
            print_msg(file_path, &metadata)
                .expect("human-panic: printing error message to console failed");
            eprintln!("{}", panic_hook.panic_report(panic_info)); // prints color-eyre stack trace to stderr
        }
        let msg = format!("{}", panic_hook.panic_report(panic_info));
        error!("Error: {}", strip_ansi_escapes::strip_str(msg));

        #[cfg(debug_assertions)]
        {
            // Better Panic stacktrace that is only enabled when debugging.
            better_panic::Settings::auto()
                .most_recent_first(false)
                .lineno_suffix(true)
                .verbosity(better_panic::Verbosity::Full)
                .create_panic_handler()(panic_info);
        }

        std::process::exit(libc::EXIT_FAILURE);
    }));
    Ok(())
}

/// Similar to the `std::dbg!` macro, but generates `tracing` events rather
/// than printing to stdout.
///
/// By default, the verbosity level for the generated events is `DEBUG`, but
/// this can be customized.
#[macro_export]
macro_rules! trace_dbg {
        (target: $target:expr, level: $level:expr, $ex:expr) => {
            {
                match $ex {
                        value => {
                                tracing::event!(target: $target, $level, ?value, stringify!($ex));
                                value
                        }
                }
            }
        };
        (level: $level:expr, $ex:expr) => {
                trace_dbg!(target: module_path!(), level: $level, $ex)
        };
        (target: $target:expr, $ex:expr) => {
                trace_dbg!(target: $target, level: tracing::Level::DEBUG, $ex)
        };
        ($ex:expr) => {
                trace_dbg!(level: tracing::Level::DEBUG, $ex)
        };
}
