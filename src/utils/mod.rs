//! # 工具模块集合
//!
//! ```text
//! utils/
//! ├── errors.rs     - 错误处理和 Panic Hook 配置
//! ├── help_msg.rs   - 底部快捷键帮助栏
//! ├── key_events.rs - 按键事件封装、按键名称解析
//! ├── logging.rs    - tracing 日志配置
//! └── mod.rs        - 模块导出声明
//! ```
//!
//! `errors` 与 `logging` 只在程序启动时调用，
//! 统计代码覆盖率时通过 `#[cfg(not(tarpaulin_include))]` 排除。

#[cfg(not(tarpaulin_include))]
pub(crate) mod errors;
pub(crate) mod help_msg;
pub(crate) mod key_events;
#[cfg(not(tarpaulin_include))]
pub(crate) mod logging;
