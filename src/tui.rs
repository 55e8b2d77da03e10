//! # 终端用户界面模块
//!
//! 基于 [ratatui](https://ratatui.rs/) 和 [crossterm](https://crates.io/crates/crossterm)
//! 管理终端的进入/退出，并在后台 tokio 任务中把终端事件和定时器转换为 [`Event`]。
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐
//! │   TuiEnum       │───▶│  Event Stream   │
//! │ (统一接口)       │    │  (异步事件)      │
//! └─────────────────┘    └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐    ┌─────────────────┐
//! │   Crossterm     │    │   TestBackend   │
//! │ (生产环境)       │    │  (测试环境)      │
//! └─────────────────┘    └─────────────────┘
//! ```
//!
//! ## 按键释放事件
//!
//! 扫码枪按"松开按键"判断输入结束。终端支持 kitty 键盘增强协议时，
//! [`Tui::enter`] 会请求 `REPORT_EVENT_TYPES`，此时按下与松开都会作为
//! [`Event::Key`] 发送（通过 `KeyEvent::kind` 区分）。
//! 同时请求 `REPORT_ALL_KEYS_AS_ESCAPE_CODES`（否则 Enter、Tab、Backspace
//! 不报告松开）和 `REPORT_ALTERNATE_KEYS`（按下与松开带相同的 Shift 字符）。
//! 不支持的终端只会收到按下事件，见 [`Tui::key_release_events`]。

use std::{
    io::{Stderr, stderr},
    ops::{Deref, DerefMut},
    time::Duration,
};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use futures::{FutureExt, StreamExt};
use ratatui::{
    Frame,
    backend::{CrosstermBackend, TestBackend},
    crossterm::{
        cursor,
        event::{
            DisableBracketedPaste, DisableFocusChange, EnableBracketedPaste, EnableFocusChange,
            Event as CrosstermEvent, KeyEvent, KeyboardEnhancementFlags,
            PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
        },
        terminal::{EnterAlternateScreen, LeaveAlternateScreen},
    },
};
use tokio::{
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// TUI事件枚举
#[derive(Clone, Debug)]
pub enum Event {
    /// 事件循环启动
    Init,

    /// 读取终端事件出错，通常导致程序退出
    Error,

    /// 定时 tick
    Tick,

    /// 触发重新渲染
    Render,

    /// 终端窗口获得焦点
    FocusGained,

    /// 终端窗口失去焦点
    FocusLost,

    /// 括号粘贴的文本
    Paste(String),

    /// 按键事件（按下、重复或松开）
    Key(KeyEvent),

    /// 终端大小变化
    Resize(u16, u16),
}

impl From<KeyCode> for Event {
    fn from(value: KeyCode) -> Self {
        Event::Key(KeyEvent::new(value, KeyModifiers::NONE))
    }
}
impl From<char> for Event {
    fn from(value: char) -> Self {
        Event::Key(KeyEvent::new(KeyCode::Char(value), KeyModifiers::NONE))
    }
}

/// 报告按键松开所需的键盘增强标志
fn key_release_flags() -> KeyboardEnhancementFlags {
    KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
        | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
        | KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
        | KeyboardEnhancementFlags::REPORT_ALTERNATE_KEYS
}

/// 为生产环境和测试环境提供统一接口
pub enum TuiEnum {
    Crossterm(Tui),
    #[allow(dead_code)]
    Test(TestTui),
}

impl From<Tui> for TuiEnum {
    fn from(tui: Tui) -> Self {
        TuiEnum::Crossterm(tui)
    }
}
impl From<TestTui> for TuiEnum {
    fn from(tui: TestTui) -> Self {
        TuiEnum::Test(tui)
    }
}
impl TuiEnum {
    pub fn enter(&mut self) -> Result<()> {
        match self {
            TuiEnum::Crossterm(tui) => tui.enter(),
            TuiEnum::Test(_) => Ok(()),
        }
    }

    pub fn exit(&mut self) -> Result<()> {
        match self {
            TuiEnum::Crossterm(tui) => tui.exit(),
            TuiEnum::Test(_) => Ok(()),
        }
    }

    /// 暂停进程（Ctrl-Z），进程恢复后重新进入 TUI 模式
    pub fn suspend(&mut self) -> Result<()> {
        match self {
            TuiEnum::Crossterm(tui) => {
                tui.suspend()?;
                tui.resume()
            }
            TuiEnum::Test(_) => Ok(()),
        }
    }

    pub async fn next(&mut self) -> Result<Event> {
        match self {
            TuiEnum::Crossterm(tui) => tui.next().await,
            TuiEnum::Test(_) => Ok(Event::Tick),
        }
    }

    pub fn draw(&mut self, f: impl FnOnce(&mut Frame)) -> Result<()> {
        match self {
            TuiEnum::Crossterm(tui) => tui.draw(f).map(|_| ()).map_err(Into::into),
            TuiEnum::Test(tui) => tui.draw(f).map(|_| ()).map_err(Into::into),
        }
    }
}

/// 生产环境TUI实现
pub struct Tui {
    pub terminal: ratatui::Terminal<CrosstermBackend<Stderr>>,
    pub task: JoinHandle<()>,
    pub cancellation_token: CancellationToken,
    pub event_rx: UnboundedReceiver<Event>,
    pub event_tx: UnboundedSender<Event>,
    pub frame_rate: f64,
    pub tick_rate: f64,
    pub paste: bool,
    pub focus_change: bool,
    key_release: bool,
}

impl Tui {
    pub fn new() -> Result<Self> {
        let tick_rate = 4.0;
        let frame_rate = 60.0;
        let terminal = ratatui::Terminal::new(CrosstermBackend::new(stderr()))?;
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let cancellation_token = CancellationToken::new();
        let task = tokio::spawn(async {});
        Ok(Self {
            terminal,
            task,
            cancellation_token,
            event_rx,
            event_tx,
            frame_rate,
            tick_rate,
            paste: false,
            focus_change: false,
            key_release: false,
        })
    }

    pub fn tick_rate(mut self, tick_rate: f64) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    pub fn frame_rate(mut self, frame_rate: f64) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    /// 启用括号粘贴模式
    pub fn paste(mut self, paste: bool) -> Self {
        self.paste = paste;
        self
    }

    /// 启用终端焦点变化事件（[`Event::FocusGained`] / [`Event::FocusLost`]）
    pub fn focus_change(mut self, focus_change: bool) -> Self {
        self.focus_change = focus_change;
        self
    }

    /// 查询终端是否支持键盘增强协议，支持时进入 TUI 后会报告按键松开事件
    pub fn detect_key_release(mut self) -> Self {
        self.key_release = crossterm::terminal::supports_keyboard_enhancement().unwrap_or(false);
        self
    }

    /// 终端是否会报告按键松开事件
    pub fn key_release_events(&self) -> bool {
        self.key_release
    }

    /// 启动后台事件循环
    pub fn start(&mut self) {
        let tick_delay = std::time::Duration::from_secs_f64(1.0 / self.tick_rate);
        let render_delay = std::time::Duration::from_secs_f64(1.0 / self.frame_rate);
        self.cancel();
        self.cancellation_token = CancellationToken::new();
        let _cancellation_token = self.cancellation_token.clone();
        let _event_tx = self.event_tx.clone();
        self.task = tokio::spawn(async move {
            let mut reader = crossterm::event::EventStream::new();
            let mut tick_interval = tokio::time::interval(tick_delay);
            let mut render_interval = tokio::time::interval(render_delay);
            if _event_tx.send(Event::Init).is_err() {
                return;
            }
            loop {
                let tick_delay = tick_interval.tick();
                let render_delay = render_interval.tick();
                let crossterm_event = reader.next().fuse();
                let event = tokio::select! {
                  _ = _cancellation_token.cancelled() => {
                    break;
                  }
                  maybe_event = crossterm_event => {
                    match maybe_event {
                      Some(Ok(evt)) => match evt {
                        CrosstermEvent::Key(key) => Event::Key(key),
                        // 鼠标捕获未开启
                        CrosstermEvent::Mouse(_) => continue,
                        CrosstermEvent::Resize(x, y) => Event::Resize(x, y),
                        CrosstermEvent::FocusLost => Event::FocusLost,
                        CrosstermEvent::FocusGained => Event::FocusGained,
                        CrosstermEvent::Paste(s) => Event::Paste(s),
                      },
                      Some(Err(_)) => Event::Error,
                      None => continue,
                    }
                  },
                  _ = tick_delay => Event::Tick,
                  _ = render_delay => Event::Render,
                };
                if _event_tx.send(event).is_err() {
                    break;
                }
            }
        });
    }

    /// 发送取消信号并等待后台任务结束，超时后强制中止
    pub fn stop(&self) -> Result<()> {
        self.cancel();
        let mut counter = 0;
        while !self.task.is_finished() {
            std::thread::sleep(Duration::from_millis(1));
            counter += 1;
            if counter > 50 {
                self.task.abort();
            }
            if counter > 100 {
                error!("Failed to abort task in 100 milliseconds for unknown reason");
                break;
            }
        }
        Ok(())
    }

    pub fn enter(&mut self) -> Result<()> {
        crossterm::terminal::enable_raw_mode()?;
        crossterm::execute!(std::io::stderr(), EnterAlternateScreen, cursor::Hide)?;
        if self.paste {
            crossterm::execute!(std::io::stderr(), EnableBracketedPaste)?;
        }
        if self.focus_change {
            crossterm::execute!(std::io::stderr(), EnableFocusChange)?;
        }
        if self.key_release {
            crossterm::execute!(
                std::io::stderr(),
                PushKeyboardEnhancementFlags(key_release_flags())
            )?;
        }
        info!(key_release = self.key_release, "entered terminal");
        self.start();
        Ok(())
    }

    pub fn exit(&mut self) -> Result<()> {
        self.stop()?;
        if crossterm::terminal::is_raw_mode_enabled()? {
            self.flush()?;
            if self.key_release {
                crossterm::execute!(std::io::stderr(), PopKeyboardEnhancementFlags)?;
            }
            if self.focus_change {
                crossterm::execute!(std::io::stderr(), DisableFocusChange)?;
            }
            if self.paste {
                crossterm::execute!(std::io::stderr(), DisableBracketedPaste)?;
            }
            crossterm::execute!(std::io::stderr(), LeaveAlternateScreen, cursor::Show)?;
            crossterm::terminal::disable_raw_mode()?;
        }
        Ok(())
    }

    pub fn cancel(&self) {
        self.cancellation_token.cancel();
    }

    /// 退出TUI模式并发送SIGTSTP信号暂停进程（仅Unix系统）
    pub fn suspend(&mut self) -> Result<()> {
        self.exit()?;
        #[cfg(not(windows))]
        signal_hook::low_level::raise(signal_hook::consts::signal::SIGTSTP)?;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        self.enter()?;
        self.terminal.clear()?;
        Ok(())
    }

    pub async fn next(&mut self) -> Result<Event> {
        self.event_rx
            .recv()
            .await
            .ok_or(color_eyre::eyre::eyre!("Unable to get event"))
    }
}

impl Deref for Tui {
    type Target = ratatui::Terminal<CrosstermBackend<Stderr>>;

    fn deref(&self) -> &Self::Target {
        &self.terminal
    }
}

impl DerefMut for Tui {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.terminal
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if let Err(e) = self.exit() {
            error!("Unable to exit Terminal: {:?}", e);
        }
    }
}

/// 测试环境TUI实现，基于内存中的虚拟终端
#[allow(dead_code)]
pub struct TestTui {
    pub terminal: ratatui::Terminal<TestBackend>,
}

impl TestTui {
    #[cfg(test)]
    pub fn new(width: u16, height: u16) -> Self {
        let terminal = ratatui::Terminal::new(TestBackend::new(width, height)).unwrap();
        Self { terminal }
    }
}

impl Deref for TestTui {
    type Target = ratatui::Terminal<TestBackend>;

    fn deref(&self) -> &Self::Target {
        &self.terminal
    }
}

impl DerefMut for TestTui {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.terminal
    }
}

#[cfg(test)]
impl TuiEnum {
    /// 获取测试后端的引用（仅测试环境）
    pub fn backend(&self) -> &TestBackend {
        match self {
            TuiEnum::Crossterm(_) => panic!("Not a test backend"),
            TuiEnum::Test(tui) => tui.backend(),
        }
    }
}
