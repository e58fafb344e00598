//! Console capture and the log overlay panel.
//!
//! Printing to the terminal mid-frame corrupts a TUI, so diagnostics go
//! through [`Console`] instead: a reactive, capped message list. While a
//! console is active it also serves as the `log` facade's backend, so
//! `log::info!` and friends land in the overlay rather than on the screen.
//! The driver renders the messages as a bottom panel toggled with Ctrl-L
//! and cleared with Ctrl-K.

use std::sync::{Arc, Once, PoisonError, RwLock};

use chrono::{DateTime, Local};

use crate::reactive::{create_signal, ReadSignal, WriteSignal};
use crate::style::Style;
use crate::vnode::{Props, VNode};

/// Severity of a console message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl ConsoleLevel {
    fn label(self) -> &'static str {
        match self {
            ConsoleLevel::Debug => "DEBUG",
            ConsoleLevel::Info => "INFO",
            ConsoleLevel::Warn => "WARN",
            ConsoleLevel::Error => "ERROR",
        }
    }
}

/// One captured message.
#[derive(Debug, Clone)]
pub struct ConsoleMessage {
    pub timestamp: DateTime<Local>,
    pub level: ConsoleLevel,
    pub text: String,
}

/// Format a message for the overlay: `[HH:MM:SS.mmm] LEVEL text`.
pub fn format_message(message: &ConsoleMessage) -> String {
    format!(
        "[{}] {:<5} {}",
        message.timestamp.format("%H:%M:%S%.3f"),
        message.level.label(),
        message.text
    )
}

// ---------------------------------------------------------------------------
// Console
// ---------------------------------------------------------------------------

/// A reactive, capped capture of console output.
pub struct Console {
    messages: ReadSignal<Vec<ConsoleMessage>>,
    set_messages: WriteSignal<Vec<ConsoleMessage>>,
    max_messages: usize,
}

static ACTIVE: RwLock<Option<Arc<Console>>> = RwLock::new(None);
static INSTALL_LOGGER: Once = Once::new();

impl Console {
    /// Create a console, make it the active capture target, and install the
    /// `log` facade backend (once per process).
    pub fn start(max_messages: usize) -> Arc<Console> {
        let max_messages = if max_messages == 0 { 1000 } else { max_messages };
        let (messages, set_messages) = create_signal(Vec::new());
        let console = Arc::new(Console { messages, set_messages, max_messages });

        INSTALL_LOGGER.call_once(|| {
            // A second logger may already be installed by the host program;
            // capture still works through the direct methods.
            let _ = log::set_boxed_logger(Box::new(FacadeLogger));
            log::set_max_level(log::LevelFilter::Debug);
        });
        *ACTIVE.write().unwrap_or_else(PoisonError::into_inner) = Some(console.clone());
        console
    }

    /// Stop capturing: facade logging is dropped until another console
    /// starts.
    pub fn stop(&self) {
        *ACTIVE.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// The captured messages (reactive read).
    pub fn messages(&self) -> Vec<ConsoleMessage> {
        self.messages.get()
    }

    /// Number of captured messages (reactive read).
    pub fn len(&self) -> usize {
        self.messages.with(Vec::len)
    }

    /// Whether nothing has been captured (reactive read).
    pub fn is_empty(&self) -> bool {
        self.messages.with(Vec::is_empty)
    }

    /// Append a message, trimming the oldest past the cap.
    pub fn log(&self, level: ConsoleLevel, text: impl Into<String>) {
        let message =
            ConsoleMessage { timestamp: Local::now(), level, text: text.into() };
        let max = self.max_messages;
        self.set_messages.update(|messages| {
            messages.push(message);
            if messages.len() > max {
                let excess = messages.len() - max;
                messages.drain(..excess);
            }
        });
    }

    pub fn debug(&self, text: impl Into<String>) {
        self.log(ConsoleLevel::Debug, text);
    }

    pub fn info(&self, text: impl Into<String>) {
        self.log(ConsoleLevel::Info, text);
    }

    pub fn warn(&self, text: impl Into<String>) {
        self.log(ConsoleLevel::Warn, text);
    }

    pub fn error(&self, text: impl Into<String>) {
        self.log(ConsoleLevel::Error, text);
    }

    /// Drop all captured messages.
    pub fn clear(&self) {
        self.set_messages.set(Vec::new());
    }
}

/// `log` facade backend forwarding into the active console.
struct FacadeLogger;

impl log::Log for FacadeLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        ACTIVE.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    fn log(&self, record: &log::Record) {
        let console = ACTIVE.read().unwrap_or_else(PoisonError::into_inner).clone();
        if let Some(console) = console {
            let level = match record.level() {
                log::Level::Error => ConsoleLevel::Error,
                log::Level::Warn => ConsoleLevel::Warn,
                log::Level::Info => ConsoleLevel::Info,
                log::Level::Debug | log::Level::Trace => ConsoleLevel::Debug,
            };
            console.log(level, record.args().to_string());
        }
    }

    fn flush(&self) {}
}

// ---------------------------------------------------------------------------
// Overlay panel
// ---------------------------------------------------------------------------

/// Wrap the app's tree with the console panel when visible.
///
/// The panel is an absolutely-positioned bordered box across the bottom
/// third of the screen (at least 6 rows) listing the most recent messages,
/// warnings in yellow and errors in red.
pub fn build_overlay(
    app_content: VNode,
    console: &Arc<Console>,
    visible: bool,
    width: i32,
    height: i32,
) -> VNode {
    if !visible {
        return app_content;
    }

    let messages = console.messages();
    let panel_height = (height / 3).max(6);
    let panel_y = height - panel_height;
    // Border, padding, and the header leave this many message lines.
    let max_lines = (panel_height - 4).max(1) as usize;

    let visible_messages: &[ConsoleMessage] = if messages.len() > max_lines {
        &messages[messages.len() - max_lines..]
    } else {
        &messages
    };

    let mut children = Vec::with_capacity(visible_messages.len() + 1);
    children.push(VNode::element(
        "text",
        Props::new().set(
            "style",
            Style { bold: true, fg: crate::style::Color::Cyan, ..Style::default() },
        ),
        vec![VNode::text(format!(
            " Console ({}) - Ctrl+L close, Ctrl+K clear",
            messages.len()
        ))],
    ));

    for message in visible_messages {
        let color = match message.level {
            ConsoleLevel::Error => crate::style::Color::Red,
            ConsoleLevel::Warn => crate::style::Color::Yellow,
            _ => crate::style::Color::White,
        };
        children.push(VNode::element(
            "text",
            Props::new().set("style", Style::fg(color)).set("wrap", true),
            vec![VNode::text(format!(" {}", format_message(message)))],
        ));
    }

    let panel = VNode::element(
        "box",
        Props::new()
            .set("position", "absolute")
            .set("x", 0)
            .set("y", panel_y)
            .set("width", width)
            .set("height", panel_height)
            .set("border", "single")
            .set("overflow", "hidden")
            .set(
                "style",
                Style {
                    bg: crate::style::Color::Black,
                    fg: crate::style::Color::White,
                    ..Style::default()
                },
            ),
        children,
    );

    VNode::element(
        "box",
        Props::new().set("width", width).set("height", height),
        vec![app_content, panel],
    )
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::test_guard;

    #[test]
    fn messages_append_in_order() {
        let _guard = test_guard();
        let console = Console::start(10);
        console.info("one");
        console.warn("two");
        let messages = console.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].text, "one");
        assert_eq!(messages[1].level, ConsoleLevel::Warn);
        console.stop();
    }

    #[test]
    fn cap_trims_oldest() {
        let _guard = test_guard();
        let console = Console::start(3);
        for i in 0..5 {
            console.info(format!("m{i}"));
        }
        let messages = console.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].text, "m2");
        assert_eq!(messages[2].text, "m4");
        console.stop();
    }

    #[test]
    fn clear_empties_the_buffer() {
        let _guard = test_guard();
        let console = Console::start(10);
        console.error("boom");
        console.clear();
        assert!(console.is_empty());
        console.stop();
    }

    #[test]
    fn facade_logging_is_captured_while_active() {
        let _guard = test_guard();
        let console = Console::start(10);
        log::info!("through the facade");
        let texts: Vec<String> =
            console.messages().iter().map(|m| m.text.clone()).collect();
        assert!(texts.contains(&"through the facade".to_string()));
        console.stop();

        // After stop, nothing is captured.
        let before = console.len();
        log::info!("dropped");
        assert_eq!(console.len(), before);
    }

    #[test]
    fn format_includes_level_and_text() {
        let message = ConsoleMessage {
            timestamp: Local::now(),
            level: ConsoleLevel::Warn,
            text: "careful".into(),
        };
        let formatted = format_message(&message);
        assert!(formatted.contains("WARN"));
        assert!(formatted.contains("careful"));
    }

    #[test]
    fn overlay_wraps_content_when_visible() {
        let _guard = test_guard();
        let console = Console::start(10);
        console.info("hello");

        let content = VNode::text("app");
        let hidden = build_overlay(content.clone(), &console, false, 80, 24);
        assert!(hidden.is_text());

        let shown = build_overlay(content, &console, true, 80, 24);
        assert_eq!(shown.element_kind(), Some("box"));
        assert_eq!(shown.children.len(), 2);
        console.stop();
    }
}
