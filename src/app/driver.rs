//! The full-terminal driver: raw mode, signals, keystrokes, teardown.
//!
//! [`run`] owns every scoped resource the engine touches — raw terminal
//! state, the cursor, the signal-listener thread, the keystroke reader, the
//! console capture, and the reactive root — and releases all of them on
//! every exit path. Teardown is cooperative: a single `cleanup` runs once
//! no matter who triggers it (Ctrl-C, SIGINT/SIGTERM, or [`App::quit`]).

use std::io::{self, IsTerminal, Read};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{mpsc, Arc, Mutex};

use signal_hook::consts::{SIGINT, SIGTERM, SIGWINCH};
use signal_hook::iterator::Signals;

use crate::app::console::{build_overlay, Console};
use crate::app::{create_app, App, Error, OnError, RenderOptions};
use crate::keys;
use crate::reactive::{create_signal, runtime};
use crate::render::ansi::{clear_screen, hide_cursor, show_cursor};
use crate::render::Output;
use crate::vnode::VNode;

/// Configuration for [`run`].
pub struct RunOptions {
    /// Terminal width; 0 queries the terminal (default 80).
    pub width: i32,
    /// Terminal height; 0 queries the terminal (default 24).
    pub height: i32,
    /// Byte sink for ANSI output; stdout when absent.
    pub output: Option<Output>,
    /// Called once the app is mounted and the loop is live.
    pub on_mount: Option<Box<dyn FnOnce(&App) + Send>>,
    /// Called during teardown.
    pub on_unmount: Option<Box<dyn FnOnce() + Send>>,
    /// Called before every render.
    pub on_render: Option<Arc<dyn Fn() + Send + Sync>>,
    /// Receives surfaced errors.
    pub on_error: Option<OnError>,
    /// Capture console output into the Ctrl-L overlay.
    pub capture_console: bool,
    /// Cap on retained console messages.
    pub max_console_messages: usize,
    /// Skip the frame throttle (deterministic tests).
    pub disable_throttle: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            output: None,
            on_mount: None,
            on_unmount: None,
            on_render: None,
            on_error: None,
            capture_console: true,
            max_console_messages: 1000,
            disable_throttle: false,
        }
    }
}

/// Restores cooked terminal mode when dropped, so a panic anywhere in the
/// driver still leaves the terminal usable.
struct RawModeGuard {
    active: bool,
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if self.active {
            let _ = crossterm::terminal::disable_raw_mode();
        }
    }
}

/// Run a reactive TUI application with full terminal handling. Blocks until
/// the application quits.
pub fn run(
    app_fn: impl Fn() -> VNode + Send + Sync + 'static,
    options: RunOptions,
) -> Result<(), Error> {
    let RunOptions {
        width,
        height,
        output,
        on_mount,
        on_unmount,
        on_render,
        on_error,
        capture_console,
        max_console_messages,
        disable_throttle,
    } = options;

    // Terminal size: explicit options win; a failed query falls back to the
    // defaults.
    let queried = crossterm::terminal::size().ok();
    let size = Arc::new((
        AtomicI32::new(pick_dimension(width, queried.map(|(w, _)| w as i32), 80)),
        AtomicI32::new(pick_dimension(height, queried.map(|(_, h)| h as i32), 24)),
    ));

    // Console capture and the Ctrl-L toggle.
    let console = capture_console.then(|| Console::start(max_console_messages));
    let (show_logs, set_show_logs) = create_signal(false);

    let wrapped_app_fn = {
        let console = console.clone();
        let size = size.clone();
        let show_logs = show_logs.clone();
        move || {
            let content = app_fn();
            match &console {
                Some(console) => build_overlay(
                    content,
                    console,
                    show_logs.get(),
                    size.0.load(Ordering::SeqCst),
                    size.1.load(Ordering::SeqCst),
                ),
                None => content,
            }
        }
    };

    // Raw mode; failure is surfaced but not fatal (tests, pipes).
    let mut raw_guard = RawModeGuard { active: false };
    if io::stdin().is_terminal() {
        match crossterm::terminal::enable_raw_mode() {
            Ok(()) => raw_guard.active = true,
            Err(err) => {
                if let Some(on_error) = &on_error {
                    on_error(&Error::TerminalSetup(err));
                }
            }
        }
    }

    let app = Arc::new(create_app(
        wrapped_app_fn,
        RenderOptions {
            width: size.0.load(Ordering::SeqCst),
            height: size.1.load(Ordering::SeqCst),
            output,
            disable_throttle,
            on_render,
            on_error: on_error.clone(),
        },
    ));

    let _ = app.write_raw(hide_cursor().as_bytes());

    // One teardown, whoever triggers it first.
    let (done_tx, done_rx) = mpsc::channel::<()>();
    let stopped = Arc::new(AtomicBool::new(false));
    let on_unmount = Arc::new(Mutex::new(on_unmount));
    let cleanup: Arc<dyn Fn() + Send + Sync> = {
        let stopped = stopped.clone();
        let console = console.clone();
        let app = app.clone();
        Arc::new(move || {
            if stopped.swap(true, Ordering::SeqCst) {
                return;
            }
            if let Some(console) = &console {
                console.stop();
            }
            app.dispose();
            if let Some(on_unmount) = on_unmount.lock().unwrap().take() {
                on_unmount();
            }
            let _ = done_tx.send(());
        })
    };
    app.set_quit_handler(cleanup.clone());

    // Console shortcuts ride the global key handler: they only fire when no
    // focused element consumed the key.
    let remove_global_handler = console.as_ref().map(|console| {
        let console = console.clone();
        let show_logs = show_logs.clone();
        runtime().focus_manager().set_global_key_handler(move |key| {
            if key == keys::CTRL_L {
                set_show_logs.set(!show_logs.get_untracked());
                return true;
            }
            if key == keys::CTRL_K && show_logs.get_untracked() {
                console.clear();
                return true;
            }
            false
        })
    });

    // Signal listener: resize on SIGWINCH, teardown on SIGINT/SIGTERM.
    let signals_handle = match Signals::new([SIGWINCH, SIGINT, SIGTERM]) {
        Ok(mut signals) => {
            let handle = signals.handle();
            let app = app.clone();
            let cleanup = cleanup.clone();
            let size = size.clone();
            std::thread::spawn(move || {
                for signal in signals.forever() {
                    match signal {
                        SIGWINCH => {
                            if let Ok((w, h)) = crossterm::terminal::size() {
                                size.0.store(w as i32, Ordering::SeqCst);
                                size.1.store(h as i32, Ordering::SeqCst);
                                app.resize(w as i32, h as i32);
                            }
                        }
                        _ => {
                            cleanup();
                            return;
                        }
                    }
                }
            });
            Some(handle)
        }
        Err(err) => {
            if let Some(on_error) = &on_error {
                on_error(&Error::TerminalSetup(err));
            }
            None
        }
    };

    // Keystroke reader: raw bytes to the focus manager; Ctrl-C tears down.
    {
        let stopped = stopped.clone();
        let cleanup = cleanup.clone();
        std::thread::spawn(move || {
            let mut stdin = io::stdin();
            let mut buf = [0u8; 64];
            loop {
                if stopped.load(Ordering::SeqCst) {
                    return;
                }
                let n = match stdin.read(&mut buf) {
                    // EOF or a read error: stop reading. The app keeps
                    // running for programmatic control.
                    Ok(0) | Err(_) => return,
                    Ok(n) => n,
                };
                let key = String::from_utf8_lossy(&buf[..n]).into_owned();
                if key == keys::CTRL_C {
                    cleanup();
                    return;
                }
                crate::focus::handle_key(&key);
            }
        });
    }

    if let Some(on_mount) = on_mount {
        on_mount(&app);
    }

    // Block until teardown.
    let _ = done_rx.recv();

    if let Some(remove) = remove_global_handler {
        remove();
    }
    if let Some(handle) = signals_handle {
        handle.close();
    }
    let _ = app.write_raw(clear_screen().as_bytes());
    let _ = app.write_raw(show_cursor().as_bytes());
    drop(raw_guard);

    Ok(())
}

fn pick_dimension(explicit: i32, queried: Option<i32>, fallback: i32) -> i32 {
    if explicit > 0 {
        return explicit;
    }
    match queried {
        Some(v) if v > 0 => v,
        _ => fallback,
    }
}

// ===========================================================================
// Tests
// ===========================================================================
