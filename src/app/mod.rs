//! Application lifecycle: the reactive render loop and the terminal driver.
//!
//! [`create_app`] installs a reactive root containing one effect whose body
//! calls the application function and renders the produced tree; whatever
//! signals that function read become the effect's dependencies, so writing
//! them re-renders automatically. [`run`] adds the full terminal treatment
//! around it: raw mode, cursor handling, resize and teardown signals, and
//! the keystroke reader.

mod console;
mod driver;

pub use console::{build_overlay, format_message, Console, ConsoleLevel, ConsoleMessage};
pub use driver::{run, RunOptions};

use std::io;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::reactive::{create_effect, create_root, RootDisposer};
use crate::render::{Output, Renderer};
use crate::vnode::VNode;

/// Renders are skipped when the previous one happened less than this long
/// ago (≈60 Hz); the next signal change retries.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Driver-level failures. None of these crash the hosting process; they are
/// surfaced through `on_error` and the engine continues where possible.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("terminal setup failed: {0}")]
    TerminalSetup(#[source] io::Error),
    #[error("output write failed: {0}")]
    OutputWrite(#[source] io::Error),
    #[error("render panicked: {0}")]
    RenderPanic(String),
}

/// Callback receiving surfaced errors.
pub type OnError = Arc<dyn Fn(&Error) + Send + Sync>;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Configuration for [`create_app`].
#[derive(Default)]
pub struct RenderOptions {
    /// Terminal width in cells.
    pub width: i32,
    /// Terminal height in cells.
    pub height: i32,
    /// Byte sink for ANSI output; stdout when absent.
    pub output: Option<Output>,
    /// Skip the frame-rate throttle (deterministic tests).
    pub disable_throttle: bool,
    /// Called before every render.
    pub on_render: Option<Arc<dyn Fn() + Send + Sync>>,
    /// Receives render and output errors.
    pub on_error: Option<OnError>,
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

struct AppState {
    current: Mutex<Option<VNode>>,
    last_render: Mutex<Option<Instant>>,
}

/// A running reactive application: the renderer plus the root that owns the
/// render effect.
pub struct App {
    renderer: Arc<Mutex<Renderer>>,
    rerender: Arc<dyn Fn() + Send + Sync>,
    dispose_root: Mutex<Option<RootDisposer>>,
    quit_handler: Mutex<Option<Arc<dyn Fn() + Send + Sync>>>,
}

impl App {
    /// Force a render of the last produced tree (subject to the throttle).
    pub fn rerender(&self) {
        (self.rerender)();
    }

    /// Replace the renderer's buffers for a new terminal size and redraw.
    pub fn resize(&self, width: i32, height: i32) {
        self.renderer.lock().unwrap().resize(width, height);
        self.rerender();
    }

    /// Tear down the reactive root; effects created by the app stop.
    pub fn dispose(&self) {
        if let Some(dispose) = self.dispose_root.lock().unwrap().take() {
            dispose.dispose();
        }
    }

    /// Ask the driver to shut the application down.
    pub fn quit(&self) {
        let handler = self.quit_handler.lock().unwrap().clone();
        if let Some(handler) = handler {
            handler();
        }
    }

    /// Install the teardown the driver wants [`App::quit`] to trigger.
    pub fn set_quit_handler(&self, handler: Arc<dyn Fn() + Send + Sync>) {
        *self.quit_handler.lock().unwrap() = Some(handler);
    }

    /// Write control bytes (cursor visibility, screen clear) to the output.
    pub fn write_raw(&self, bytes: &[u8]) -> io::Result<()> {
        self.renderer.lock().unwrap().write_raw(bytes)
    }

    /// The displayed buffer, for tests and tooling.
    pub fn with_current_buffer<R>(&self, f: impl FnOnce(&crate::buffer::CellBuffer) -> R) -> R {
        f(self.renderer.lock().unwrap().current_buffer())
    }
}

/// Create a reactive application: run `app_fn` inside a render effect so
/// that any signal it reads re-renders the tree on change.
pub fn create_app(
    app_fn: impl Fn() -> VNode + Send + Sync + 'static,
    options: RenderOptions,
) -> App {
    let output = options.output.unwrap_or_else(|| Box::new(io::stdout()));
    let renderer = Arc::new(Mutex::new(Renderer::new(options.width, options.height, output)));
    let state = Arc::new(AppState {
        current: Mutex::new(None),
        last_render: Mutex::new(None),
    });

    let do_render: Arc<dyn Fn() + Send + Sync> = {
        let renderer = renderer.clone();
        let state = state.clone();
        let on_render = options.on_render.clone();
        let on_error = options.on_error.clone();
        let disable_throttle = options.disable_throttle;

        Arc::new(move || {
            let Some(node) = state.current.lock().unwrap().clone() else {
                return;
            };

            if !disable_throttle {
                let mut last = state.last_render.lock().unwrap();
                if let Some(at) = *last {
                    if at.elapsed() < FRAME_INTERVAL {
                        // Skipped; the next signal change retries.
                        return;
                    }
                }
                *last = Some(Instant::now());
            }

            if let Some(on_render) = &on_render {
                on_render();
            }
            if let Err(err) = renderer.lock().unwrap().render(&node) {
                if let Some(on_error) = &on_error {
                    on_error(&Error::OutputWrite(err));
                }
            }
        })
    };

    let dispose_root = {
        let do_render = do_render.clone();
        let state = state.clone();
        let on_error = options.on_error.clone();

        create_root(move |dispose| {
            create_effect(move || {
                let result = catch_unwind(AssertUnwindSafe(|| {
                    let node = app_fn();
                    *state.current.lock().unwrap() = Some(node);
                    do_render();
                }));
                if let Err(payload) = result {
                    if let Some(on_error) = &on_error {
                        on_error(&Error::RenderPanic(panic_message(&payload)));
                    }
                }
            });
            dispose
        })
    };

    App {
        renderer,
        rerender: do_render,
        dispose_root: Mutex::new(Some(dispose_root)),
        quit_handler: Mutex::new(None),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic in render body".to_string()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::{create_signal, test_guard};
    use crate::vnode::{Props, VNode};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter_tree(count: i32) -> VNode {
        VNode::element(
            "box",
            Props::new().set("width", 12).set("height", 1),
            vec![VNode::text(format!("count={count}"))],
        )
    }

    fn test_options() -> RenderOptions {
        RenderOptions {
            width: 12,
            height: 2,
            output: Some(Box::new(io::sink())),
            disable_throttle: true,
            ..Default::default()
        }
    }

    #[test]
    fn signal_writes_rerender() {
        let _guard = test_guard();
        let (count, set_count) = create_signal(0);
        let app = create_app(move || counter_tree(count.get()), test_options());

        app.with_current_buffer(|buf| {
            assert!(buf.to_debug_string().contains("count=0"));
        });
        set_count.set(7);
        app.with_current_buffer(|buf| {
            assert!(buf.to_debug_string().contains("count=7"));
        });
    }

    #[test]
    fn dispose_stops_rerendering() {
        let _guard = test_guard();
        let (count, set_count) = create_signal(0);
        let renders = Arc::new(AtomicUsize::new(0));
        let renders_c = renders.clone();
        let mut options = test_options();
        options.on_render = Some(Arc::new(move || {
            renders_c.fetch_add(1, Ordering::SeqCst);
        }));

        let app = create_app(move || counter_tree(count.get()), options);
        assert_eq!(renders.load(Ordering::SeqCst), 1);

        app.dispose();
        set_count.set(1);
        assert_eq!(renders.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn render_panic_is_caught_and_reported() {
        let _guard = test_guard();
        let (count, set_count) = create_signal(0);
        let errors: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let errors_c = errors.clone();
        let mut options = test_options();
        options.on_error = Some(Arc::new(move |err: &Error| {
            errors_c.lock().unwrap().push(err.to_string());
        }));

        let _app = create_app(
            move || {
                if count.get() == 1 {
                    panic!("boom in view");
                }
                counter_tree(count.get())
            },
            options,
        );

        set_count.set(1);
        let errors = errors.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("boom in view"));
    }

    #[test]
    fn throttle_skips_rapid_renders() {
        let _guard = test_guard();
        let (count, set_count) = create_signal(0);
        let renders = Arc::new(AtomicUsize::new(0));
        let renders_c = renders.clone();
        let mut options = test_options();
        options.disable_throttle = false;
        options.on_render = Some(Arc::new(move || {
            renders_c.fetch_add(1, Ordering::SeqCst);
        }));

        let _app = create_app(move || counter_tree(count.get()), options);
        assert_eq!(renders.load(Ordering::SeqCst), 1);

        // Immediately after the first frame: inside the 16ms window.
        set_count.set(1);
        assert_eq!(renders.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn resize_redraws_at_new_size() {
        let _guard = test_guard();
        let (count, _set_count) = create_signal(0);
        let app = create_app(move || counter_tree(count.get()), test_options());
        app.resize(16, 4);
        app.with_current_buffer(|buf| {
            assert_eq!(buf.width(), 16);
            assert!(buf.to_debug_string().contains("count=0"));
        });
    }

    #[test]
    fn quit_invokes_installed_handler() {
        let _guard = test_guard();
        let app = create_app(|| counter_tree(0), test_options());
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_c = calls.clone();
        app.set_quit_handler(Arc::new(move || {
            calls_c.fetch_add(1, Ordering::SeqCst);
        }));
        app.quit();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
