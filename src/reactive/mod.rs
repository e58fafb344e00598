//! Fine-grained reactive primitives.
//!
//! Signals store values and notify subscribers on change; effects auto-track
//! the signals they read and re-run when any of them changes; memos cache
//! derived values. [`batch`] defers notifications, [`untrack`] suppresses
//! dependency collection, and ownership scopes ([`create_root`]) collect
//! disposers for deterministic teardown.
//!
//! All state shared between primitives lives in the process-wide
//! [`Runtime`]; signals themselves are individually locked so the render,
//! input, and signal threads can read concurrently.

mod batch;
mod effect;
mod owner;
mod runtime;
mod signal;

pub use batch::{batch, is_tracking, untrack};
pub use effect::{create_effect, create_effect_with_cleanup, create_memo, Cleanup, Effect};
pub use owner::{create_root, on_cleanup, Owner, RootDisposer};
pub use runtime::{reset_runtime, runtime, Runtime};
pub use signal::{create_signal, create_signal_with_equals, ReadSignal, WriteSignal};

#[cfg(test)]
pub(crate) use runtime::test_guard;
