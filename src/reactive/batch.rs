//! Batched writes and untracked reads.
//!
//! Inside [`batch`], signal writes defer their subscribers into the
//! runtime's pending set; when the outermost batch exits, each pending
//! computation runs once no matter how many signals notified it. Nested
//! batches flush only at the outermost exit.
//!
//! [`untrack`] reads signals without subscribing the current computation.

use crate::reactive::runtime::{runtime, Runtime};
use std::sync::Arc;

/// Drains the pending set when the outermost batch exits. Implemented as a
/// drop guard so the depth is balanced on every exit path; the drain itself
/// is skipped while unwinding so user effects don't run during a panic.
struct BatchScope {
    rt: Arc<Runtime>,
}

impl Drop for BatchScope {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.rt.exit_batch();
            return;
        }
        let pending = self.rt.exit_batch();
        for comp in pending {
            comp.execute();
        }
    }
}

/// Batch multiple signal writes so subscribers run at most once, after the
/// outermost batch completes.
///
/// ```ignore
/// batch(|| {
///     set_a.set(1);
///     set_b.set(2);
/// });
/// // An effect reading both a and b has run exactly once here.
/// ```
pub fn batch<T>(f: impl FnOnce() -> T) -> T {
    let rt = runtime();
    rt.increment_batch();
    let _scope = BatchScope { rt };
    f()
}

/// Read signals inside `f` without subscribing the current computation.
/// Tracking state is restored on return, on every exit path.
pub fn untrack<T>(f: impl FnOnce() -> T) -> T {
    let rt = runtime();
    let _suspended = rt.suspend_tracking();
    f()
}

/// Whether a computation is currently tracking reads.
pub fn is_tracking() -> bool {
    runtime().current_computation().is_some()
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::effect::create_effect;
    use crate::reactive::runtime::test_guard;
    use crate::reactive::signal::create_signal;
    use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn batch_defers_to_a_single_run() {
        let _guard = test_guard();
        let (a, set_a) = create_signal(0);
        let (b, set_b) = create_signal(0);
        let runs = Arc::new(AtomicUsize::new(0));
        let observed = Arc::new(AtomicI32::new(0));
        let (runs_c, observed_c) = (runs.clone(), observed.clone());

        create_effect(move || {
            observed_c.store(a.get() + b.get(), Ordering::SeqCst);
            runs_c.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        batch(|| {
            set_a.set(1);
            set_b.set(2);
        });

        // Exactly one more run, observing both final values.
        assert_eq!(runs.load(Ordering::SeqCst), 2);
        assert_eq!(observed.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn nested_batches_flush_at_outermost_exit() {
        let _guard = test_guard();
        let (count, set_count) = create_signal(0);
        let runs = Arc::new(AtomicUsize::new(0));
        let runs_c = runs.clone();
        create_effect(move || {
            let _ = count.get();
            runs_c.fetch_add(1, Ordering::SeqCst);
        });

        batch(|| {
            set_count.set(1);
            batch(|| {
                set_count.set(2);
            });
            // The inner batch must not have flushed.
            assert_eq!(runs.load(Ordering::SeqCst), 1);
            set_count.set(3);
        });
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn batch_returns_closure_value() {
        let _guard = test_guard();
        assert_eq!(batch(|| 7), 7);
    }

    #[test]
    fn batch_without_writes_runs_nothing() {
        let _guard = test_guard();
        let (count, _set) = create_signal(0);
        let runs = Arc::new(AtomicUsize::new(0));
        let runs_c = runs.clone();
        create_effect(move || {
            let _ = count.get();
            runs_c.fetch_add(1, Ordering::SeqCst);
        });
        batch(|| {});
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn untrack_prevents_subscription() {
        let _guard = test_guard();
        let (tracked, set_tracked) = create_signal(0);
        let (untracked, set_untracked) = create_signal(0);
        let runs = Arc::new(AtomicUsize::new(0));
        let runs_c = runs.clone();

        create_effect(move || {
            let _ = tracked.get();
            let _ = untrack(|| untracked.get());
            runs_c.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        set_untracked.set(1);
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        set_tracked.set(1);
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn is_tracking_reports_context() {
        let _guard = test_guard();
        assert!(!is_tracking());
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_c = seen.clone();
        create_effect(move || {
            if is_tracking() {
                seen_c.fetch_add(1, Ordering::SeqCst);
            }
            untrack(|| {
                assert!(!is_tracking());
            });
        });
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }
}
