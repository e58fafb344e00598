//! Effects and memos.
//!
//! An effect is a closure that re-runs whenever any signal it read during
//! its last execution changes. The closure may return a cleanup that runs
//! before the next execution and on dispose. A memo is a cached derived
//! value: a signal kept up to date by an effect, whose subscribers are only
//! notified when the computed value actually changes.
//!
//! Re-execution discipline (in order): run the previous cleanup, unsubscribe
//! from every previously observed signal, re-run the user closure with
//! tracking enabled, store the new cleanup. Disposal is idempotent and
//! unsubscribes before running the final cleanup.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

use crate::reactive::runtime::{lock, runtime, Computation};

/// A cleanup returned from an effect body; runs before the next execution
/// and when the effect is disposed.
pub type Cleanup = Box<dyn FnOnce() + Send>;

type EffectFn = Box<dyn FnMut() -> Option<Cleanup> + Send>;

struct EffectState {
    /// The user closure. Taken out of the slot while running so a reentrant
    /// notification (a write to an observed signal from inside the body)
    /// cannot re-enter the body; the reentrant run is simply dropped.
    f: Mutex<Option<EffectFn>>,
    cleanup: Mutex<Option<Cleanup>>,
    disposed: AtomicBool,
}

// ---------------------------------------------------------------------------
// Effect
// ---------------------------------------------------------------------------

/// Handle to a running effect. Cloning shares the same effect; `dispose`
/// through any clone stops it.
#[derive(Clone)]
pub struct Effect {
    comp: Arc<Computation>,
    state: Arc<EffectState>,
}

impl Effect {
    /// Stop the effect: unsubscribe from every observed signal, then run the
    /// last cleanup. Safe to call more than once; later calls are no-ops,
    /// and a disposed effect never executes again.
    pub fn dispose(&self) {
        if self.state.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        unsubscribe_all(&self.comp);
        lock(&self.state.f).take();
        let cleanup = lock(&self.state.cleanup).take();
        if let Some(cleanup) = cleanup {
            cleanup();
        }
    }
}

/// Create a side effect that re-runs when its tracked signals change.
///
/// The closure runs once immediately, establishing its initial
/// subscriptions. If an ownership scope is current, the effect's disposal is
/// registered with it.
pub fn create_effect(mut f: impl FnMut() + Send + 'static) -> Effect {
    create_effect_with_cleanup(move || {
        f();
        None
    })
}

/// Like [`create_effect`], but the closure may return a [`Cleanup`] to run
/// before each re-execution and on dispose.
pub fn create_effect_with_cleanup(
    f: impl FnMut() -> Option<Cleanup> + Send + 'static,
) -> Effect {
    let state = Arc::new(EffectState {
        f: Mutex::new(Some(Box::new(f) as EffectFn)),
        cleanup: Mutex::new(None),
        disposed: AtomicBool::new(false),
    });

    let comp = Arc::new_cyclic(|weak: &Weak<Computation>| {
        let weak = weak.clone();
        let state = state.clone();
        Computation {
            run: Box::new(move || {
                if let Some(comp) = weak.upgrade() {
                    run_effect(&comp, &state);
                }
            }),
            subscriptions: Mutex::new(Vec::new()),
        }
    });

    comp.execute();

    let effect = Effect { comp, state };
    if let Some(owner) = runtime().current_owner() {
        let handle = effect.clone();
        owner.add_disposer(Box::new(move || handle.dispose()));
    }
    effect
}

fn unsubscribe_all(comp: &Arc<Computation>) {
    let subs = std::mem::take(&mut *lock(&comp.subscriptions));
    for weak in subs {
        if let Some(signal) = weak.upgrade() {
            signal.unsubscribe(comp);
        }
    }
}

/// Puts the effect closure back in its slot when the run finishes — also on
/// the panic path, so a panicking body doesn't silently kill the effect.
struct ClosureSlot<'a> {
    state: &'a EffectState,
    f: Option<EffectFn>,
}

impl Drop for ClosureSlot<'_> {
    fn drop(&mut self) {
        if !self.state.disposed.load(Ordering::SeqCst) {
            *lock(&self.state.f) = self.f.take();
        }
    }
}

fn run_effect(comp: &Arc<Computation>, state: &Arc<EffectState>) {
    if state.disposed.load(Ordering::SeqCst) {
        return;
    }

    // Reentrancy guard, taken before anything is torn down: an empty slot
    // means this effect is already running, and the reentrant notification
    // must not disturb its cleanup or subscriptions.
    let Some(f) = lock(&state.f).take() else {
        return;
    };
    let mut slot = ClosureSlot { state, f: Some(f) };

    let previous_cleanup = lock(&state.cleanup).take();
    if let Some(cleanup) = previous_cleanup {
        cleanup();
    }

    unsubscribe_all(comp);

    let rt = runtime();
    let _tracking = rt.track(comp.clone());
    let new_cleanup = (slot.f.as_mut().expect("closure present"))();

    if !state.disposed.load(Ordering::SeqCst) {
        *lock(&state.cleanup) = new_cleanup;
    } else if let Some(cleanup) = new_cleanup {
        // Disposed from inside its own body: run the fresh cleanup now.
        cleanup();
    }
}

// ---------------------------------------------------------------------------
// Memo
// ---------------------------------------------------------------------------

/// Create a memoized derived value.
///
/// Implemented as a signal fed by an effect; because the backing signal uses
/// `PartialEq` as its equality predicate, downstream subscribers only run
/// when the computed value actually changes.
pub fn create_memo<T>(mut f: impl FnMut() -> T + Send + 'static) -> super::ReadSignal<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    // Evaluate eagerly without tracking so a parent effect doesn't
    // accidentally subscribe to the memo's dependencies; the effect below
    // does the tracked run.
    let initial = super::untrack(&mut f);

    let (read, write) = super::create_signal_with_equals(initial, |a: &T, b: &T| a == b);
    create_effect(move || {
        write.set(f());
    });
    read
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::runtime::test_guard;
    use crate::reactive::signal::create_signal;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        (Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)))
    }

    // ── Effect basics ────────────────────────────────────────────────

    #[test]
    fn effect_runs_immediately() {
        let _guard = test_guard();
        let ran = Arc::new(AtomicBool::new(false));
        let ran_c = ran.clone();
        create_effect(move || {
            ran_c.store(true, Ordering::SeqCst);
        });
        assert!(ran.load(Ordering::SeqCst));
    }

    #[test]
    fn effect_tracks_multiple_signals() {
        let _guard = test_guard();
        let (a, set_a) = create_signal(1);
        let (b, set_b) = create_signal(10);
        let sum = Arc::new(AtomicUsize::new(0));
        let sum_c = sum.clone();
        create_effect(move || {
            sum_c.store((a.get() + b.get()) as usize, Ordering::SeqCst);
        });
        assert_eq!(sum.load(Ordering::SeqCst), 11);
        set_a.set(2);
        assert_eq!(sum.load(Ordering::SeqCst), 12);
        set_b.set(20);
        assert_eq!(sum.load(Ordering::SeqCst), 22);
    }

    #[test]
    fn effect_retracks_conditional_reads() {
        let _guard = test_guard();
        let (flag, set_flag) = create_signal(true);
        let (a, set_a) = create_signal(1);
        let (b, set_b) = create_signal(2);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_c = seen.clone();

        create_effect(move || {
            let v = if flag.get() { a.get() } else { b.get() };
            seen_c.lock().unwrap().push(v);
        });
        assert_eq!(*seen.lock().unwrap(), vec![1]);

        set_flag.set(false);
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);

        // `a` is no longer observed.
        set_a.set(99);
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);

        set_b.set(3);
        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
    }

    // ── Cleanup ──────────────────────────────────────────────────────

    #[test]
    fn cleanup_runs_before_each_rerun_and_on_dispose() {
        let _guard = test_guard();
        let (count, set_count) = create_signal(0);
        let (runs, cleanups) = counter();
        let (runs_c, cleanups_c) = (runs.clone(), cleanups.clone());

        let effect = create_effect_with_cleanup(move || {
            let _ = count.get();
            runs_c.fetch_add(1, Ordering::SeqCst);
            let cleanups = cleanups_c.clone();
            Some(Box::new(move || {
                cleanups.fetch_add(1, Ordering::SeqCst);
            }) as Cleanup)
        });

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(cleanups.load(Ordering::SeqCst), 0);

        set_count.set(1);
        assert_eq!(runs.load(Ordering::SeqCst), 2);
        assert_eq!(cleanups.load(Ordering::SeqCst), 1);

        effect.dispose();
        assert_eq!(cleanups.load(Ordering::SeqCst), 2);
    }

    // ── Dispose ──────────────────────────────────────────────────────

    #[test]
    fn disposed_effect_stops_running() {
        let _guard = test_guard();
        let (count, set_count) = create_signal(0);
        let runs = Arc::new(AtomicUsize::new(0));
        let runs_c = runs.clone();
        let effect = create_effect(move || {
            let _ = count.get();
            runs_c.fetch_add(1, Ordering::SeqCst);
        });
        set_count.set(1);
        assert_eq!(runs.load(Ordering::SeqCst), 2);

        effect.dispose();
        set_count.set(2);
        set_count.set(3);
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn dispose_is_idempotent() {
        let _guard = test_guard();
        let cleanups = Arc::new(AtomicUsize::new(0));
        let cleanups_c = cleanups.clone();
        let effect = create_effect_with_cleanup(move || {
            let cleanups = cleanups_c.clone();
            Some(Box::new(move || {
                cleanups.fetch_add(1, Ordering::SeqCst);
            }) as Cleanup)
        });
        effect.dispose();
        effect.dispose();
        effect.dispose();
        assert_eq!(cleanups.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn reentrant_write_does_not_recurse() {
        let _guard = test_guard();
        let (count, set_count) = create_signal(0);
        let runs = Arc::new(AtomicUsize::new(0));
        let runs_c = runs.clone();
        let set_inner = set_count.clone();
        let count_inner = count.clone();
        create_effect(move || {
            let v = count_inner.get();
            runs_c.fetch_add(1, Ordering::SeqCst);
            if v == 0 {
                // Writes the signal this effect observes, from inside the
                // body. The reentrant notification is dropped.
                set_inner.set(1);
            }
        });
        assert!(runs.load(Ordering::SeqCst) <= 2);
        assert_eq!(count.get(), 1);
    }

    // ── Memo ─────────────────────────────────────────────────────────

    #[test]
    fn memo_computes_and_updates() {
        let _guard = test_guard();
        let (count, set_count) = create_signal(3);
        let doubled = create_memo(move || count.get() * 2);
        assert_eq!(doubled.get(), 6);
        set_count.set(5);
        assert_eq!(doubled.get(), 10);
    }

    #[test]
    fn memo_skips_notification_when_unchanged() {
        let _guard = test_guard();
        let (count, set_count) = create_signal(3);
        let clamped = create_memo(move || count.get().min(10));
        let runs = Arc::new(AtomicUsize::new(0));
        let runs_c = runs.clone();
        let clamped_c = clamped.clone();
        create_effect(move || {
            let _ = clamped_c.get();
            runs_c.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        set_count.set(15); // clamped: 3 -> 10
        assert_eq!(runs.load(Ordering::SeqCst), 2);
        set_count.set(20); // clamped stays 10: no downstream run
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn memo_chain() {
        let _guard = test_guard();
        let (count, set_count) = create_signal(1);
        let doubled = create_memo(move || count.get() * 2);
        let doubled_c = doubled.clone();
        let quadrupled = create_memo(move || doubled_c.get() * 2);
        assert_eq!(quadrupled.get(), 4);
        set_count.set(3);
        assert_eq!(doubled.get(), 6);
        assert_eq!(quadrupled.get(), 12);
    }
}
