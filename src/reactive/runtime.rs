//! The process-wide reactive runtime.
//!
//! All global mutable state lives in one [`Runtime`] record: the currently
//! tracking computation, the current ownership scope, the batch depth, the
//! set of computations pending a batched flush, and the lazily-created focus
//! manager. The runtime is swappable as a whole — [`reset_runtime`] replaces
//! it with a fresh instance, which is how tests isolate themselves.
//!
//! The runtime's fields are small and are only read or swapped under a
//! single mutex; effects execute *outside* that lock.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError, RwLock, Weak};

use crate::focus::FocusManager;
use crate::reactive::owner::Owner;

/// Lock a mutex, recovering from poisoning.
///
/// A panicking render body is caught at the app layer and the engine keeps
/// running, so a poisoned lock only means a previous holder panicked — the
/// protected data is still structurally valid.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// A signal's view of a subscriber: enough to remove a computation from the
/// signal's subscriber set when the computation re-tracks or is disposed.
pub(crate) trait SignalSubscription: Send + Sync {
    fn unsubscribe(&self, comp: &Arc<Computation>);
}

/// The dependency-tracking record behind an effect (and therefore a memo).
///
/// `run` re-executes the computation. `subscriptions` lists the signals this
/// computation subscribed to on its last execution, so it can unsubscribe
/// precisely before re-tracking.
pub(crate) struct Computation {
    pub(crate) run: Box<dyn Fn() + Send + Sync>,
    pub(crate) subscriptions: Mutex<Vec<Weak<dyn SignalSubscription>>>,
}

impl Computation {
    /// Execute the computation.
    pub(crate) fn execute(self: &Arc<Self>) {
        (self.run)();
    }

    /// Stable identity for subscriber-set and pending-set keys.
    pub(crate) fn key(self: &Arc<Self>) -> usize {
        Arc::as_ptr(self) as *const () as usize
    }
}

// ---------------------------------------------------------------------------
// Runtime
// ---------------------------------------------------------------------------

struct RuntimeState {
    current: Option<Arc<Computation>>,
    owner: Option<Arc<Owner>>,
    batch_depth: usize,
    pending: HashMap<usize, Arc<Computation>>,
}

/// Process-wide record of reactive-graph state plus the focus manager.
pub struct Runtime {
    state: Mutex<RuntimeState>,
    focus: Mutex<Option<Arc<FocusManager>>>,
}

impl Runtime {
    fn new() -> Self {
        Self {
            state: Mutex::new(RuntimeState {
                current: None,
                owner: None,
                batch_depth: 0,
                pending: HashMap::new(),
            }),
            focus: Mutex::new(None),
        }
    }

    /// The focus manager, created on first access.
    ///
    /// Lazy instantiation breaks the construction cycle between focusables
    /// (which register themselves here) and the manager's own signals.
    pub fn focus_manager(&self) -> Arc<FocusManager> {
        let mut slot = lock(&self.focus);
        slot.get_or_insert_with(|| Arc::new(FocusManager::new())).clone()
    }

    pub(crate) fn current_computation(&self) -> Option<Arc<Computation>> {
        lock(&self.state).current.clone()
    }

    pub(crate) fn current_owner(&self) -> Option<Arc<Owner>> {
        lock(&self.state).owner.clone()
    }

    pub(crate) fn batch_depth(&self) -> usize {
        lock(&self.state).batch_depth
    }

    pub(crate) fn increment_batch(&self) {
        lock(&self.state).batch_depth += 1;
    }

    /// Decrement the batch depth; at zero, hand back the drained pending set.
    pub(crate) fn exit_batch(&self) -> Vec<Arc<Computation>> {
        let mut state = lock(&self.state);
        state.batch_depth = state.batch_depth.saturating_sub(1);
        if state.batch_depth == 0 {
            state.pending.drain().map(|(_, comp)| comp).collect()
        } else {
            Vec::new()
        }
    }

    /// Queue a computation for execution when the outermost batch exits.
    /// Adding the same computation twice is a no-op.
    pub(crate) fn add_pending(&self, comp: Arc<Computation>) {
        let key = comp.key();
        lock(&self.state).pending.insert(key, comp);
    }

    /// Install `comp` as the tracking computation; the returned guard
    /// restores the previous one on drop, on every exit path.
    pub(crate) fn track(self: &Arc<Self>, comp: Arc<Computation>) -> TrackingGuard {
        let prev = {
            let mut state = lock(&self.state);
            std::mem::replace(&mut state.current, Some(comp))
        };
        TrackingGuard { rt: self.clone(), prev }
    }

    /// Clear the tracking computation; the guard restores it on drop.
    pub(crate) fn suspend_tracking(self: &Arc<Self>) -> TrackingGuard {
        let prev = {
            let mut state = lock(&self.state);
            state.current.take()
        };
        TrackingGuard { rt: self.clone(), prev }
    }

    /// Install `owner` as the current scope; the guard restores the previous
    /// owner on drop.
    pub(crate) fn enter_owner(self: &Arc<Self>, owner: Arc<Owner>) -> OwnerGuard {
        let prev = {
            let mut state = lock(&self.state);
            std::mem::replace(&mut state.owner, Some(owner))
        };
        OwnerGuard { rt: self.clone(), prev }
    }
}

/// Restores the previously tracking computation when dropped.
pub(crate) struct TrackingGuard {
    rt: Arc<Runtime>,
    prev: Option<Arc<Computation>>,
}

impl Drop for TrackingGuard {
    fn drop(&mut self) {
        lock(&self.rt.state).current = self.prev.take();
    }
}

/// Restores the previous owner when dropped.
pub(crate) struct OwnerGuard {
    rt: Arc<Runtime>,
    prev: Option<Arc<Owner>>,
}

impl Drop for OwnerGuard {
    fn drop(&mut self) {
        lock(&self.rt.state).owner = self.prev.take();
    }
}

// ---------------------------------------------------------------------------
// Global instance
// ---------------------------------------------------------------------------

static GLOBAL: LazyLock<RwLock<Arc<Runtime>>> =
    LazyLock::new(|| RwLock::new(Arc::new(Runtime::new())));

/// The current global runtime.
pub fn runtime() -> Arc<Runtime> {
    GLOBAL.read().unwrap_or_else(PoisonError::into_inner).clone()
}

/// Replace the global runtime with a fresh instance.
///
/// Call at the start of tests for clean isolation. Signals and effects
/// created against the old runtime keep their subscriptions but no longer
/// share tracking state with new ones.
pub fn reset_runtime() {
    *GLOBAL.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(Runtime::new());
}

// ---------------------------------------------------------------------------
// Test serialization
// ---------------------------------------------------------------------------

/// The runtime is deliberately process-wide, so tests that exercise it must
/// not run concurrently. Each such test takes this lock and resets the
/// runtime before proceeding.
#[cfg(test)]
pub(crate) fn test_guard() -> MutexGuard<'static, ()> {
    static TEST_LOCK: Mutex<()> = Mutex::new(());
    let guard = TEST_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    reset_runtime();
    guard
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_installs_a_fresh_runtime() {
        let _guard = test_guard();
        let before = runtime();
        reset_runtime();
        let after = runtime();
        assert!(!Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn batch_depth_counts_and_drains_at_zero() {
        let _guard = test_guard();
        let rt = runtime();
        assert_eq!(rt.batch_depth(), 0);
        rt.increment_batch();
        rt.increment_batch();
        assert_eq!(rt.batch_depth(), 2);
        assert!(rt.exit_batch().is_empty()); // still nested
        assert!(rt.exit_batch().is_empty()); // nothing pending
        assert_eq!(rt.batch_depth(), 0);
    }

    #[test]
    fn pending_set_deduplicates() {
        let _guard = test_guard();
        let rt = runtime();
        let comp = Arc::new(Computation {
            run: Box::new(|| {}),
            subscriptions: Mutex::new(Vec::new()),
        });
        rt.increment_batch();
        rt.add_pending(comp.clone());
        rt.add_pending(comp.clone());
        let drained = rt.exit_batch();
        assert_eq!(drained.len(), 1);
    }

    #[test]
    fn tracking_guard_restores_previous() {
        let _guard = test_guard();
        let rt = runtime();
        let outer = Arc::new(Computation {
            run: Box::new(|| {}),
            subscriptions: Mutex::new(Vec::new()),
        });
        let inner = Arc::new(Computation {
            run: Box::new(|| {}),
            subscriptions: Mutex::new(Vec::new()),
        });

        let _outer_guard = rt.track(outer.clone());
        {
            let _inner_guard = rt.track(inner.clone());
            assert!(Arc::ptr_eq(&rt.current_computation().unwrap(), &inner));
        }
        assert!(Arc::ptr_eq(&rt.current_computation().unwrap(), &outer));
    }

    #[test]
    fn suspend_tracking_clears_and_restores() {
        let _guard = test_guard();
        let rt = runtime();
        let comp = Arc::new(Computation {
            run: Box::new(|| {}),
            subscriptions: Mutex::new(Vec::new()),
        });
        let _track = rt.track(comp);
        {
            let _suspend = rt.suspend_tracking();
            assert!(rt.current_computation().is_none());
        }
        assert!(rt.current_computation().is_some());
    }
}
