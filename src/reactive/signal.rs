//! Signals: reactive cells that notify their subscribers on change.
//!
//! [`create_signal`] returns a `(ReadSignal, WriteSignal)` pair. Reading
//! through the read half while a computation is tracking records the
//! dependency on *both* sides — the signal learns about its subscriber, and
//! the computation remembers the signal so it can unsubscribe precisely
//! before its next run. Writes notify subscribers synchronously, or defer
//! them into the runtime's pending set while a [`batch`](super::batch) is
//! open.
//!
//! Each signal owns a read-write lock around its value, so concurrent
//! readers (the render thread, the input thread) never block each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::reactive::runtime::{lock, runtime, Computation, SignalSubscription};

type EqualsFn<T> = Box<dyn Fn(&T, &T) -> bool + Send + Sync>;

pub(crate) struct SignalInner<T> {
    value: RwLock<T>,
    /// Subscribers keyed by computation identity; insertion of an existing
    /// key is a no-op, giving set semantics.
    subscribers: Mutex<HashMap<usize, Arc<Computation>>>,
    equals: Option<EqualsFn<T>>,
}

impl<T: Send + Sync + 'static> SignalSubscription for SignalInner<T> {
    fn unsubscribe(&self, comp: &Arc<Computation>) {
        lock(&self.subscribers).remove(&comp.key());
    }
}

impl<T: Send + Sync + 'static> SignalInner<T> {
    /// Record the currently tracking computation (if any) as a subscriber.
    fn track(self: &Arc<Self>) {
        if let Some(comp) = runtime().current_computation() {
            lock(&self.subscribers).insert(comp.key(), comp.clone());
            let subscription: Arc<dyn SignalSubscription> = self.clone();
            lock(&comp.subscriptions).push(Arc::downgrade(&subscription));
        }
    }

    /// Notify every subscriber — synchronously outside a batch, deferred
    /// into the pending set inside one.
    fn notify(&self) {
        let subs: Vec<Arc<Computation>> = lock(&self.subscribers).values().cloned().collect();
        if subs.is_empty() {
            return;
        }

        let rt = runtime();
        if rt.batch_depth() > 0 {
            for comp in subs {
                rt.add_pending(comp);
            }
        } else {
            for comp in subs {
                comp.execute();
            }
        }
    }
}

// ---------------------------------------------------------------------------
// ReadSignal
// ---------------------------------------------------------------------------

/// Read half of a signal. Cloning is cheap (an `Arc` bump).
pub struct ReadSignal<T> {
    pub(crate) inner: Arc<SignalInner<T>>,
}

impl<T> Clone for ReadSignal<T> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<T: Send + Sync + 'static> ReadSignal<T> {
    /// Read the current value, subscribing the tracking computation (if any).
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.with(T::clone)
    }

    /// Read by reference without cloning. Still subscribes the tracking
    /// computation.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.inner.track();
        let guard = self.inner.value.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Read without tracking — never subscribes a computation.
    pub fn get_untracked(&self) -> T
    where
        T: Clone,
    {
        self.inner
            .value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

// ---------------------------------------------------------------------------
// WriteSignal
// ---------------------------------------------------------------------------

/// Write half of a signal. Cloning is cheap (an `Arc` bump).
pub struct WriteSignal<T> {
    pub(crate) inner: Arc<SignalInner<T>>,
}

impl<T> Clone for WriteSignal<T> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<T: Send + Sync + 'static> WriteSignal<T> {
    /// Overwrite the value and notify subscribers. With a custom equality
    /// predicate installed, a write that compares equal is a no-op.
    pub fn set(&self, value: T) {
        {
            let mut guard = self.inner.value.write().unwrap_or_else(PoisonError::into_inner);
            if let Some(equals) = &self.inner.equals {
                if equals(&guard, &value) {
                    return;
                }
            }
            *guard = value;
        }
        self.inner.notify();
    }

    /// Mutate the value in place and notify subscribers.
    ///
    /// The closure runs under the value lock, so it always observes the
    /// current value — a stale read between "get" and "set" cannot occur.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        {
            let mut guard = self.inner.value.write().unwrap_or_else(PoisonError::into_inner);
            f(&mut guard);
        }
        self.inner.notify();
    }
}

// ---------------------------------------------------------------------------
// Constructors
// ---------------------------------------------------------------------------

/// Create a reactive signal with the given initial value.
pub fn create_signal<T: Send + Sync + 'static>(initial: T) -> (ReadSignal<T>, WriteSignal<T>) {
    let inner = Arc::new(SignalInner {
        value: RwLock::new(initial),
        subscribers: Mutex::new(HashMap::new()),
        equals: None,
    });
    (ReadSignal { inner: inner.clone() }, WriteSignal { inner })
}

/// Create a signal with a custom equality predicate. Writes whose new value
/// compares equal to the current one do not notify subscribers.
pub fn create_signal_with_equals<T: Send + Sync + 'static>(
    initial: T,
    equals: impl Fn(&T, &T) -> bool + Send + Sync + 'static,
) -> (ReadSignal<T>, WriteSignal<T>) {
    let inner = Arc::new(SignalInner {
        value: RwLock::new(initial),
        subscribers: Mutex::new(HashMap::new()),
        equals: Some(Box::new(equals)),
    });
    (ReadSignal { inner: inner.clone() }, WriteSignal { inner })
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::effect::create_effect;
    use crate::reactive::runtime::test_guard;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn create_and_read() {
        let _guard = test_guard();
        let (count, _set_count) = create_signal(42);
        assert_eq!(count.get(), 42);
    }

    #[test]
    fn set_and_read() {
        let _guard = test_guard();
        let (count, set_count) = create_signal(0);
        set_count.set(7);
        assert_eq!(count.get(), 7);
    }

    #[test]
    fn update_in_place() {
        let _guard = test_guard();
        let (items, set_items) = create_signal(vec![1, 2]);
        set_items.update(|v| v.push(3));
        assert_eq!(items.get(), vec![1, 2, 3]);
    }

    #[test]
    fn with_reads_by_reference() {
        let _guard = test_guard();
        let (text, _set_text) = create_signal(String::from("hello"));
        assert_eq!(text.with(|s| s.len()), 5);
    }

    #[test]
    fn effect_runs_once_per_write() {
        let _guard = test_guard();
        let (count, set_count) = create_signal(0);
        let runs = Arc::new(AtomicUsize::new(0));
        let runs_c = runs.clone();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_c = seen.clone();
        create_effect(move || {
            seen_c.lock().unwrap().push(count.get());
            runs_c.fetch_add(1, Ordering::SeqCst);
        });
        set_count.set(1);
        set_count.set(2);
        assert_eq!(runs.load(Ordering::SeqCst), 3);
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn get_untracked_does_not_subscribe() {
        let _guard = test_guard();
        let (count, set_count) = create_signal(0);
        let runs = Arc::new(AtomicUsize::new(0));
        let runs_c = runs.clone();
        create_effect(move || {
            let _ = count.get_untracked();
            runs_c.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        set_count.set(1);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn custom_equality_suppresses_equal_writes() {
        let _guard = test_guard();
        let (count, set_count) = create_signal_with_equals(0, |a, b| a == b);
        let runs = Arc::new(AtomicUsize::new(0));
        let runs_c = runs.clone();
        create_effect(move || {
            let _ = count.get();
            runs_c.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        set_count.set(0); // equal: no notification
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        set_count.set(5);
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn multiple_effects_on_one_signal() {
        let _guard = test_guard();
        let (count, set_count) = create_signal(0);
        let a = Arc::new(AtomicUsize::new(0));
        let b = Arc::new(AtomicUsize::new(0));
        let (a_c, b_c) = (a.clone(), b.clone());
        let count_a = count.clone();
        create_effect(move || {
            a_c.store(count_a.get() as usize, Ordering::SeqCst);
        });
        create_effect(move || {
            b_c.store(count.get() as usize * 10, Ordering::SeqCst);
        });
        set_count.set(3);
        assert_eq!(a.load(Ordering::SeqCst), 3);
        assert_eq!(b.load(Ordering::SeqCst), 30);
    }

    #[test]
    fn clones_share_the_same_signal() {
        let _guard = test_guard();
        let (count, set_count) = create_signal(0);
        let count2 = count.clone();
        let set2 = set_count.clone();
        set2.set(10);
        assert_eq!(count.get(), 10);
        assert_eq!(count2.get(), 10);
    }
}
