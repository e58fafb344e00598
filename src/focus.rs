//! Focus management and key routing.
//!
//! Focusables register with the process-wide [`FocusManager`] in creation
//! order; Tab and Shift-Tab walk that ring with wrap-around. Focus changes
//! happen inside a reactive batch so "previous blurred" and "new focused"
//! become visible to observers atomically. Keys route to the focused
//! element first; unconsumed keys fall through to an optional global
//! handler.

use std::sync::{Arc, RwLock};

use crate::keys;
use crate::reactive::{batch, create_signal, runtime, ReadSignal, WriteSignal};

/// The capability set of anything that can take focus.
pub trait Focusable: Send + Sync {
    /// Whether this element currently has focus (reactive read).
    fn focused(&self) -> bool;
    /// Set the focused flag; called only by the focus manager.
    fn set_focused(&self, focused: bool);
    /// Handle a key; return `true` to consume it.
    fn handle_key(&self, key: &str) -> bool;
}

type ArcFocusable = Arc<dyn Focusable>;
type GlobalKeyHandler = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Identity comparison for trait-object focusables (data pointer only, so
/// comparisons are stable across codegen units).
fn same(a: &ArcFocusable, b: &ArcFocusable) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

/// Registration order, the current focusable, and the global key handler.
pub struct FocusManager {
    registered: RwLock<Vec<ArcFocusable>>,
    current: ReadSignal<Option<ArcFocusable>>,
    set_current: WriteSignal<Option<ArcFocusable>>,
    global_handler: RwLock<Option<GlobalKeyHandler>>,
}

impl FocusManager {
    pub(crate) fn new() -> Self {
        let (current, set_current) = create_signal(None);
        Self {
            registered: RwLock::new(Vec::new()),
            current,
            set_current,
            global_handler: RwLock::new(None),
        }
    }

    /// Add a focusable to the ring. Order of registration is the Tab order.
    pub fn register(&self, focusable: ArcFocusable) {
        self.registered.write().unwrap().push(focusable);
    }

    /// Remove a focusable from the ring; if it was current, focus clears.
    pub fn unregister(&self, focusable: ArcFocusable) {
        {
            let mut registered = self.registered.write().unwrap();
            if let Some(index) = registered.iter().position(|f| same(f, &focusable)) {
                registered.remove(index);
            }
        }
        let was_current =
            self.current.get_untracked().map(|c| same(&c, &focusable)).unwrap_or(false);
        if was_current {
            self.set_current.set(None);
        }
    }

    /// Give focus to `focusable`: blur the previous holder and set the new
    /// one, atomically with respect to observers.
    pub fn request_focus(&self, focusable: ArcFocusable) {
        let current = self.current.get_untracked();
        if let Some(current) = &current {
            if same(current, &focusable) {
                return;
            }
        }
        batch(|| {
            if let Some(previous) = current {
                previous.set_focused(false);
            }
            focusable.set_focused(true);
            self.set_current.set(Some(focusable));
        });
    }

    /// Blur `focusable` if it is the current holder; otherwise do nothing.
    pub fn request_blur(&self, focusable: ArcFocusable) {
        let is_current =
            self.current.get_untracked().map(|c| same(&c, &focusable)).unwrap_or(false);
        if is_current {
            batch(|| {
                focusable.set_focused(false);
                self.set_current.set(None);
            });
        }
    }

    /// The current focus holder (reactive read).
    pub fn current(&self) -> Option<ArcFocusable> {
        self.current.get()
    }

    /// Advance focus to the next registered focusable, wrapping around.
    /// From an unfocused state, the first one is focused.
    pub fn focus_next(&self) {
        let registered = self.registered.read().unwrap().clone();
        if registered.is_empty() {
            return;
        }
        let next = match self.current.get_untracked() {
            None => registered[0].clone(),
            Some(current) => {
                let index =
                    registered.iter().position(|f| same(f, &current)).map(|i| i as i32).unwrap_or(-1);
                let next_index = (index + 1).rem_euclid(registered.len() as i32);
                registered[next_index as usize].clone()
            }
        };
        self.request_focus(next);
    }

    /// Move focus to the previous registered focusable, wrapping around.
    /// From an unfocused state, the last one is focused.
    pub fn focus_previous(&self) {
        let registered = self.registered.read().unwrap().clone();
        if registered.is_empty() {
            return;
        }
        let prev = match self.current.get_untracked() {
            None => registered[registered.len() - 1].clone(),
            Some(current) => {
                let index =
                    registered.iter().position(|f| same(f, &current)).map(|i| i as i32).unwrap_or(0);
                let prev_index = (index - 1).rem_euclid(registered.len() as i32);
                registered[prev_index as usize].clone()
            }
        };
        self.request_focus(prev);
    }

    /// Route a key: Tab/Shift-Tab move focus; otherwise the focused element
    /// gets it, then the global handler. Returns whether it was consumed.
    pub fn handle_key(&self, key: &str) -> bool {
        if key == keys::TAB {
            self.focus_next();
            return true;
        }
        if key == keys::SHIFT_TAB {
            self.focus_previous();
            return true;
        }

        if let Some(current) = self.current.get_untracked() {
            if current.handle_key(key) {
                return true;
            }
        }

        if let Some(handler) = self.global_handler.read().unwrap().as_ref() {
            return handler(key);
        }
        false
    }

    /// Install the app-wide handler for keys nothing else consumed. Returns
    /// a remover.
    pub fn set_global_key_handler(
        self: &Arc<Self>,
        handler: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> impl FnOnce() {
        *self.global_handler.write().unwrap() = Some(Box::new(handler));
        let manager = self.clone();
        move || {
            *manager.global_handler.write().unwrap() = None;
        }
    }

    /// All registered focusables, in Tab order.
    pub fn all(&self) -> Vec<ArcFocusable> {
        self.registered.read().unwrap().clone()
    }

    /// Drop every registration and handler; blur the current holder.
    pub fn clear(&self) {
        if let Some(current) = self.current.get_untracked() {
            current.set_focused(false);
        }
        self.set_current.set(None);
        self.registered.write().unwrap().clear();
        *self.global_handler.write().unwrap() = None;
    }
}

/// Route a key through the global runtime's focus manager.
pub fn handle_key(key: &str) -> bool {
    runtime().focus_manager().handle_key(key)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::test_guard;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    struct MockFocusable {
        focused: AtomicBool,
        consume: bool,
        seen: Mutex<Vec<String>>,
    }

    impl MockFocusable {
        fn new(consume: bool) -> Arc<Self> {
            Arc::new(Self {
                focused: AtomicBool::new(false),
                consume,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    impl Focusable for MockFocusable {
        fn focused(&self) -> bool {
            self.focused.load(Ordering::SeqCst)
        }
        fn set_focused(&self, focused: bool) {
            self.focused.store(focused, Ordering::SeqCst);
        }
        fn handle_key(&self, key: &str) -> bool {
            self.seen.lock().unwrap().push(key.to_string());
            self.consume
        }
    }

    fn manager_with(n: usize) -> (Arc<FocusManager>, Vec<Arc<MockFocusable>>) {
        let manager = runtime().focus_manager();
        let mocks: Vec<_> = (0..n).map(|_| MockFocusable::new(false)).collect();
        for mock in &mocks {
            manager.register(mock.clone());
        }
        (manager, mocks)
    }

    #[test]
    fn registration_and_unregistration() {
        let _guard = test_guard();
        let (manager, mocks) = manager_with(2);
        assert_eq!(manager.all().len(), 2);
        manager.unregister(mocks[0].clone());
        assert_eq!(manager.all().len(), 1);
    }

    #[test]
    fn request_focus_moves_focus_atomically() {
        let _guard = test_guard();
        let (manager, mocks) = manager_with(2);

        manager.request_focus(mocks[0].clone());
        assert!(mocks[0].focused());
        assert!(!mocks[1].focused());

        manager.request_focus(mocks[1].clone());
        assert!(!mocks[0].focused());
        assert!(mocks[1].focused());
        assert!(manager.current().is_some());
    }

    #[test]
    fn blur_only_acts_on_current() {
        let _guard = test_guard();
        let (manager, mocks) = manager_with(2);
        manager.request_focus(mocks[0].clone());

        manager.request_blur(mocks[1].clone());
        assert!(mocks[0].focused());

        manager.request_blur(mocks[0].clone());
        assert!(!mocks[0].focused());
        assert!(manager.current().is_none());
    }

    #[test]
    fn unregistering_current_clears_focus() {
        let _guard = test_guard();
        let (manager, mocks) = manager_with(2);
        manager.request_focus(mocks[0].clone());
        manager.unregister(mocks[0].clone());
        assert!(manager.current().is_none());
    }

    #[test]
    fn tab_walks_the_ring_and_wraps() {
        let _guard = test_guard();
        let (manager, mocks) = manager_with(3);

        for expected in [0usize, 1, 2, 0] {
            assert!(manager.handle_key(keys::TAB));
            for (i, mock) in mocks.iter().enumerate() {
                assert_eq!(mock.focused(), i == expected, "after tab to {expected}");
            }
        }
    }

    #[test]
    fn shift_tab_walks_backwards() {
        let _guard = test_guard();
        let (manager, mocks) = manager_with(3);

        assert!(manager.handle_key(keys::SHIFT_TAB));
        assert!(mocks[2].focused());
        assert!(manager.handle_key(keys::SHIFT_TAB));
        assert!(mocks[1].focused());
    }

    #[test]
    fn tab_ring_arithmetic() {
        let _guard = test_guard();
        let (manager, mocks) = manager_with(4);
        manager.request_focus(mocks[1].clone());
        // (1 + 5) mod 4 == 2
        for _ in 0..5 {
            manager.focus_next();
        }
        assert!(mocks[2].focused());
    }

    #[test]
    fn keys_route_to_focused_element() {
        let _guard = test_guard();
        let manager = runtime().focus_manager();
        let consumer = MockFocusable::new(true);
        manager.register(consumer.clone());
        manager.request_focus(consumer.clone());

        assert!(manager.handle_key("x"));
        assert_eq!(*consumer.seen.lock().unwrap(), vec!["x".to_string()]);
    }

    #[test]
    fn unconsumed_keys_reach_global_handler() {
        let _guard = test_guard();
        let manager = runtime().focus_manager();
        let passthrough = MockFocusable::new(false);
        manager.register(passthrough.clone());
        manager.request_focus(passthrough.clone());

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_c = seen.clone();
        let remove = manager.set_global_key_handler(move |key| {
            seen_c.lock().unwrap().push(key.to_string());
            key == "q"
        });

        assert!(manager.handle_key("q"));
        assert!(!manager.handle_key("z"));
        assert_eq!(*seen.lock().unwrap(), vec!["q".to_string(), "z".to_string()]);

        remove();
        assert!(!manager.handle_key("q"));
    }

    #[test]
    fn focus_change_is_one_batch() {
        let _guard = test_guard();
        let (manager, mocks) = manager_with(2);
        manager.request_focus(mocks[0].clone());

        // An effect observing the current focusable runs once per change.
        let runs = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let runs_c = runs.clone();
        let manager_c = manager.clone();
        crate::reactive::create_effect(move || {
            let _ = manager_c.current();
            runs_c.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        manager.request_focus(mocks[1].clone());
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }
}
