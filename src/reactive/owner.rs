//! Ownership scopes for deterministic cleanup.
//!
//! [`create_root`] installs a fresh owner for the duration of the closure.
//! Reactive primitives created while an owner is current register their
//! disposal with it; invoking the root's disposer runs every registered
//! disposer exactly once.

use std::sync::{Arc, Mutex};

use crate::reactive::runtime::{lock, runtime};

type Disposer = Box<dyn FnOnce() + Send>;

/// A scope collecting disposers for everything created inside it.
pub struct Owner {
    disposables: Mutex<Vec<Disposer>>,
}

impl Owner {
    pub(crate) fn new() -> Self {
        Self { disposables: Mutex::new(Vec::new()) }
    }

    pub(crate) fn add_disposer(&self, disposer: Disposer) {
        lock(&self.disposables).push(disposer);
    }
}

/// Handle returned to the [`create_root`] closure; disposing it tears down
/// everything registered under the root's owner.
#[derive(Clone)]
pub struct RootDisposer {
    owner: Arc<Owner>,
}

impl RootDisposer {
    /// Run every registered disposer. Each disposer runs exactly once;
    /// calling this again afterwards is a no-op.
    pub fn dispose(&self) {
        let disposers = std::mem::take(&mut *lock(&self.owner.disposables));
        for disposer in disposers {
            disposer();
        }
    }
}

/// Create a reactive root: run `f` with a fresh owner installed, handing it
/// the root's disposer. The previous owner is restored on return, on every
/// exit path.
pub fn create_root<T>(f: impl FnOnce(RootDisposer) -> T) -> T {
    let owner = Arc::new(Owner::new());
    let rt = runtime();
    let _scope = rt.enter_owner(owner.clone());
    f(RootDisposer { owner })
}

/// Register a cleanup with the current owner. Without an owner this does
/// nothing.
pub fn on_cleanup(f: impl FnOnce() + Send + 'static) {
    if let Some(owner) = runtime().current_owner() {
        owner.add_disposer(Box::new(f));
    }
}

// ===========================================================================
// Tests
// ===========================================================================
