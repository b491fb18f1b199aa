//! Options for solvers that read their settings from process-wide state
//! instead of taking them with each call.
//!
//! Such a solver owns a [GlobalOptionStore]. Before each call, the options of
//! that call are written into the store through [GlobalOptionStore::scoped],
//! and the previous values are written back when the returned guard is
//! dropped, even if the solver panics. Only one scope can be open at a time:
//! concurrent calls to the same solver are serialized, so a call never sees
//! the options of another one.
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};

use tracing::trace;

use crate::parameters::BackendKwargs;

/// Process-wide options of a single solver
#[derive(Debug, Default)]
pub struct GlobalOptionStore {
    /// Held for the whole duration of a scope
    call: Mutex<()>,
    current: RwLock<BackendKwargs>,
}

impl GlobalOptionStore {
    /// A store holding the given options when no call is running
    pub fn new(defaults: BackendKwargs) -> Self {
        GlobalOptionStore {
            call: Mutex::new(()),
            current: RwLock::new(defaults),
        }
    }

    /// The options currently in effect
    pub fn current(&self) -> BackendKwargs {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Apply `kwargs` on top of the current options until the guard is dropped.
    /// Blocks while another scope is open.
    pub fn scoped(&self, kwargs: &BackendKwargs) -> ScopedOptions<'_> {
        let call = self.call.lock().unwrap_or_else(PoisonError::into_inner);
        let mut current = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let saved = current.clone();
        for (name, value) in kwargs {
            current.insert(name.clone(), value.clone());
        }
        trace!("{} global options applied", kwargs.len());
        ScopedOptions {
            store: self,
            saved: Some(saved),
            _call: call,
        }
    }
}

/// Restores the options of a [GlobalOptionStore] when dropped
#[derive(Debug)]
pub struct ScopedOptions<'a> {
    store: &'a GlobalOptionStore,
    saved: Option<BackendKwargs>,
    _call: MutexGuard<'a, ()>,
}

impl ScopedOptions<'_> {
    /// The options in effect inside this scope
    pub fn options(&self) -> BackendKwargs {
        self.store.current()
    }
}

impl Drop for ScopedOptions<'_> {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            *self
                .store
                .current
                .write()
                .unwrap_or_else(PoisonError::into_inner) = saved;
            trace!("global options restored");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::OptionValue;
    use std::panic;

    fn kwargs(pairs: &[(&str, OptionValue)]) -> BackendKwargs {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn options_are_restored() {
        let store = GlobalOptionStore::new(kwargs(&[("show_progress", false.into())]));
        {
            let scope = store.scoped(&kwargs(&[
                ("show_progress", true.into()),
                ("maxiters", 10_i64.into()),
            ]));
            assert_eq!(scope.options()["show_progress"], OptionValue::Bool(true));
            assert_eq!(store.current()["maxiters"], OptionValue::Int(10));
        }
        assert_eq!(
            store.current(),
            kwargs(&[("show_progress", false.into())])
        );
    }

    #[test]
    fn options_are_restored_after_a_panic() {
        let store = GlobalOptionStore::default();
        let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
            let _scope = store.scoped(&kwargs(&[("abstol", 1e-3.into())]));
            panic!("solver crashed");
        }));
        assert!(result.is_err());
        assert!(store.current().is_empty());
        // the store is still usable
        let scope = store.scoped(&kwargs(&[("abstol", 1e-4.into())]));
        assert_eq!(scope.options()["abstol"], OptionValue::Float(1e-4));
    }
}
