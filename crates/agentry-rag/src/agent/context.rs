//! Shared per-run state handed to tools and handoff callbacks

use parking_lot::Mutex;
use std::sync::Arc;

/// Cloneable handle to the state of a run
///
/// Every clone points at the same value. Locks are only held for the duration
/// of the closure passed to [`RunContext::read`] or [`RunContext::update`].
pub struct RunContext<C> {
    inner: Arc<Mutex<C>>,
}

impl<C> RunContext<C> {
    /// Wrap a context value
    pub fn new(value: C) -> Self {
        Self {
            inner: Arc::new(Mutex::new(value)),
        }
    }

    /// Read the context
    pub fn read<R>(&self, f: impl FnOnce(&C) -> R) -> R {
        f(&self.inner.lock())
    }

    /// Mutate the context
    pub fn update<R>(&self, f: impl FnOnce(&mut C) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Copy of the current value
    pub fn snapshot(&self) -> C
    where
        C: Clone,
    {
        self.inner.lock().clone()
    }
}

impl<C> Clone for RunContext<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Default> Default for RunContext<C> {
    fn default() -> Self {
        Self::new(C::default())
    }
}

impl<C: std::fmt::Debug> std::fmt::Debug for RunContext<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("RunContext").field(&*self.inner.lock()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let ctx = RunContext::new(vec![1]);
        let other = ctx.clone();

        other.update(|v| v.push(2));

        assert_eq!(ctx.snapshot(), vec![1, 2]);
        assert_eq!(ctx.read(|v| v.len()), 2);
    }
}
