//! Stale-callback guard shared between a component and its pending work.

use std::cell::Cell;
use std::rc::Rc;

/// Single-threaded cancellation flag.
///
/// Clones share the same flag. Once cancelled a token never resets; a new
/// resolution cycle takes a fresh token instead.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Rc<Cell<bool>>,
}

impl CancellationToken {
    /// Create a live token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the token cancelled.
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    /// Whether [`cancel`](Self::cancel) was called on any clone.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }

    /// Run `f` only if the token is still live.
    pub fn run_if_live<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        if self.is_cancelled() {
            None
        } else {
            Some(f())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_flag() {
        let token = CancellationToken::new();
        let pending = token.clone();
        assert!(!pending.is_cancelled());

        token.cancel();
        assert!(pending.is_cancelled());
    }

    #[test]
    fn test_run_if_live() {
        let token = CancellationToken::new();
        assert_eq!(token.run_if_live(|| 1), Some(1));

        token.cancel();
        assert_eq!(token.run_if_live(|| 1), None);
    }
}
