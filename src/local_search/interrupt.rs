//! Cooperative cancellation checks inside long passes.

use std::time::Duration;

/// Minimum wall-clock time between polls inside a single pass.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Asked whether a long-running pass may continue.
///
/// `operation` names what is running, e.g. `"NearClusterSearch"` or
/// `"Customer 120/500"`. Returning `false` ends the current pass early; the
/// solution stays valid.
///
/// Closures implement this trait:
///
/// ```
/// use u_territory::local_search::Interrupt;
///
/// let mut seen = Vec::new();
/// let mut probe = |op: &str| {
///     seen.push(op.to_string());
///     seen.len() < 2
/// };
/// assert!(probe.keep_going("a"));
/// assert!(!probe.keep_going("b"));
/// ```
pub trait Interrupt {
    fn keep_going(&mut self, operation: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Interrupt for F {
    fn keep_going(&mut self, operation: &str) -> bool {
        self(operation)
    }
}

/// An [`Interrupt`] that never stops the search.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverInterrupt;

impl Interrupt for NeverInterrupt {
    fn keep_going(&mut self, _operation: &str) -> bool {
        true
    }
}
