//! Cooperative cancellation.
//!
//! A [CancellationSignal] is never used to interrupt work forcibly. Work that honors the signal
//! polls [CancellationSignal::is_requested] at well defined checkpoints (for the
//! [sequence](crate::sequence) processors: before requesting the next element) and stops there.
//!
//! Signals are cheap to clone; all clones observe the same state. Several signals can be
//! combined into one cancellation domain through [CancellationSignal::linked], and a
//! signal can hand out [children](CancellationSignal::child) that can be canceled
//! independently of their parent.
//!
//! # Examples
//!
//! ```
//! use plainbytes_util::cancel::CancellationSignal;
//!
//! let shutdown = CancellationSignal::new();
//! let user_abort = CancellationSignal::new();
//! let domain = CancellationSignal::linked([&shutdown, &user_abort]);
//!
//! assert!(!domain.is_requested());
//! user_abort.request();
//! assert!(domain.is_requested());
//! assert!(!shutdown.is_requested());
//! ```

use std::sync::Arc;

use futures::future::{select_all, BoxFuture, FutureExt};
use tokio_util::sync::CancellationToken;

/// Error produced by [CancellationSignal::check] once cancellation was requested
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("the operation was canceled")]
pub struct Canceled;

/// Shared, thread-safe cancellation flag.
///
/// Once requested, a signal stays requested.
#[derive(Clone, Debug)]
pub struct CancellationSignal {
    /// Flag owned by this signal (and its clones)
    token: CancellationToken,
    /// Other signals that belong to the same cancellation domain
    links: Arc<[CancellationSignal]>,
}

impl Default for CancellationSignal {
    fn default() -> Self {
        Self {
            token: CancellationToken::new(),
            links: Vec::new().into(),
        }
    }
}

impl CancellationSignal {
    /// Create a fresh signal that is not requested
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Requesting more than once has no further effect.
    pub fn request(&self) {
        if !self.token.is_cancelled() {
            log::trace!("Cancellation requested");
        }
        self.token.cancel();
    }

    /// Whether this signal or any signal linked to it was requested
    pub fn is_requested(&self) -> bool {
        self.token.is_cancelled() || self.links.iter().any(Self::is_requested)
    }

    /// Turn the signal state into a [Result]
    ///
    /// ```
    /// use plainbytes_util::cancel::{Canceled, CancellationSignal};
    ///
    /// let signal = CancellationSignal::new();
    /// assert_eq!(signal.check(), Ok(()));
    /// signal.request();
    /// assert_eq!(signal.check(), Err(Canceled));
    /// ```
    pub fn check(&self) -> Result<(), Canceled> {
        match self.is_requested() {
            true => Err(Canceled),
            false => Ok(()),
        }
    }

    /// Create a signal that is requested whenever this one is.
    ///
    /// Requesting the child does not affect the parent.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            links: self.links.clone(),
        }
    }

    /// Combine multiple signals into a single cancellation domain.
    ///
    /// The returned signal counts as requested as soon as any of the given signals is, or
    /// when it is requested itself. Requesting the linked signal leaves the given signals
    /// untouched.
    pub fn linked<'a, I>(signals: I) -> Self
    where
        I: IntoIterator<Item = &'a CancellationSignal>,
    {
        let links: Vec<_> = signals.into_iter().cloned().collect();
        Self {
            token: CancellationToken::new(),
            links: links.into(),
        }
    }

    /// Wait until cancellation is requested.
    ///
    /// Useful for composing an external timer with a signal; the sequence processors
    /// themselves only poll.
    pub fn requested(&self) -> BoxFuture<'_, ()> {
        if self.links.is_empty() {
            return self.token.cancelled().boxed();
        }

        let waiters = std::iter::once(self.token.cancelled().boxed())
            .chain(self.links.iter().map(Self::requested));
        select_all(waiters).map(|_| ()).boxed()
    }
}
