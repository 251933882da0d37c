//! Processing of asynchronous sequences under cooperative cancellation.
//!
//! An asynchronous sequence is any [TryStream] (a [Stream](futures::Stream) of [Result]s);
//! pulling the next element is the only point at which processing suspends. Each operation
//! drives exactly one source, element by element, and checks a [CancellationSignal] before
//! every element it requests:
//!
//! - [for_each_async] / [for_each_with_signal_async]: await an action per element
//! - [select_async] / [try_select_async]: lazily transform elements
//! - [where_async]: lazily filter elements
//!
//! Sources are passed as `Option<S>`; a missing source is reported as
//! [SequenceError::NullSource]. Every source is dropped as soon as processing reaches a
//! terminal [SequenceState], so sources release whatever they hold on completion,
//! cancellation and failure alike.
//!
//! [AsyncSequenceExt] offers the same operations in method form.
//!
//! # Examples
//!
//! ```
//! use std::convert::Infallible;
//! use futures::{executor::block_on, stream, StreamExt};
//! use plainbytes_util::cancel::CancellationSignal;
//! use plainbytes_util::sequence::{AsyncSequenceExt, SequenceError};
//!
//! let signal = CancellationSignal::new();
//! let mut seen = Vec::new();
//! let res = block_on(stream::iter(0..20).map(Ok::<_, Infallible>).for_each_async(&signal, |i| {
//!     seen.push(i);
//!     if i == 3 {
//!         signal.request();
//!     }
//!     async { Ok(()) }
//! }));
//!
//! assert_eq!(res, Err(SequenceError::Canceled));
//! assert_eq!(seen, [0, 1, 2, 3]);
//! ```

mod error;
mod filter;
mod for_each;
mod select;
mod state;

use std::future::Future;

use futures::stream::TryStream;

use crate::cancel::CancellationSignal;

pub use error::SequenceError;
pub use filter::{where_async, Where};
pub use for_each::{for_each_async, for_each_with_signal_async};
pub use select::{select_async, try_select_async, Select, TrySelect};
pub use state::SequenceState;

/// Method form of the sequence operations for sources that are known to be present
pub trait AsyncSequenceExt: TryStream + Unpin + Sized {
    /// See [for_each_async]
    fn for_each_async<F, Fut>(
        self,
        signal: &CancellationSignal,
        action: F,
    ) -> impl Future<Output = Result<(), SequenceError<Self::Error>>>
    where
        F: FnMut(Self::Ok) -> Fut,
        Fut: Future<Output = Result<(), Self::Error>>,
    {
        for_each::for_each_async(Some(self), signal, action)
    }

    /// See [for_each_with_signal_async]
    fn for_each_with_signal_async<F, Fut>(
        self,
        signal: &CancellationSignal,
        action: F,
    ) -> impl Future<Output = Result<(), SequenceError<Self::Error>>>
    where
        F: FnMut(Self::Ok, CancellationSignal) -> Fut,
        Fut: Future<Output = Result<(), Self::Error>>,
    {
        for_each::for_each_with_signal_async(Some(self), signal, action)
    }

    /// See [select_async]
    fn select_async<F, R>(self, signal: &CancellationSignal, transform: F) -> Select<Self, F>
    where
        F: FnMut(Self::Ok) -> R,
    {
        select::select_async(Some(self), signal, transform)
    }

    /// See [try_select_async]
    fn try_select_async<F, R>(self, signal: &CancellationSignal, transform: F) -> TrySelect<Self, F>
    where
        F: FnMut(Self::Ok) -> Result<R, Self::Error>,
    {
        select::try_select_async(Some(self), signal, transform)
    }

    /// See [where_async]
    fn where_async<P>(self, signal: &CancellationSignal, predicate: P) -> Where<Self, P>
    where
        P: FnMut(&Self::Ok) -> bool,
    {
        filter::where_async(Some(self), signal, predicate)
    }
}

impl<S: TryStream + Unpin> AsyncSequenceExt for S {}
