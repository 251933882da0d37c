use std::pin::Pin;
use std::task::{Context, Poll};

use futures::ready;
use futures::stream::{FusedStream, Stream, TryStream};

use crate::cancel::CancellationSignal;

use super::state::{SequenceState, Stepper};
use super::SequenceError;

/// Stream returned by [where_async]
#[must_use = "streams do nothing unless polled"]
pub struct Where<S, P> {
    stepper: Stepper<S>,
    predicate: P,
}

/// Lazily keep only the elements of `source` for which `predicate` holds.
///
/// Relative order is preserved. Cancellation is checked before every element is pulled
/// from the source, including elements the predicate ends up rejecting.
///
/// # Examples
///
/// ```
/// use std::convert::Infallible;
/// use futures::{executor::block_on, stream, StreamExt, TryStreamExt};
/// use plainbytes_util::cancel::CancellationSignal;
/// use plainbytes_util::sequence::where_async;
///
/// let source = stream::iter(0..6).map(Ok::<_, Infallible>);
/// let odd = where_async(Some(source), &CancellationSignal::new(), |i| i % 2 == 1);
/// let odd: Vec<i32> = block_on(odd.try_collect()).unwrap();
/// assert_eq!(odd, [1, 3, 5]);
/// ```
pub fn where_async<S, P>(
    source: Option<S>,
    signal: &CancellationSignal,
    predicate: P,
) -> Where<S, P>
where
    S: TryStream + Unpin,
    P: FnMut(&S::Ok) -> bool,
{
    Where {
        stepper: Stepper::new(source, signal.clone()),
        predicate,
    }
}

impl<S, P> Where<S, P> {
    /// Where in its lifecycle this stream is
    pub fn state(&self) -> SequenceState {
        self.stepper.state()
    }

    /// Number of elements pulled from the source so far, whether they passed or not
    pub fn produced(&self) -> usize {
        self.stepper.produced()
    }
}

// The predicate is never pinned
impl<S: Unpin, P> Unpin for Where<S, P> {}

impl<S: std::fmt::Debug, P> std::fmt::Debug for Where<S, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Where")
            .field("stepper", &self.stepper)
            .finish_non_exhaustive()
    }
}

impl<S, P> Stream for Where<S, P>
where
    S: TryStream + Unpin,
    P: FnMut(&S::Ok) -> bool,
{
    type Item = Result<S::Ok, SequenceError<S::Error>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            match ready!(this.stepper.poll_step(cx)) {
                Some(Ok(element)) => {
                    if (this.predicate)(&element) {
                        return Poll::Ready(Some(Ok(element)));
                    }
                }
                other => return Poll::Ready(other),
            }
        }
    }
}

impl<S, P> FusedStream for Where<S, P>
where
    S: TryStream + Unpin,
    P: FnMut(&S::Ok) -> bool,
{
    fn is_terminated(&self) -> bool {
        self.stepper.state().is_terminal()
    }
}
