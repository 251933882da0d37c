use std::pin::Pin;
use std::task::{Context, Poll};

use futures::ready;
use futures::stream::{FusedStream, Stream, TryStream};

use crate::cancel::CancellationSignal;

use super::state::{SequenceState, Stepper};
use super::SequenceError;

/// Stream returned by [select_async]
#[must_use = "streams do nothing unless polled"]
pub struct Select<S, F> {
    stepper: Stepper<S>,
    transform: F,
}

/// Stream returned by [try_select_async]
#[must_use = "streams do nothing unless polled"]
pub struct TrySelect<S, F> {
    stepper: Stepper<S>,
    transform: F,
}

/// Lazily apply `transform` to every element of `source`, in order.
///
/// The stream yields `Ok(transform(element))` per element. If `signal` is requested
/// before an element is pulled, the stream yields [SequenceError::Canceled] once and then
/// ends; it never just stops short. Source failures are yielded as
/// [SequenceError::Propagated] and also end the stream.
///
/// # Examples
///
/// ```
/// use std::convert::Infallible;
/// use futures::{executor::block_on, stream, StreamExt, TryStreamExt};
/// use plainbytes_util::cancel::CancellationSignal;
/// use plainbytes_util::sequence::select_async;
///
/// let source = stream::iter(0..3).map(Ok::<_, Infallible>);
/// let names = select_async(Some(source), &CancellationSignal::new(), |i| format!("#{i}"));
/// let names: Vec<String> = block_on(names.try_collect()).unwrap();
/// assert_eq!(names, ["#0", "#1", "#2"]);
/// ```
pub fn select_async<S, F, R>(
    source: Option<S>,
    signal: &CancellationSignal,
    transform: F,
) -> Select<S, F>
where
    S: TryStream + Unpin,
    F: FnMut(S::Ok) -> R,
{
    Select {
        stepper: Stepper::new(source, signal.clone()),
        transform,
    }
}

/// Like [select_async], for transforms that can fail.
///
/// A failing transform yields [SequenceError::Propagated] and ends the stream; the source is
/// not asked for another element.
pub fn try_select_async<S, F, R>(
    source: Option<S>,
    signal: &CancellationSignal,
    transform: F,
) -> TrySelect<S, F>
where
    S: TryStream + Unpin,
    F: FnMut(S::Ok) -> Result<R, S::Error>,
{
    TrySelect {
        stepper: Stepper::new(source, signal.clone()),
        transform,
    }
}

macro_rules! impl_stream_common {
    ($ty:ident) => {
        impl<S, F> $ty<S, F> {
            /// Where in its lifecycle this stream is
            pub fn state(&self) -> SequenceState {
                self.stepper.state()
            }

            /// Number of elements pulled from the source so far
            pub fn produced(&self) -> usize {
                self.stepper.produced()
            }
        }

        // The transform is never pinned
        impl<S: Unpin, F> Unpin for $ty<S, F> {}

        impl<S, F> std::fmt::Debug for $ty<S, F>
        where
            S: std::fmt::Debug,
        {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($ty))
                    .field("stepper", &self.stepper)
                    .finish_non_exhaustive()
            }
        }
    };
}

impl_stream_common!(Select);
impl_stream_common!(TrySelect);

impl<S, F, R> Stream for Select<S, F>
where
    S: TryStream + Unpin,
    F: FnMut(S::Ok) -> R,
{
    type Item = Result<R, SequenceError<S::Error>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let step = ready!(this.stepper.poll_step(cx));
        Poll::Ready(step.map(|element| element.map(&mut this.transform)))
    }
}

impl<S, F, R> FusedStream for Select<S, F>
where
    S: TryStream + Unpin,
    F: FnMut(S::Ok) -> R,
{
    fn is_terminated(&self) -> bool {
        self.stepper.state().is_terminal()
    }
}

impl<S, F, R> Stream for TrySelect<S, F>
where
    S: TryStream + Unpin,
    F: FnMut(S::Ok) -> Result<R, S::Error>,
{
    type Item = Result<R, SequenceError<S::Error>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let res = match ready!(this.stepper.poll_step(cx)) {
            Some(Ok(element)) => match (this.transform)(element) {
                Ok(value) => Some(Ok(value)),
                Err(err) => Some(Err(this.stepper.fail(err))),
            },
            Some(Err(err)) => Some(Err(err)),
            None => None,
        };
        Poll::Ready(res)
    }
}

impl<S, F, R> FusedStream for TrySelect<S, F>
where
    S: TryStream + Unpin,
    F: FnMut(S::Ok) -> Result<R, S::Error>,
{
    fn is_terminated(&self) -> bool {
        self.stepper.state().is_terminal()
    }
}
