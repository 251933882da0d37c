use std::future::Future;

use futures::future::poll_fn;
use futures::stream::TryStream;

use crate::cancel::CancellationSignal;

use super::state::Stepper;
use super::SequenceError;

/// Await `action` for every element of `source`, in order.
///
/// Before each element is requested, `signal` is checked; once it is requested, no further
/// elements are requested, no further actions run and [SequenceError::Canceled] is returned.
/// A failing action or source ends processing with [SequenceError::Propagated].
/// An absent source yields [SequenceError::NullSource] on the first poll.
///
/// # Examples
///
/// ```
/// use std::convert::Infallible;
/// use futures::{executor::block_on, stream, StreamExt};
/// use plainbytes_util::cancel::CancellationSignal;
/// use plainbytes_util::sequence::for_each_async;
///
/// let mut sum = 0;
/// let source = stream::iter(1..=4).map(Ok::<_, Infallible>);
/// block_on(for_each_async(Some(source), &CancellationSignal::new(), |i| {
///     sum += i;
///     async { Ok(()) }
/// }))
/// .unwrap();
/// assert_eq!(sum, 10);
/// ```
pub fn for_each_async<S, F, Fut>(
    source: Option<S>,
    signal: &CancellationSignal,
    mut action: F,
) -> impl Future<Output = Result<(), SequenceError<S::Error>>>
where
    S: TryStream + Unpin,
    F: FnMut(S::Ok) -> Fut,
    Fut: Future<Output = Result<(), S::Error>>,
{
    for_each_with_signal_async(source, signal, move |element, _| action(element))
}

/// Like [for_each_async], but `action` also receives the signal governing the processing,
/// so long running actions can observe or request cancellation themselves.
///
/// Requesting the signal from within the action lets the current action finish; the
/// next element is then never requested.
///
/// ```
/// use std::convert::Infallible;
/// use futures::{executor::block_on, stream, StreamExt};
/// use plainbytes_util::cancel::CancellationSignal;
/// use plainbytes_util::sequence::{for_each_with_signal_async, SequenceError};
///
/// let mut seen = Vec::new();
/// let source = stream::iter(0..10).map(Ok::<_, Infallible>);
/// let res = block_on(for_each_with_signal_async(
///     Some(source),
///     &CancellationSignal::new(),
///     |i, signal| {
///         seen.push(i);
///         if i == 2 {
///             signal.request();
///         }
///         async { Ok(()) }
///     },
/// ));
/// assert_eq!(res, Err(SequenceError::Canceled));
/// assert_eq!(seen, [0, 1, 2]);
/// ```
pub fn for_each_with_signal_async<S, F, Fut>(
    source: Option<S>,
    signal: &CancellationSignal,
    mut action: F,
) -> impl Future<Output = Result<(), SequenceError<S::Error>>>
where
    S: TryStream + Unpin,
    F: FnMut(S::Ok, CancellationSignal) -> Fut,
    Fut: Future<Output = Result<(), S::Error>>,
{
    let signal = signal.clone();
    let mut stepper = Stepper::new(source, signal.clone());
    async move {
        while let Some(step) = poll_fn(|cx| stepper.poll_step(cx)).await {
            let element = match step {
                Ok(element) => element,
                Err(err) => return Err(err),
            };
            if let Err(err) = action(element, signal.clone()).await {
                return Err(stepper.fail(err));
            }
        }
        Ok(())
    }
}
