//! The state machine shared by all sequence processors

use std::task::{Context, Poll};

use futures::ready;
use futures::stream::{TryStream, TryStreamExt};

use crate::cancel::CancellationSignal;

use super::SequenceError;

/// Lifecycle of a single processing call.
///
/// ```text
/// NotStarted -> Stepping -> { Stepping | Completed | Canceled | Failed }
/// ```
///
/// `Completed`, `Canceled` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceState {
    /// No element has been requested yet
    NotStarted,
    /// At least one element was requested and the source has not finished
    Stepping,
    /// The source signaled end-of-sequence
    Completed,
    /// The cancellation signal was observed at a checkpoint
    Canceled,
    /// The source was absent or the source or a callback failed
    Failed,
}

impl SequenceState {
    /// Whether no further elements will ever be requested
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Canceled | Self::Failed)
    }
}

/// Pulls elements out of one source, checking for cancellation before every request.
///
/// The source is dropped as soon as a terminal state is reached.
#[derive(Debug)]
pub(crate) struct Stepper<S> {
    source: Option<S>,
    signal: CancellationSignal,
    state: SequenceState,
    /// A request for the next element is outstanding; set between checkpoint and answer
    awaiting: bool,
    /// Number of elements the source produced so far
    produced: usize,
}

impl<S> Stepper<S> {
    pub fn new(source: Option<S>, signal: CancellationSignal) -> Self {
        Self {
            source,
            signal,
            state: SequenceState::NotStarted,
            awaiting: false,
            produced: 0,
        }
    }

    pub fn state(&self) -> SequenceState {
        self.state
    }

    pub fn produced(&self) -> usize {
        self.produced
    }

    /// Enter a terminal state and release the source
    fn terminate(&mut self, state: SequenceState) {
        debug_assert!(state.is_terminal());
        self.state = state;
        self.awaiting = false;
        self.source = None;
    }

    /// Record that a caller supplied callback failed on the latest element
    pub fn fail<E>(&mut self, err: E) -> SequenceError<E> {
        log::debug!(
            "Sequence callback failed after {} elements; releasing source",
            self.produced
        );
        self.terminate(SequenceState::Failed);
        SequenceError::Propagated(err)
    }
}

impl<S: TryStream + Unpin> Stepper<S> {
    /// Produce the next element, or `None` once a terminal state has been reached.
    ///
    /// Errors are returned exactly once; afterwards the stepper is fused.
    pub fn poll_step(
        &mut self,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<S::Ok, SequenceError<S::Error>>>> {
        use SequenceState as St;

        if self.state.is_terminal() {
            return Poll::Ready(None);
        }

        if self.source.is_none() {
            log::debug!("Sequence processing started without a source");
            self.terminate(St::Failed);
            return Poll::Ready(Some(Err(SequenceError::NullSource)));
        }

        // Checkpoint: only once per element, not on every re-poll of a pending request
        if !self.awaiting {
            if self.signal.is_requested() {
                log::debug!(
                    "Cancellation observed after {} elements; releasing source",
                    self.produced
                );
                self.terminate(St::Canceled);
                return Poll::Ready(Some(Err(SequenceError::Canceled)));
            }
            self.awaiting = true;
            self.state = St::Stepping;
        }

        let Some(source) = self.source.as_mut() else {
            return Poll::Ready(None);
        };
        let polled = ready!(source.try_poll_next_unpin(cx));
        self.awaiting = false;

        match polled {
            Some(Ok(element)) => {
                self.produced += 1;
                Poll::Ready(Some(Ok(element)))
            }
            Some(Err(err)) => {
                log::debug!(
                    "Source failed after {} elements; releasing source",
                    self.produced
                );
                self.terminate(St::Failed);
                Poll::Ready(Some(Err(SequenceError::Propagated(err))))
            }
            None => {
                log::trace!("Sequence completed after {} elements", self.produced);
                self.terminate(St::Completed);
                Poll::Ready(None)
            }
        }
    }
}
