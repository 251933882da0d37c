use crate::cancel::Canceled;

/// Reasons an asynchronous sequence operation terminated early.
///
/// `E` is the error type of the source sequence; caller supplied actions and transforms
/// report their failures with the same type.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SequenceError<E> {
    /// The operation was started without a source sequence
    #[error("no source sequence was supplied")]
    NullSource,
    /// The cancellation signal was observed before requesting the next element
    #[error("sequence processing was canceled")]
    Canceled,
    /// The source or a caller supplied callback failed; the error is passed on unchanged
    #[error(transparent)]
    Propagated(E),
}

impl<E> SequenceError<E> {
    /// Whether this is [SequenceError::NullSource]
    pub fn is_null_source(&self) -> bool {
        matches!(self, Self::NullSource)
    }

    /// Whether this is [SequenceError::Canceled]
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }

    /// Extract the error raised by the source or a callback, if that is what happened
    pub fn propagated(self) -> Option<E> {
        match self {
            Self::Propagated(err) => Some(err),
            _ => None,
        }
    }
}

impl<E> From<Canceled> for SequenceError<E> {
    fn from(_: Canceled) -> Self {
        Self::Canceled
    }
}
