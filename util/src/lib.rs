//! Small building blocks shared by PlainBytes applications.
//!
//! - [cancel]: cooperative cancellation signals that can be linked into one domain
//! - [sequence]: iterate, transform and filter asynchronous sequences under cancellation
//! - [typename]: render canonical, memoized display names for (generic) types

pub mod cancel;
pub mod sequence;
pub mod typename;
