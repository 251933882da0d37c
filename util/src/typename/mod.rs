//! Canonical, human readable type names.
//!
//! A [TypeDescriptor] names a type together with its generic arguments;
//! [TypeNameFormatter] turns it into a display name such as
//! `Dictionary<String,List<Int32>>` and memoizes the result.

mod descriptor;
mod formatter;
mod parse;

pub use descriptor::TypeDescriptor;
pub use formatter::{formatted_name, formatted_name_of, TypeNameFormatter, NULL_NAME};
pub use parse::{ParseTypeError, MAX_NESTING};
