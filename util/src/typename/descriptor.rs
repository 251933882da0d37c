use std::any::type_name;

use super::parse::simplify_paths;

/// Identifies a type: its name and its ordered generic arguments.
///
/// Descriptors compare and hash by value; two descriptors built for the same type are
/// equal. The arity is the number of generic arguments; a descriptor without arguments
/// describes a non-generic type.
///
/// Generic names may carry an arity marker (e.g. ``Dictionary`2``), which is dropped
/// when the name is formatted.
///
/// # Examples
///
/// ```
/// use plainbytes_util::typename::TypeDescriptor;
///
/// let list = TypeDescriptor::generic("List`1", [TypeDescriptor::simple("Int32")]);
/// assert_eq!(list.arity(), 1);
/// assert_eq!(list.base_name(), "List");
///
/// let parsed: TypeDescriptor = "List`1<Int32>".parse().unwrap();
/// assert_eq!(parsed, list);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeDescriptor {
    name: String,
    arguments: Vec<TypeDescriptor>,
}

impl TypeDescriptor {
    /// Descriptor for a non-generic type
    pub fn simple(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
        }
    }

    /// Descriptor for a generic type with the given arguments
    pub fn generic<I>(name: impl Into<String>, arguments: I) -> Self
    where
        I: IntoIterator<Item = TypeDescriptor>,
    {
        Self {
            name: name.into(),
            arguments: arguments.into_iter().collect(),
        }
    }

    /// Descriptor for the Rust type `T`, with module paths removed.
    ///
    /// Derived from [std::any::type_name], so the exact output is subject to the same
    /// caveats.
    ///
    /// ```
    /// use plainbytes_util::typename::TypeDescriptor;
    ///
    /// let d = TypeDescriptor::of::<Vec<Option<String>>>();
    /// assert_eq!(d.name(), "Vec");
    /// assert_eq!(d.arguments()[0].arguments()[0].name(), "String");
    /// ```
    pub fn of<T: ?Sized>() -> Self {
        let full = type_name::<T>();
        full.parse().unwrap_or_else(|err| {
            log::trace!("Treating {full} as an opaque type name: {err}");
            Self::simple(simplify_paths(full))
        })
    }

    /// The name as given, including any arity marker
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name without a trailing arity marker
    pub fn base_name(&self) -> &str {
        strip_arity_marker(&self.name)
    }

    /// Number of generic arguments
    pub fn arity(&self) -> usize {
        self.arguments.len()
    }

    pub fn is_generic(&self) -> bool {
        !self.arguments.is_empty()
    }

    pub fn arguments(&self) -> &[TypeDescriptor] {
        &self.arguments
    }
}

/// Remove a trailing `` `N `` arity marker
fn strip_arity_marker(name: &str) -> &str {
    match name.rsplit_once('`') {
        Some((base, arity)) if !arity.is_empty() && arity.bytes().all(|b| b.is_ascii_digit()) => {
            base
        }
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_marker_is_only_stripped_when_well_formed() {
        assert_eq!(strip_arity_marker("Dictionary`2"), "Dictionary");
        assert_eq!(strip_arity_marker("Tuple`12"), "Tuple");
        assert_eq!(strip_arity_marker("List"), "List");
        assert_eq!(strip_arity_marker("Odd`"), "Odd`");
        assert_eq!(strip_arity_marker("Odd`x"), "Odd`x");
    }

    #[test]
    fn arity_follows_arguments() {
        let int = TypeDescriptor::simple("Int32");
        assert_eq!(int.arity(), 0);
        assert!(!int.is_generic());

        let pair = TypeDescriptor::generic("KeyValuePair`2", [int.clone(), int]);
        assert_eq!(pair.arity(), 2);
        assert!(pair.is_generic());
    }

    #[test]
    fn descriptors_of_rust_types_drop_module_paths() {
        let d = TypeDescriptor::of::<std::collections::HashMap<String, Vec<i32>>>();
        assert_eq!(d.name(), "HashMap");
        assert_eq!(
            d.arguments(),
            &[
                TypeDescriptor::simple("String"),
                TypeDescriptor::generic("Vec", [TypeDescriptor::simple("i32")]),
            ]
        );

        assert_eq!(TypeDescriptor::of::<u8>(), TypeDescriptor::simple("u8"));
    }
}
