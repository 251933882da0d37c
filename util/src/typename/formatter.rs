use std::collections::hash_map::RandomState;
use std::collections::HashMap;
use std::hash::BuildHasher;
use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use super::TypeDescriptor;

/// What [TypeNameFormatter::formatted_name] returns for an absent descriptor
pub const NULL_NAME: &str = "null";

/// Number of independently published parts of the cache
const SHARDS: usize = 16;

/// Immutable snapshot of one part of the cache, replaced whole on every insertion
type Shard = ArcSwap<HashMap<TypeDescriptor, Arc<str>>>;

/// Renders canonical display names for [TypeDescriptor]s and memoizes them.
///
/// Non-generic types are rendered as their name; generic types as
/// `Name<Arg1,Arg2,...>` with the arity marker dropped from `Name` and every argument
/// rendered (and memoized) recursively.
///
/// The cache is unbounded and entries never change once published. Lookups never take a
/// lock: they read an immutable snapshot, and insertions publish a new snapshot with a
/// compare-and-swap. When two threads race on the same new descriptor, both may compute
/// it but the first to publish wins and both return that same [Arc].
///
/// Use [TypeNameFormatter::global] for the process-wide instance or
/// [TypeNameFormatter::new] for one with its own cache.
///
/// # Examples
///
/// ```
/// use plainbytes_util::typename::{TypeDescriptor, TypeNameFormatter};
///
/// let formatter = TypeNameFormatter::new();
/// let int = TypeDescriptor::simple("Int32");
/// let list = TypeDescriptor::generic("List`1", [int.clone()]);
/// let dict = TypeDescriptor::generic("Dictionary`2", [TypeDescriptor::simple("String"), list]);
///
/// assert_eq!(&*formatter.formatted_name(Some(&dict)), "Dictionary<String,List<Int32>>");
/// assert_eq!(&*formatter.formatted_name(Some(&int)), "Int32");
/// assert_eq!(&*formatter.formatted_name(None), "null");
/// ```
#[derive(Debug)]
pub struct TypeNameFormatter {
    shards: Box<[Shard]>,
    hasher: RandomState,
    null: Arc<str>,
}

impl Default for TypeNameFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeNameFormatter {
    /// Create a formatter with an empty cache of its own
    pub fn new() -> Self {
        Self {
            shards: (0..SHARDS).map(|_| Shard::default()).collect(),
            hasher: RandomState::new(),
            null: Arc::from(NULL_NAME),
        }
    }

    /// The process-wide formatter.
    ///
    /// Initialized on first use; lives until the process exits.
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<TypeNameFormatter> = OnceLock::new();
        GLOBAL.get_or_init(Self::new)
    }

    /// Formatted name of `descriptor`, or [NULL_NAME] if there is none
    pub fn formatted_name(&self, descriptor: Option<&TypeDescriptor>) -> Arc<str> {
        match descriptor {
            Some(descriptor) => self.format(descriptor),
            None => self.null.clone(),
        }
    }

    /// Formatted name of `descriptor`, from the cache if possible
    pub fn format(&self, descriptor: &TypeDescriptor) -> Arc<str> {
        if let Some(name) = self.cached(descriptor) {
            return name;
        }

        let computed = self.render(descriptor);
        log::trace!("Publishing formatted type name {computed}");

        let mut published = None;
        self.shard(descriptor).rcu(|current| {
            if let Some(name) = current.get(descriptor) {
                published = Some(name.clone());
                return Arc::clone(current);
            }
            let mut next = HashMap::clone(current);
            next.insert(descriptor.clone(), computed.clone());
            published = Some(computed.clone());
            Arc::new(next)
        });
        published.unwrap_or(computed)
    }

    /// Number of descriptors whose names are cached, generic arguments included
    pub fn cached_len(&self) -> usize {
        self.shards.iter().map(|shard| shard.load().len()).sum()
    }

    /// The published name of `descriptor`, if there is one
    fn cached(&self, descriptor: &TypeDescriptor) -> Option<Arc<str>> {
        self.shard(descriptor).load().get(descriptor).cloned()
    }

    fn render(&self, descriptor: &TypeDescriptor) -> Arc<str> {
        if !descriptor.is_generic() {
            return Arc::from(descriptor.name());
        }

        let arguments: Vec<Arc<str>> = descriptor
            .arguments()
            .iter()
            .map(|argument| self.format(argument))
            .collect();
        format!("{}<{}>", descriptor.base_name(), arguments.join(",")).into()
    }

    fn shard(&self, descriptor: &TypeDescriptor) -> &Shard {
        &self.shards[self.shard_index(descriptor)]
    }

    fn shard_index(&self, descriptor: &TypeDescriptor) -> usize {
        self.hasher.hash_one(descriptor) as usize % self.shards.len()
    }
}

/// [TypeNameFormatter::formatted_name] on the [global](TypeNameFormatter::global) formatter
pub fn formatted_name(descriptor: Option<&TypeDescriptor>) -> Arc<str> {
    TypeNameFormatter::global().formatted_name(descriptor)
}

/// Formatted name of the Rust type `T` (see [TypeDescriptor::of]), using the global formatter
///
/// ```
/// use plainbytes_util::typename::formatted_name_of;
///
/// assert_eq!(&*formatted_name_of::<Vec<Option<String>>>(), "Vec<Option<String>>");
/// ```
pub fn formatted_name_of<T: ?Sized>() -> Arc<str> {
    TypeNameFormatter::global().format(&TypeDescriptor::of::<T>())
}
