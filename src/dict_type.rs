use core::fmt;
use core::hash::{BuildHasher, Hash, Hasher};

/// Default hasher for [`Hashed`], and so for [`Dict`](crate::Dict).
#[cfg(feature = "ahash")]
pub type DefaultHashBuilder = ahash_::RandomState;

/// Dummy default hasher for [`Hashed`], used when the `ahash` feature is disabled.
#[cfg(not(feature = "ahash"))]
pub enum DefaultHashBuilder {}

#[cfg(not(feature = "ahash"))]
impl BuildHasher for DefaultHashBuilder {
    type Hasher = Self;
    fn build_hasher(&self) -> Self {
        match *self {}
    }
}

#[cfg(not(feature = "ahash"))]
impl Hasher for DefaultHashBuilder {
    fn write(&mut self, _: &[u8]) {
        match *self {}
    }
    fn finish(&self) -> u64 {
        match *self {}
    }
}

/// The set of callbacks a [`Dict`](crate::Dict) uses to deal with its keys and values.
///
/// A descriptor is handed to the dictionary once, at construction, and is shared by every
/// operation for the lifetime of the dictionary. Only hashing and key comparison are required.
/// The remaining hooks default to "take the value as-is" and "just drop it".
///
/// `hash` and `key_eq` must agree: keys that compare equal must hash equally. A poor hash makes
/// chains long, but never makes the dictionary incorrect.
pub trait DictType<K, V> {
    /// Hashes a key to 64 bits.
    fn hash(&self, key: &K) -> u64;

    /// Returns true if the two keys are the same key.
    fn key_eq(&self, a: &K, b: &K) -> bool;

    /// Transforms a key on its way into the dictionary.
    ///
    /// Called once per newly stored key. The default stores the key unchanged.
    #[inline]
    fn dup_key(&self, key: K) -> K {
        key
    }

    /// Transforms a value on its way into the dictionary.
    ///
    /// Called once per stored value, including values installed by `replace`.
    #[inline]
    fn dup_value(&self, value: V) -> V {
        value
    }

    /// Disposes of a key the dictionary is discarding.
    ///
    /// Called on delete, on clear, and when the dictionary is dropped. Keys handed back to the
    /// caller (through `unlink`, say) are never destroyed.
    #[inline]
    fn destroy_key(&self, key: K) {
        drop(key);
    }

    /// Disposes of a value the dictionary is discarding, including the old value on `replace`.
    #[inline]
    fn destroy_value(&self, value: V) {
        drop(value);
    }

    /// Decides whether an automatic expansion may go ahead.
    ///
    /// `more_mem` is the size in bytes of the bucket array about to be allocated, and
    /// `used_ratio` is the current load factor. Returning false keeps the current table, which
    /// still accepts inserts into ever longer chains.
    #[inline]
    fn expand_allowed(&self, more_mem: usize, used_ratio: f64) -> bool {
        let _ = (more_mem, used_ratio);
        true
    }
}

/// A [`DictType`] for any `K: Hash + Eq`, hashing with a [`BuildHasher`].
///
/// This is the descriptor [`Dict::new`](crate::Dict::new) uses. Using a fixed-seed builder
/// through [`Hashed::with_seeds`] (or any deterministic `BuildHasher`) makes bucket placement,
/// random sampling given a seeded RNG, and scan order reproducible.
#[derive(Clone, Default)]
pub struct Hashed<S = DefaultHashBuilder> {
    hash_builder: S,
}

#[cfg(feature = "ahash")]
impl Hashed<DefaultHashBuilder> {
    /// Creates a descriptor using a randomly seeded default hasher.
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn new() -> Self {
        Hashed {
            hash_builder: DefaultHashBuilder::new(),
        }
    }

    /// Creates a descriptor using the default hasher with the given fixed seeds.
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn with_seeds(k0: u64, k1: u64, k2: u64, k3: u64) -> Self {
        Hashed {
            hash_builder: DefaultHashBuilder::with_seeds(k0, k1, k2, k3),
        }
    }
}

impl<S> Hashed<S> {
    /// Creates a descriptor that hashes keys with `hash_builder`.
    #[cfg_attr(feature = "inline-more", inline)]
    pub const fn with_hasher(hash_builder: S) -> Self {
        Hashed { hash_builder }
    }

    /// Returns a reference to the underlying [`BuildHasher`].
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }
}

impl<S> fmt::Debug for Hashed<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad("Hashed")
    }
}

impl<K, V, S> DictType<K, V> for Hashed<S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    #[inline]
    fn hash(&self, key: &K) -> u64 {
        let mut state = self.hash_builder.build_hasher();
        key.hash(&mut state);
        state.finish()
    }

    #[inline]
    fn key_eq(&self, a: &K, b: &K) -> bool {
        a == b
    }
}
