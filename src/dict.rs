use core::fmt;
use core::mem;

#[cfg(feature = "ahash")]
use core::hash::Hash;

use log::{debug, warn};

use crate::raw::{buckets_for, chain_find, chain_find_mut, Entry, Link, RawTable, MIN_BUCKETS};
use crate::{DictType, Error, Hashed};

/// With [`ResizePolicy::Avoid`], the load factor a table must exceed before it grows anyway.
pub(crate) const FORCE_RESIZE_RATIO: usize = 4;

/// A table shrinks once it is at most 1/`MIN_FILL` full.
pub(crate) const MIN_FILL: usize = 8;

/// Controls when a [`Dict`] resizes itself.
///
/// Explicit calls such as [`Dict::expand`] are not affected by the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizePolicy {
    /// Grow once there are as many entries as buckets, shrink once the table is 1/8 full.
    Enable,
    /// Resize only under pressure: grow past a load factor of 4, shrink below 1/32.
    ///
    /// Useful while something else (a forked snapshot, say) makes touching lots of memory
    /// expensive.
    Avoid,
    /// Never resize automatically. The first table is still allocated on the first insert.
    Forbid,
}

impl Default for ResizePolicy {
    fn default() -> Self {
        ResizePolicy::Enable
    }
}

/// Identifies a bucket in one of the two tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    Main(usize),
    Leftover(usize),
}

/// The table being drained while a rehash is in progress.
pub(crate) struct OldTable<K, V> {
    pub(crate) table: RawTable<K, V>,

    // Every bucket below `cursor` has already been moved to the main table and is empty.
    pub(crate) cursor: usize,
}

impl<K: Clone, V: Clone> Clone for OldTable<K, V> {
    fn clone(&self) -> Self {
        OldTable {
            table: self.table.clone(),
            cursor: self.cursor,
        }
    }
}

/// A chained hash dictionary that moves entries to a resized table a bucket at a time.
///
/// When the dictionary decides to grow or shrink, it allocates the new bucket array and from
/// then on all inserts go there. The entries of the old array are moved over one bucket per
/// operation (any operation: lookups, inserts, and deletes all help out), or in bulk through
/// [`Dict::rehash`] and [`Dict::rehash_for_duration`]. Until the old array is drained, lookups
/// check both.
///
/// Hashing, key comparison, and what happens to keys and values on their way in and out is
/// determined by the [`DictType`] descriptor given at construction.
pub struct Dict<K, V, T = Hashed>
where
    T: DictType<K, V>,
{
    pub(crate) ty: T,

    // Where new entries go. While rehashing, this is the resized table.
    pub(crate) table: RawTable<K, V>,

    // `Some` exactly while a rehash is in progress.
    pub(crate) leftovers: Option<OldTable<K, V>>,

    // While non-zero, no rehash steps are taken and no resize is started.
    pub(crate) pause: usize,

    pub(crate) policy: ResizePolicy,
}

#[cfg(feature = "ahash")]
impl<K: Hash + Eq, V> Dict<K, V, Hashed> {
    /// Creates an empty `Dict` that hashes with a randomly seeded default hasher.
    ///
    /// No memory is allocated until the first insert.
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn new() -> Self {
        Self::with_type(Hashed::new())
    }
}

impl<K, V, T> Default for Dict<K, V, T>
where
    T: DictType<K, V> + Default,
{
    #[cfg_attr(feature = "inline-more", inline)]
    fn default() -> Self {
        Self::with_type(T::default())
    }
}

impl<K, V, T> Dict<K, V, T>
where
    T: DictType<K, V>,
{
    /// Creates an empty `Dict` that uses `ty` to hash, compare, and dispose of its contents.
    ///
    /// No memory is allocated until the first insert.
    #[cfg_attr(feature = "inline-more", inline)]
    pub const fn with_type(ty: T) -> Self {
        Dict {
            ty,
            table: RawTable::new(),
            leftovers: None,
            pause: 0,
            policy: ResizePolicy::Enable,
        }
    }

    /// Returns a reference to the dictionary's type descriptor.
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn dict_type(&self) -> &T {
        &self.ty
    }

    /// Returns the number of entries in the dictionary.
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn len(&self) -> usize {
        self.table.len() + self.leftovers.as_ref().map_or(0, |lo| lo.table.len())
    }

    /// Returns true if the dictionary holds no entries.
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of buckets in the table new entries are inserted into.
    ///
    /// While a rehash is in progress, this is the size of the resized table.
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn buckets(&self) -> usize {
        self.table.buckets()
    }

    /// Returns true if entries are still being moved from an old table.
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn is_rehashing(&self) -> bool {
        self.leftovers.is_some()
    }

    /// Returns the current resize policy.
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn resize_policy(&self) -> ResizePolicy {
        self.policy
    }

    /// Sets when the dictionary may resize itself.
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn set_resize_policy(&mut self, policy: ResizePolicy) {
        self.policy = policy;
    }

    /// Returns the chain head of a bucket.
    #[inline]
    pub(crate) fn chain(&self, slot: Slot) -> &Link<K, V> {
        match slot {
            Slot::Main(i) => self.table.bucket(i),
            Slot::Leftover(i) => match self.leftovers {
                Some(ref lo) => lo.table.bucket(i),
                None => unreachable!("leftover slot without a rehash in progress"),
            },
        }
    }

    /// Finds the bucket holding `key`, if any.
    fn position(&self, hash: u64, key: &K) -> Option<Slot> {
        let ty = &self.ty;
        if self.table.is_allocated() {
            let i = self.table.index(hash);
            if chain_find(self.table.bucket(i), |k| ty.key_eq(k, key)).is_some() {
                return Some(Slot::Main(i));
            }
        }
        let lo = self.leftovers.as_ref()?;
        let i = lo.table.index(hash);
        // Buckets before the cursor have moved already, so the key can't be there.
        if i < lo.cursor {
            return None;
        }
        chain_find(lo.table.bucket(i), |k| ty.key_eq(k, key)).map(|_| Slot::Leftover(i))
    }

    fn lookup(&self, hash: u64, key: &K) -> Option<&Entry<K, V>> {
        let slot = self.position(hash, key)?;
        chain_find(self.chain(slot), |k| self.ty.key_eq(k, key))
    }

    fn entry_mut(&mut self, slot: Slot, key: &K) -> Option<&mut Entry<K, V>> {
        let Dict {
            ty,
            table,
            leftovers,
            ..
        } = self;
        let head = match slot {
            Slot::Main(i) => table.bucket_mut(i),
            Slot::Leftover(i) => leftovers.as_mut()?.table.bucket_mut(i),
        };
        chain_find_mut(head, |k| ty.key_eq(k, key))
    }

    /// Looks up `key`.
    ///
    /// If a rehash is in progress, this also moves one bucket's worth of entries.
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn find(&mut self, key: &K) -> Option<&Entry<K, V>> {
        if self.is_empty() {
            return None;
        }
        self.rehash_step();
        let hash = self.ty.hash(key);
        self.lookup(hash, key)
    }

    /// Looks up `key`, allowing its value to be modified.
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn find_mut(&mut self, key: &K) -> Option<&mut Entry<K, V>> {
        if self.is_empty() {
            return None;
        }
        self.rehash_step();
        let hash = self.ty.hash(key);
        let slot = self.position(hash, key)?;
        self.entry_mut(slot, key)
    }

    /// Returns the value stored for `key`.
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn fetch_value(&mut self, key: &K) -> Option<&V> {
        self.find(key).map(Entry::value)
    }

    /// Returns true if `key` is present.
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn contains_key(&mut self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Inserts `key` with `value`, failing if the key is already present.
    ///
    /// The new entry goes to the head of its bucket's chain. If the dictionary is full enough,
    /// this starts an incremental resize; see [`ResizePolicy`].
    ///
    /// The only errors are [`Error::KeyExists`], and [`Error::AllocationFailure`] if the very
    /// first table cannot be allocated. In both cases `key` and `value` are dropped.
    pub fn add(&mut self, key: K, value: V) -> Result<(), Error> {
        self.rehash_step();
        let hash = self.ty.hash(&key);
        if self.position(hash, &key).is_some() {
            return Err(Error::KeyExists);
        }
        self.insert_new(hash, key, value).map(|_| ())
    }

    /// Inserts `key` with `value`, or replaces the value of an existing entry.
    ///
    /// Returns `true` if a new entry was added and `false` if an existing value was replaced. The
    /// new value is installed before the old one is handed to
    /// [`DictType::destroy_value`], so replacing a value with itself is safe.
    pub fn replace(&mut self, key: K, value: V) -> Result<bool, Error> {
        self.rehash_step();
        let hash = self.ty.hash(&key);
        match self.position(hash, &key) {
            Some(slot) => {
                let value = self.ty.dup_value(value);
                let old = match self.entry_mut(slot, &key) {
                    Some(e) => e.set_value(value),
                    None => unreachable!("entry vanished between lookup and replace"),
                };
                self.ty.destroy_value(old);
                Ok(false)
            }
            None => self.insert_new(hash, key, value).map(|_| true),
        }
    }

    /// Returns the entry for `key`, inserting it with the value produced by `default` if absent.
    ///
    /// If the key is already present, the given `key` is dropped as-is.
    pub fn add_or_find(
        &mut self,
        key: K,
        default: impl FnOnce() -> V,
    ) -> Result<&mut Entry<K, V>, Error> {
        self.rehash_step();
        let hash = self.ty.hash(&key);
        match self.position(hash, &key) {
            Some(slot) => self.entry_mut(slot, &key).ok_or(Error::KeyNotFound),
            None => self.insert_new(hash, key, default()),
        }
    }

    /// Inserts a key that is known to be absent.
    fn insert_new(&mut self, hash: u64, key: K, value: V) -> Result<&mut Entry<K, V>, Error> {
        self.expand_if_needed()?;
        let key = self.ty.dup_key(key);
        let value = self.ty.dup_value(value);
        // While rehashing, `table` is the new table, so new entries never need to move.
        let i = self.table.index(hash);
        Ok(self.table.push_front(i, Entry::boxed(key, value, None)))
    }

    /// Removes `key`, handing its key and value to the type's destroy hooks.
    pub fn delete(&mut self, key: &K) -> Result<(), Error> {
        let (k, v) = self.unlink(key).ok_or(Error::KeyNotFound)?;
        self.ty.destroy_key(k);
        self.ty.destroy_value(v);
        Ok(())
    }

    /// Removes `key` and returns its key and value without running the destroy hooks.
    pub fn unlink(&mut self, key: &K) -> Option<(K, V)> {
        if self.is_empty() {
            return None;
        }
        self.rehash_step();
        let hash = self.ty.hash(key);
        let slot = self.position(hash, key)?;
        let Dict {
            ty,
            table,
            leftovers,
            ..
        } = self;
        let entry = match slot {
            Slot::Main(i) => table.unlink(i, |k| ty.key_eq(k, key)),
            Slot::Leftover(i) => leftovers.as_mut()?.table.unlink(i, |k| ty.key_eq(k, key)),
        }?;
        if self.pause == 0 {
            self.finish_if_drained();
            self.shrink_if_needed();
        }
        Some(entry.into_parts())
    }

    /// Removes every entry, running the destroy hooks, and frees both tables.
    pub fn clear(&mut self) {
        let ty = &self.ty;
        let dispose = |e: alloc::boxed::Box<Entry<K, V>>| {
            let (k, v) = e.into_parts();
            ty.destroy_key(k);
            ty.destroy_value(v);
        };
        if let Some(ref mut lo) = self.leftovers {
            lo.table.drain_with(dispose);
        }
        self.table.drain_with(dispose);
        self.leftovers = None;
        self.table = RawTable::new();
    }

    /// Destroys the dictionary and everything in it.
    ///
    /// This is what dropping the dictionary does too; it exists for callers that want the
    /// release to be explicit.
    pub fn release(mut self) {
        self.clear();
    }

    /// Grows or shrinks the dictionary to fit `size` entries, starting an incremental rehash.
    ///
    /// The new table has the smallest power-of-two number of buckets (at least 4) that holds
    /// `size`. Allocation failure is fatal; use [`Dict::try_expand`] to handle it.
    ///
    /// Fails with [`Error::Rehashing`] or [`Error::Paused`] if a resize cannot start right now,
    /// and with [`Error::InvalidSize`] if `size` is smaller than [`Dict::len`] or would produce a
    /// table of the current size.
    pub fn expand(&mut self, size: usize) -> Result<(), Error> {
        self.resize(size, false)
    }

    /// Like [`Dict::expand`], but reports allocation failure as [`Error::AllocationFailure`].
    pub fn try_expand(&mut self, size: usize) -> Result<(), Error> {
        self.resize(size, true)
    }

    /// Shrinks the dictionary to the smallest table that holds its current entries.
    ///
    /// Does nothing if the table is already that size.
    pub fn shrink_to_fit(&mut self) -> Result<(), Error> {
        let need = usize::max(self.len(), MIN_BUCKETS);
        match self.resize(need, false) {
            Err(Error::InvalidSize { .. }) => Ok(()),
            r => r,
        }
    }

    fn resize(&mut self, size: usize, fallible: bool) -> Result<(), Error> {
        if self.leftovers.is_some() {
            return Err(Error::Rehashing);
        }
        if self.pause > 0 {
            return Err(Error::Paused);
        }
        let used = self.table.len();
        let buckets = buckets_for(size).ok_or(Error::AllocationFailure { buckets: size })?;
        if size < used || buckets == self.table.buckets() {
            return Err(Error::InvalidSize {
                requested: size,
                used,
            });
        }
        self.resize_to(buckets, fallible)
    }

    /// Swaps in a fresh table of `buckets` buckets, leaving the old one to be drained.
    pub(crate) fn resize_to(&mut self, buckets: usize, fallible: bool) -> Result<(), Error> {
        debug_assert!(self.leftovers.is_none());
        let new_table = if fallible {
            RawTable::try_with_buckets(buckets)?
        } else {
            RawTable::with_buckets(buckets)
        };
        let old_table = mem::replace(&mut self.table, new_table);
        if old_table.len() != 0 {
            debug!(
                "rehashing {} entries from {} to {} buckets",
                old_table.len(),
                old_table.buckets(),
                buckets
            );
            self.leftovers = Some(OldTable {
                table: old_table,
                cursor: 0,
            });
        }
        Ok(())
    }

    /// Allocates the first table, or starts a grow if the load factor calls for it.
    ///
    /// Only the first allocation can fail; a failed grow leaves the current table in place.
    fn expand_if_needed(&mut self) -> Result<(), Error> {
        if !self.table.is_allocated() && self.leftovers.is_none() {
            return self.resize_to(MIN_BUCKETS, true);
        }
        self.grow_if_needed();
        Ok(())
    }

    fn grow_if_needed(&mut self) {
        if self.leftovers.is_some() || self.pause > 0 || !self.table.is_allocated() {
            return;
        }
        let used = self.table.len();
        let size = self.table.buckets();
        let grow = match self.policy {
            ResizePolicy::Enable => used >= size,
            ResizePolicy::Avoid => used >= FORCE_RESIZE_RATIO.saturating_mul(size),
            ResizePolicy::Forbid => false,
        };
        if !grow {
            return;
        }
        let buckets = match buckets_for(used + 1) {
            Some(b) => b,
            None => return,
        };
        let more_mem = buckets.saturating_mul(mem::size_of::<Link<K, V>>());
        if !self.ty.expand_allowed(more_mem, used as f64 / size as f64) {
            return;
        }
        if let Err(e) = self.resize_to(buckets, true) {
            warn!("not growing past {} buckets: {}", size, e);
        }
    }

    pub(crate) fn shrink_if_needed(&mut self) {
        if self.leftovers.is_some() || self.pause > 0 {
            return;
        }
        let used = self.table.len();
        let size = self.table.buckets();
        if size <= MIN_BUCKETS {
            return;
        }
        let shrink = match self.policy {
            ResizePolicy::Enable => used.saturating_mul(MIN_FILL) <= size,
            ResizePolicy::Avoid => {
                used.saturating_mul(MIN_FILL * FORCE_RESIZE_RATIO) <= size
            }
            ResizePolicy::Forbid => false,
        };
        if !shrink {
            return;
        }
        // A failed shrink just means the table stays roomy.
        if let Err(e) = self.resize_to(usize::max(size / 2, MIN_BUCKETS), true) {
            warn!("not shrinking below {} buckets: {}", size, e);
        }
    }

    /// Applies any resize that was held back while rehashing was paused.
    pub(crate) fn resize_if_needed(&mut self) {
        self.grow_if_needed();
        self.shrink_if_needed();
    }
}

impl<K, V, T> Drop for Dict<K, V, T>
where
    T: DictType<K, V>,
{
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K, V, T> Clone for Dict<K, V, T>
where
    K: Clone,
    V: Clone,
    T: DictType<K, V> + Clone,
{
    fn clone(&self) -> Self {
        Dict {
            ty: self.ty.clone(),
            table: self.table.clone(),
            leftovers: self.leftovers.clone(),
            pause: 0,
            policy: self.policy,
        }
    }
}

impl<K, V, T> fmt::Debug for Dict<K, V, T>
where
    K: fmt::Debug,
    V: fmt::Debug,
    T: DictType<K, V>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|e| (e.key(), e.value())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{Collide, Counting, Fnv};
    use alloc::string::{String, ToString};

    fn fnv_dict<K: core::hash::Hash + Eq, V>() -> Dict<K, V, Fnv> {
        Dict::with_type(Fnv::default())
    }

    #[test]
    fn lazily_allocates() {
        let mut d = fnv_dict::<u32, u32>();
        assert_eq!(d.buckets(), 0);
        assert!(d.find(&1).is_none());
        d.add(1, 1).unwrap();
        assert_eq!(d.buckets(), MIN_BUCKETS);
        assert!(!d.is_rehashing());
    }

    #[test]
    fn add_rejects_duplicates() {
        let mut d = fnv_dict();
        d.add("a", 1).unwrap();
        assert_eq!(d.add("a", 2), Err(Error::KeyExists));
        assert_eq!(d.fetch_value(&"a"), Some(&1));
        assert_eq!(d.len(), 1);
    }

    #[test]
    fn grows_at_load_one() {
        let mut d = fnv_dict();
        for i in 0..4u32 {
            d.add(i, i).unwrap();
        }
        assert_eq!(d.buckets(), 4);
        assert!(!d.is_rehashing());
        d.add(4, 4).unwrap();
        assert_eq!(d.buckets(), 8);
        assert!(d.is_rehashing());
        while d.rehash(1) {}
        assert_eq!(d.len(), 5);
        for i in 0..5 {
            assert_eq!(d.fetch_value(&i), Some(&i));
        }
    }

    #[test]
    fn no_grow_while_rehashing() {
        let mut d = fnv_dict();
        for i in 0..5u32 {
            d.add(i, ()).unwrap();
        }
        d.pause_rehashing();
        for i in 5..100u32 {
            d.add(i, ()).unwrap();
        }
        assert_eq!(d.buckets(), 8);
        d.resume_rehashing();
        assert_eq!(d.len(), 100);
    }

    #[test]
    fn replace_swaps_value() {
        let mut d = Dict::with_type(Counting::default());
        assert_eq!(d.replace("k".to_string(), 1), Ok(true));
        assert_eq!(d.replace("k".to_string(), 2), Ok(false));
        // Stored values go through `dup_value`, which doubles them.
        assert_eq!(d.fetch_value(&"k".to_string()), Some(&4));
        assert_eq!(d.dict_type().values_destroyed(), 1);
        assert_eq!(d.dict_type().keys_destroyed(), 0);
    }

    #[test]
    fn delete_and_unlink() {
        let mut d = Dict::with_type(Counting::default());
        d.add("a".to_string(), 1).unwrap();
        d.add("b".to_string(), 2).unwrap();
        assert_eq!(d.delete(&"a".to_string()), Ok(()));
        assert_eq!(d.delete(&"a".to_string()), Err(Error::KeyNotFound));
        assert_eq!(d.dict_type().keys_destroyed(), 1);
        assert_eq!(d.unlink(&"b".to_string()), Some(("B".to_string(), 4)));
        assert_eq!(d.dict_type().keys_destroyed(), 1);
        assert!(d.is_empty());
    }

    #[test]
    fn drop_runs_hooks() {
        let ty = Counting::default();
        let mut d = Dict::with_type(ty.clone());
        for i in 0..100 {
            d.add(i.to_string(), i).unwrap();
        }
        while d.rehash(100) {}
        d.expand(1024).unwrap();
        assert!(d.is_rehashing());
        drop(d);
        assert_eq!(ty.keys_destroyed(), 100);
        assert_eq!(ty.values_destroyed(), 100);
    }

    #[test]
    fn release_runs_hooks() {
        let ty = Counting::default();
        let mut d = Dict::with_type(ty.clone());
        d.add("x".to_string(), 0).unwrap();
        d.release();
        assert_eq!(ty.keys_destroyed(), 1);
    }

    #[test]
    fn dup_hooks_apply() {
        let mut d = Dict::with_type(Counting::default());
        d.add("abc".to_string(), 1).unwrap();
        // `Counting` upper-cases keys and doubles values on the way in.
        let e = d.find(&"abc".to_string()).unwrap();
        assert_eq!(e.key(), "ABC");
        assert_eq!(*e.value(), 2);
    }

    #[test]
    fn add_or_find() {
        let mut d = fnv_dict();
        *d.add_or_find("a", || 1).unwrap().value_mut() += 10;
        let e = d.add_or_find("a", || unreachable!()).unwrap();
        assert_eq!(*e.value(), 11);
        assert_eq!(d.len(), 1);
    }

    #[test]
    fn find_mut() {
        let mut d = fnv_dict();
        d.add(7u8, String::from("seven")).unwrap();
        d.find_mut(&7).unwrap().value_mut().push('!');
        assert_eq!(d.fetch_value(&7).map(String::as_str), Some("seven!"));
        assert!(d.find_mut(&8).is_none());
    }

    #[test]
    fn explicit_expand() {
        let mut d = fnv_dict();
        d.expand(1000).unwrap();
        assert_eq!(d.buckets(), 1024);
        assert!(!d.is_rehashing(), "growing an empty table needs no rehash");
        assert!(matches!(d.expand(1000), Err(Error::InvalidSize { .. })));
        for i in 0..10u32 {
            d.add(i, ()).unwrap();
        }
        assert_eq!(
            d.try_expand(5),
            Err(Error::InvalidSize {
                requested: 5,
                used: 10
            })
        );
        d.try_expand(16).unwrap();
        assert!(d.is_rehashing());
        assert_eq!(d.expand(4096), Err(Error::Rehashing));
        while d.rehash(100) {}
        assert_eq!(d.buckets(), 16);
        for i in 0..10u32 {
            assert!(d.contains_key(&i));
        }
    }

    #[test]
    fn expand_rejected_while_paused() {
        let mut d = fnv_dict::<u32, ()>();
        d.pause_rehashing();
        assert_eq!(d.expand(64), Err(Error::Paused));
        d.resume_rehashing();
        assert_eq!(d.expand(64), Ok(()));
    }

    #[test]
    fn capacity_overflow() {
        let mut d = fnv_dict::<u32, ()>();
        assert!(matches!(
            d.try_expand(usize::MAX),
            Err(Error::AllocationFailure { .. })
        ));
    }

    #[test]
    fn shrinks_by_halving() {
        let mut d = fnv_dict();
        for i in 0..64u32 {
            d.add(i, ()).unwrap();
        }
        while d.rehash(100) {}
        assert_eq!(d.buckets(), 64);
        // 64 buckets shrink once at most 8 entries remain.
        for i in 0..56u32 {
            d.delete(&i).unwrap();
        }
        assert_eq!(d.buckets(), 32);
        assert!(d.is_rehashing());
        while d.rehash(100) {}
        for i in 56..64u32 {
            assert!(d.contains_key(&i));
        }
    }

    #[test]
    fn shrink_to_fit() {
        let mut d = fnv_dict();
        d.expand(512).unwrap();
        for i in 0..20u32 {
            d.add(i, i).unwrap();
        }
        d.shrink_to_fit().unwrap();
        assert_eq!(d.buckets(), 32);
        while d.rehash(10) {}
        assert_eq!(d.len(), 20);
        assert_eq!(d.shrink_to_fit(), Ok(()));
        assert_eq!(d.buckets(), 32);
    }

    #[test]
    fn policy_avoid_and_forbid() {
        let mut d = fnv_dict();
        d.set_resize_policy(ResizePolicy::Forbid);
        for i in 0..100u32 {
            d.add(i, ()).unwrap();
        }
        assert_eq!(d.buckets(), 4);
        for i in 0..100u32 {
            assert!(d.contains_key(&i));
        }

        let mut d = fnv_dict();
        d.set_resize_policy(ResizePolicy::Avoid);
        for i in 0..16u32 {
            d.add(i, ()).unwrap();
        }
        assert_eq!(d.buckets(), 4);
        d.add(16, ()).unwrap();
        assert_eq!(d.buckets(), 32);
    }

    #[test]
    fn expand_veto() {
        let mut d = Dict::with_type(Collide::refusing_growth());
        for i in 0..50u32 {
            d.add(i, i).unwrap();
        }
        assert_eq!(d.buckets(), 4);
        assert_eq!(d.len(), 50);
        assert_eq!(d.fetch_value(&49), Some(&49));
    }

    #[test]
    fn clear_resets() {
        let mut d = fnv_dict();
        for i in 0..100u32 {
            d.add(i, ()).unwrap();
        }
        d.clear();
        assert!(d.is_empty());
        assert!(!d.is_rehashing());
        assert_eq!(d.buckets(), 0);
        d.add(1, ()).unwrap();
        assert_eq!(d.len(), 1);
    }

    #[test]
    fn clone_mid_rehash() {
        let mut d = fnv_dict();
        for i in 0..100u32 {
            d.add(i, i * 2).unwrap();
        }
        while d.rehash(100) {}
        d.expand(1024).unwrap();
        assert!(d.is_rehashing());
        let mut c = d.clone();
        assert!(c.is_rehashing());
        assert_eq!(c.len(), 100);
        for i in 0..100u32 {
            assert_eq!(c.fetch_value(&i), Some(&(i * 2)));
        }
        c.delete(&0).unwrap();
        assert!(d.contains_key(&0));
    }

    #[test]
    fn debug_fmt() {
        let mut d = fnv_dict();
        d.add(1u8, 'a').unwrap();
        assert_eq!(format!("{:?}", d), "{1: 'a'}");
    }
}
