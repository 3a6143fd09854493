//! Bucket tables and the chains that hang off them.
//!
//! This is the storage layer underneath [`Dict`](crate::Dict). A [`RawTable`] is a power-of-two
//! sized array of chain heads, and knows nothing about rehashing, hashing policy, or the
//! [`DictType`](crate::DictType) hooks. Every key's home bucket is `hash & mask` relative to the
//! table that currently holds it.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;
use core::iter::FusedIterator;
use core::mem;

use crate::Error;

/// Smallest number of buckets a non-empty table will ever have.
pub(crate) const MIN_BUCKETS: usize = 4;

/// The head of a chain, or the `next` link of an entry.
pub(crate) type Link<K, V> = Option<Box<Entry<K, V>>>;

/// A single key-value pair stored in a [`Dict`](crate::Dict).
///
/// Entries are returned by lookups, random sampling, and iteration. The key can never be changed
/// in place, since that would move it to a different bucket.
pub struct Entry<K, V> {
    key: K,
    value: V,
    pub(crate) next: Link<K, V>,
}

impl<K, V> Entry<K, V> {
    #[inline]
    pub(crate) fn boxed(key: K, value: V, next: Link<K, V>) -> Box<Self> {
        Box::new(Entry { key, value, next })
    }

    /// Returns a reference to this entry's key.
    #[inline]
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Returns a reference to this entry's value.
    #[inline]
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Returns a mutable reference to this entry's value.
    #[inline]
    pub fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    #[inline]
    pub(crate) fn parts_mut(&mut self) -> (&K, &mut V) {
        (&self.key, &mut self.value)
    }

    /// Swaps in a new value, returning the old one.
    #[inline]
    pub(crate) fn set_value(&mut self, value: V) -> V {
        mem::replace(&mut self.value, value)
    }

    /// Detaches the entry from its chain and splits it into its key and value.
    #[inline]
    pub(crate) fn into_parts(self: Box<Self>) -> (K, V) {
        let Entry { key, value, next } = *self;
        debug_assert!(next.is_none(), "entry taken apart while still linked");
        (key, value)
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Entry<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("key", &self.key)
            .field("value", &self.value)
            .finish()
    }
}

/// Walks the chain starting at `head` and returns the first entry whose key satisfies `eq`.
#[inline]
pub(crate) fn chain_find<'a, K, V>(
    head: &'a Link<K, V>,
    mut eq: impl FnMut(&K) -> bool,
) -> Option<&'a Entry<K, V>> {
    let mut cur = head.as_deref();
    while let Some(e) = cur {
        if eq(&e.key) {
            return Some(e);
        }
        cur = e.next.as_deref();
    }
    None
}

/// Mutable version of [`chain_find`].
#[inline]
pub(crate) fn chain_find_mut<'a, K, V>(
    head: &'a mut Link<K, V>,
    mut eq: impl FnMut(&K) -> bool,
) -> Option<&'a mut Entry<K, V>> {
    let mut cur = head.as_deref_mut();
    while let Some(e) = cur {
        if eq(&e.key) {
            return Some(e);
        }
        cur = e.next.as_deref_mut();
    }
    None
}

/// Removes the first entry whose key satisfies `eq` from the chain starting at `head`.
///
/// The returned entry is fully detached (its `next` is `None`).
pub(crate) fn chain_unlink<K, V>(
    head: &mut Link<K, V>,
    mut eq: impl FnMut(&K) -> bool,
) -> Option<Box<Entry<K, V>>> {
    let mut cur = head;
    loop {
        let hit = match cur.as_deref() {
            None => return None,
            Some(e) => eq(&e.key),
        };
        if hit {
            break;
        }
        cur = match cur {
            Some(e) => &mut e.next,
            None => return None,
        };
    }
    let mut entry = cur.take()?;
    *cur = entry.next.take();
    Some(entry)
}

/// Returns the number of entries in the chain starting at `head`.
#[inline]
pub(crate) fn chain_len<K, V>(head: &Link<K, V>) -> usize {
    let mut n = 0;
    let mut cur = head.as_deref();
    while let Some(e) = cur {
        n += 1;
        cur = e.next.as_deref();
    }
    n
}

/// Returns the `n`th entry (zero-based) in the chain starting at `head`.
#[inline]
pub(crate) fn chain_nth<K, V>(head: &Link<K, V>, n: usize) -> Option<&Entry<K, V>> {
    let mut cur = head.as_deref();
    for _ in 0..n {
        cur = cur?.next.as_deref();
    }
    cur
}

/// Mutable version of [`chain_nth`].
#[inline]
pub(crate) fn chain_nth_mut<K, V>(head: &mut Link<K, V>, n: usize) -> Option<&mut Entry<K, V>> {
    let mut cur = head.as_deref_mut();
    for _ in 0..n {
        cur = cur?.next.as_deref_mut();
    }
    cur
}

/// Rounds `size` up to the bucket count a table holding `size` entries should have.
#[inline]
pub(crate) fn buckets_for(size: usize) -> Option<usize> {
    usize::max(size, MIN_BUCKETS).checked_next_power_of_two()
}

/// A power-of-two array of chain heads.
///
/// An unallocated table has zero buckets, and a mask of zero. Dropping a table drops its chains
/// iteratively, so long chains never recurse.
pub(crate) struct RawTable<K, V> {
    buckets: Vec<Link<K, V>>,
    mask: usize,
    used: usize,
}

impl<K, V> RawTable<K, V> {
    /// Creates a table without any buckets.
    #[inline]
    pub(crate) const fn new() -> Self {
        RawTable {
            buckets: Vec::new(),
            mask: 0,
            used: 0,
        }
    }

    /// Allocates a table with exactly `buckets` empty buckets.
    ///
    /// Allocation failure aborts, like every other infallible collection allocation.
    pub(crate) fn with_buckets(buckets: usize) -> Self {
        debug_assert!(buckets.is_power_of_two());
        let mut v = Vec::with_capacity(buckets);
        v.resize_with(buckets, || None);
        RawTable {
            buckets: v,
            mask: buckets - 1,
            used: 0,
        }
    }

    /// Allocates a table with exactly `buckets` empty buckets, reporting allocation failure.
    pub(crate) fn try_with_buckets(buckets: usize) -> Result<Self, Error> {
        debug_assert!(buckets.is_power_of_two());
        let mut v = Vec::new();
        v.try_reserve_exact(buckets)
            .map_err(|_| Error::AllocationFailure { buckets })?;
        v.resize_with(buckets, || None);
        Ok(RawTable {
            buckets: v,
            mask: buckets - 1,
            used: 0,
        })
    }

    /// Returns the number of buckets, which is zero for an unallocated table.
    #[inline]
    pub(crate) fn buckets(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    pub(crate) fn mask(&self) -> usize {
        self.mask
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.used
    }

    #[inline]
    pub(crate) fn is_allocated(&self) -> bool {
        !self.buckets.is_empty()
    }

    /// Returns the bucket index `hash` maps to in this table.
    #[inline]
    pub(crate) fn index(&self, hash: u64) -> usize {
        hash as usize & self.mask
    }

    #[inline]
    pub(crate) fn bucket(&self, index: usize) -> &Link<K, V> {
        &self.buckets[index]
    }

    #[inline]
    pub(crate) fn bucket_mut(&mut self, index: usize) -> &mut Link<K, V> {
        &mut self.buckets[index]
    }

    /// Links `entry` in at the head of bucket `index`.
    #[inline]
    pub(crate) fn push_front(&mut self, index: usize, mut entry: Box<Entry<K, V>>) -> &mut Entry<K, V> {
        let slot = &mut self.buckets[index];
        entry.next = slot.take();
        self.used += 1;
        slot.insert(entry)
    }

    /// Removes the first entry in bucket `index` whose key satisfies `eq`.
    #[inline]
    pub(crate) fn unlink(
        &mut self,
        index: usize,
        eq: impl FnMut(&K) -> bool,
    ) -> Option<Box<Entry<K, V>>> {
        let e = chain_unlink(&mut self.buckets[index], eq)?;
        self.used -= 1;
        Some(e)
    }

    /// Removes the `n`th entry of bucket `index`.
    pub(crate) fn unlink_nth(&mut self, index: usize, n: usize) -> Option<Box<Entry<K, V>>> {
        let mut i = 0;
        self.unlink(index, |_| {
            i += 1;
            i == n + 1
        })
    }

    /// Detaches the whole chain in bucket `index`, leaving the bucket empty.
    #[inline]
    pub(crate) fn take_chain(&mut self, index: usize) -> (Link<K, V>, usize) {
        let chain = self.buckets[index].take();
        let n = chain_len(&chain);
        self.used -= n;
        (chain, n)
    }

    /// Detaches every chain, handing each entry to `f`, and leaves the table allocated but empty.
    pub(crate) fn drain_with(&mut self, mut f: impl FnMut(Box<Entry<K, V>>)) {
        for slot in self.buckets.iter_mut() {
            let mut cur = slot.take();
            while let Some(mut e) = cur {
                cur = e.next.take();
                f(e);
            }
        }
        self.used = 0;
    }

    /// Returns an iterator over every entry in the table, starting at bucket `from`.
    #[inline]
    pub(crate) fn iter_from(&self, from: usize) -> RawIter<'_, K, V> {
        let from = usize::min(from, self.buckets.len());
        RawIter {
            buckets: self.buckets[from..].iter(),
            chain: None,
            left: self.used,
        }
    }
}

impl<K, V> Drop for RawTable<K, V> {
    fn drop(&mut self) {
        self.drain_with(drop);
    }
}

impl<K: Clone, V: Clone> Clone for RawTable<K, V> {
    fn clone(&self) -> Self {
        let mut buckets = Vec::with_capacity(self.buckets.len());
        let mut chain = Vec::new();
        for slot in &self.buckets {
            let mut cur = slot.as_deref();
            while let Some(e) = cur {
                chain.push((e.key.clone(), e.value.clone()));
                cur = e.next.as_deref();
            }
            // Rebuild back to front so the clone keeps the chain order.
            let mut head: Link<K, V> = None;
            while let Some((k, v)) = chain.pop() {
                head = Some(Entry::boxed(k, v, head));
            }
            buckets.push(head);
        }
        RawTable {
            buckets,
            mask: self.mask,
            used: self.used,
        }
    }
}

/// Iterator over the entries of one table in bucket order.
pub(crate) struct RawIter<'a, K, V> {
    buckets: core::slice::Iter<'a, Link<K, V>>,
    chain: Option<&'a Entry<K, V>>,
    // Upper bound only: `iter_from` may skip buckets.
    left: usize,
}

impl<K, V> Clone for RawIter<'_, K, V> {
    fn clone(&self) -> Self {
        RawIter {
            buckets: self.buckets.clone(),
            chain: self.chain,
            left: self.left,
        }
    }
}

impl<'a, K, V> Iterator for RawIter<'a, K, V> {
    type Item = &'a Entry<K, V>;

    #[cfg_attr(feature = "inline-more", inline)]
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(e) = self.chain {
                self.chain = e.next.as_deref();
                self.left = self.left.saturating_sub(1);
                return Some(e);
            }
            self.chain = self.buckets.next()?.as_deref();
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.chain.is_none() && self.buckets.len() == 0 {
            (0, Some(0))
        } else {
            (usize::from(self.chain.is_some()), Some(self.left))
        }
    }
}

impl<K, V> FusedIterator for RawIter<'_, K, V> {}
