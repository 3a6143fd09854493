use core::fmt;
use core::iter::FusedIterator;

use crate::dict::Slot;
use crate::raw::{chain_nth, chain_nth_mut, Entry, RawIter};
use crate::{Dict, DictType};

/// An iterator over the entries of a [`Dict`], in no particular order.
///
/// Entries still waiting to be moved out of the old table are yielded after those in the new
/// table.
pub struct Iter<'a, K, V> {
    table: RawIter<'a, K, V>,
    leftovers: Option<RawIter<'a, K, V>>,
    left: usize,
}

impl<K, V> Clone for Iter<'_, K, V> {
    #[cfg_attr(feature = "inline-more", inline)]
    fn clone(&self) -> Self {
        Iter {
            table: self.table.clone(),
            leftovers: self.leftovers.clone(),
            left: self.left,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = &'a Entry<K, V>;

    #[cfg_attr(feature = "inline-more", inline)]
    fn next(&mut self) -> Option<Self::Item> {
        let leftovers = &mut self.leftovers;
        let e = self
            .table
            .next()
            .or_else(|| leftovers.as_mut()?.next())?;
        self.left -= 1;
        Some(e)
    }

    #[cfg_attr(feature = "inline-more", inline)]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.left, Some(self.left))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V, T> Dict<K, V, T>
where
    T: DictType<K, V>,
{
    /// Returns an iterator over every entry.
    ///
    /// This takes no rehash steps.
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            table: self.table.iter_from(0),
            leftovers: self
                .leftovers
                .as_ref()
                .map(|lo| lo.table.iter_from(lo.cursor)),
            left: self.len(),
        }
    }

    /// Returns an iterator that can remove entries as it goes.
    ///
    /// Rehashing is paused for as long as the iterator lives, so the bucket layout stays put and
    /// every entry is visited exactly once.
    pub fn safe_iter(&mut self) -> SafeIter<'_, K, V, T> {
        self.pause_rehashing();
        let slot = match self.leftovers {
            Some(ref lo) => Slot::Leftover(lo.cursor),
            None => Slot::Main(0),
        };
        SafeIter {
            dict: self,
            slot,
            pos: 0,
            current: None,
        }
    }
}

impl<'a, K, V, T> IntoIterator for &'a Dict<K, V, T>
where
    T: DictType<K, V>,
{
    type Item = &'a Entry<K, V>;
    type IntoIter = Iter<'a, K, V>;

    #[cfg_attr(feature = "inline-more", inline)]
    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

/// A pausing iterator over a [`Dict`] that allows removing the entry it is on.
///
/// Created by [`Dict::safe_iter`]. This is a lending iterator, so it is driven with `while let`
/// rather than `for`:
///
/// ```
/// # #[cfg(feature = "ahash")] {
/// let mut d = trickle::Dict::new();
/// for i in 0..10 {
///     d.add(i, i).unwrap();
/// }
/// let mut it = d.safe_iter();
/// while let Some((k, v)) = it.next() {
///     *v += 1;
///     if k % 2 == 1 {
///         it.delete_current();
///     }
/// }
/// drop(it);
/// assert_eq!(d.len(), 5);
/// assert_eq!(d.fetch_value(&4), Some(&5));
/// # }
/// ```
pub struct SafeIter<'a, K, V, T>
where
    T: DictType<K, V>,
{
    dict: &'a mut Dict<K, V, T>,
    // The bucket we're in, and the chain position of the next entry to yield.
    slot: Slot,
    pos: usize,
    // The position of the entry last yielded, unless it has been removed.
    current: Option<(Slot, usize)>,
}

impl<K, V, T> SafeIter<'_, K, V, T>
where
    T: DictType<K, V>,
{
    /// Returns the next entry's key and a mutable reference to its value.
    pub fn next(&mut self) -> Option<(&K, &mut V)> {
        loop {
            let buckets = match self.slot {
                Slot::Main(_) => self.dict.table.buckets(),
                Slot::Leftover(_) => self.dict.leftovers.as_ref().map_or(0, |lo| lo.table.buckets()),
            };
            let (bucket, wrap) = match self.slot {
                Slot::Main(i) => (i, None),
                Slot::Leftover(i) => (i, Some(Slot::Main(0))),
            };
            if bucket >= buckets {
                self.current = None;
                self.slot = wrap?;
                self.pos = 0;
                continue;
            }
            if chain_nth(self.dict.chain(self.slot), self.pos).is_some() {
                break;
            }
            self.slot = match self.slot {
                Slot::Main(i) => Slot::Main(i + 1),
                Slot::Leftover(i) => Slot::Leftover(i + 1),
            };
            self.pos = 0;
        }

        let (slot, n) = (self.slot, self.pos);
        self.current = Some((slot, n));
        self.pos += 1;
        let head = match slot {
            Slot::Main(i) => self.dict.table.bucket_mut(i),
            Slot::Leftover(i) => self.dict.leftovers.as_mut()?.table.bucket_mut(i),
        };
        chain_nth_mut(head, n).map(Entry::parts_mut)
    }

    /// Removes the entry last returned by [`SafeIter::next`] and hands back its key and value
    /// without running the destroy hooks.
    ///
    /// Returns `None` if there is no such entry, or it has already been removed.
    pub fn unlink_current(&mut self) -> Option<(K, V)> {
        let (slot, n) = self.current.take()?;
        let e = match slot {
            Slot::Main(i) => self.dict.table.unlink_nth(i, n),
            Slot::Leftover(i) => self.dict.leftovers.as_mut()?.table.unlink_nth(i, n),
        }?;
        // The rest of the chain moved up one position.
        self.pos -= 1;
        Some(e.into_parts())
    }

    /// Removes the entry last returned by [`SafeIter::next`], running the destroy hooks.
    ///
    /// Returns false if there was nothing to remove.
    pub fn delete_current(&mut self) -> bool {
        match self.unlink_current() {
            Some((k, v)) => {
                self.dict.ty.destroy_key(k);
                self.dict.ty.destroy_value(v);
                true
            }
            None => false,
        }
    }

    /// Returns the dictionary being iterated over.
    pub fn dict(&self) -> &Dict<K, V, T> {
        self.dict
    }
}

impl<K, V, T> Drop for SafeIter<'_, K, V, T>
where
    T: DictType<K, V>,
{
    fn drop(&mut self) {
        self.dict.resume_rehashing();
    }
}
