//! Moving entries from the old table to the new one.
//!
//! Every lookup, insert, and delete takes one rehash step, which moves the entries of one
//! non-empty bucket. That spreads the cost of a resize over the operations that caused it.
//! [`Dict::rehash`] and [`Dict::rehash_for_duration`] let callers that can afford a longer pause
//! finish sooner.

use log::debug;
#[cfg(feature = "std")]
use log::trace;

use crate::dict::OldTable;
use crate::raw::RawTable;
use crate::{Dict, DictType};

/// Each bucket of migration work may visit at most this many empty buckets looking for entries.
const EMPTY_VISITS_PER_STEP: usize = 10;

/// How many bucket migrations [`Dict::rehash_for_duration`] does between clock checks.
#[cfg(feature = "std")]
const BATCH: usize = 100;

/// Moves every entry of the old table's bucket `index` into `new`.
fn migrate_bucket<K, V, T>(
    ty: &T,
    old: &mut RawTable<K, V>,
    index: usize,
    new: &mut RawTable<K, V>,
) where
    T: DictType<K, V>,
{
    let shrinking = new.buckets() < old.buckets();
    let (mut chain, _) = old.take_chain(index);
    while let Some(mut e) = chain {
        chain = e.next.take();
        let to = if shrinking {
            // Every key in `index` has `hash & old_mask == index`, and the new mask is a
            // prefix of the old one.
            index & new.mask()
        } else {
            new.index(ty.hash(e.key()))
        };
        new.push_front(to, e);
    }
}

impl<K, V, T> Dict<K, V, T>
where
    T: DictType<K, V>,
{
    /// Moves the entries of up to `n` non-empty buckets to the new table.
    ///
    /// At most `10 * n` empty buckets are visited, so a sparse old table can't make this call
    /// arbitrarily slow. Returns true if there is still work left, and false once the rehash
    /// has completed (or if none was in progress). Does nothing while rehashing is paused.
    pub fn rehash(&mut self, n: usize) -> bool {
        if self.pause > 0 {
            return self.leftovers.is_some();
        }
        self.migrate(n);
        self.finish_if_drained()
    }

    /// Moves the entries of up to `n` non-empty old buckets, and returns how many it moved.
    ///
    /// Leaves the old table in place even if it is now empty.
    fn migrate(&mut self, n: usize) -> usize {
        let Dict {
            ty,
            table,
            leftovers,
            ..
        } = self;
        let lo: &mut OldTable<K, V> = match leftovers {
            Some(lo) => lo,
            None => return 0,
        };

        let mut empty_visits = n.saturating_mul(EMPTY_VISITS_PER_STEP);
        let mut moved = 0;
        while moved != n && lo.table.len() != 0 {
            // The old table isn't empty, so there is a non-empty bucket at or past the cursor.
            debug_assert!(lo.cursor < lo.table.buckets());
            while lo.table.bucket(lo.cursor).is_none() {
                lo.cursor += 1;
                if empty_visits == 0 {
                    return moved;
                }
                empty_visits -= 1;
            }
            migrate_bucket(ty, &mut lo.table, lo.cursor, table);
            lo.cursor += 1;
            moved += 1;
        }
        moved
    }

    /// Takes a single rehash step, unless rehashing is paused.
    #[inline]
    pub(crate) fn rehash_step(&mut self) {
        if self.pause == 0 && self.leftovers.is_some() {
            self.rehash(1);
        }
    }

    /// Keeps rehashing until the rehash completes or `budget` has elapsed.
    ///
    /// Work is done in batches of 100 buckets between clock checks, and a bucket is never left
    /// half-moved, so the call can overrun `budget` slightly. Returns the number of non-empty
    /// buckets moved. Does nothing while rehashing is paused.
    #[cfg(feature = "std")]
    pub fn rehash_for_duration(&mut self, budget: std::time::Duration) -> usize {
        if self.pause > 0 {
            return 0;
        }
        let start = std::time::Instant::now();
        let mut rehashes = 0;
        loop {
            rehashes += self.migrate(BATCH);
            if !self.finish_if_drained() || start.elapsed() > budget {
                break;
            }
        }
        trace!(
            "rehashed {} buckets in {:?}, {} entries left to move",
            rehashes,
            start.elapsed(),
            self.leftovers.as_ref().map_or(0, |lo| lo.table.len())
        );
        rehashes
    }

    /// Retires the old table once it has no entries left.
    ///
    /// Returns true if a rehash is still in progress.
    pub(crate) fn finish_if_drained(&mut self) -> bool {
        let drained = match self.leftovers {
            Some(ref lo) => lo.table.len() == 0,
            None => return false,
        };
        if drained {
            self.leftovers = None;
            debug!(
                "rehash complete, {} entries in {} buckets",
                self.table.len(),
                self.table.buckets()
            );
        }
        !drained
    }

    /// Stops rehash steps and automatic resizing until a matching [`Dict::resume_rehashing`].
    ///
    /// Pauses nest. While paused, the bucket layout of both tables stays put, which is what
    /// [`SafeIter`](crate::SafeIter) relies on.
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn pause_rehashing(&mut self) {
        self.pause += 1;
    }

    /// Undoes one [`Dict::pause_rehashing`].
    ///
    /// When the last pause is lifted, any resize that was held back is started.
    ///
    /// # Panics
    ///
    /// Panics if rehashing is not paused.
    pub fn resume_rehashing(&mut self) {
        assert!(self.pause > 0, "resume_rehashing called without a matching pause");
        self.pause -= 1;
        if self.pause == 0 {
            self.finish_if_drained();
            self.resize_if_needed();
        }
    }

    /// Returns true if rehashing is currently paused.
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn is_rehash_paused(&self) -> bool {
        self.pause > 0
    }
}
