use alloc::vec::Vec;

use rand::Rng;

use crate::dict::Slot;
use crate::raw::Entry;
use crate::{Dict, DictType};

/// How many entries [`Dict::fair_random_entry`] samples before picking one.
const FAIR_SAMPLE: usize = 20;

/// [`Dict::sample_entries`] gives up after visiting this many buckets per requested entry.
const SAMPLE_STEPS_PER_ENTRY: usize = 10;

impl<K, V, T> Dict<K, V, T>
where
    T: DictType<K, V>,
{
    /// Returns a random entry, or `None` if the dictionary is empty.
    ///
    /// Picks random buckets (across both tables while rehashing, in proportion to their size)
    /// until it finds a non-empty one, then picks uniformly within that bucket's chain with a
    /// single pass of reservoir sampling. Entries in longer chains are therefore a little less
    /// likely to be picked than entries that are alone in their bucket; see
    /// [`Dict::fair_random_entry`] for an alternative.
    pub fn random_entry<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<&Entry<K, V>> {
        if self.is_empty() {
            return None;
        }
        self.rehash_step();
        let this: &Self = self;
        this.pick_random(rng)
    }

    /// Like [`Dict::random_entry`], but picks from a sample of entries to reduce the bias
    /// towards entries in short chains.
    pub fn fair_random_entry<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<&Entry<K, V>> {
        let count = usize::min(FAIR_SAMPLE, self.len());
        if count == 0 {
            return None;
        }
        self.sampling_steps(count);
        let this: &Self = self;
        let sample = this.sample_from(count, rng);
        if sample.is_empty() {
            // Sampling gave up in a sparse table.
            return this.pick_random(rng);
        }
        Some(sample[rng.gen_range(0..sample.len())])
    }

    /// Returns up to `count` entries from a random stretch of buckets.
    ///
    /// This is much cheaper than calling [`Dict::random_entry`] `count` times, but the entries
    /// are far from independent: they tend to come from neighboring buckets, and the same entry
    /// may show up more than once. The sample can come up short in a very sparse table, since
    /// at most `10 * count` buckets are visited.
    pub fn sample_entries<R: Rng + ?Sized>(
        &mut self,
        count: usize,
        rng: &mut R,
    ) -> Vec<&Entry<K, V>> {
        let count = usize::min(count, self.len());
        if count == 0 {
            return Vec::new();
        }
        self.sampling_steps(count);
        let this: &Self = self;
        this.sample_from(count, rng)
    }

    fn sampling_steps(&mut self, count: usize) {
        for _ in 0..count {
            if !self.is_rehashing() {
                break;
            }
            self.rehash_step();
        }
    }

    fn pick_random<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Entry<K, V>> {
        if self.is_empty() {
            return None;
        }
        let slot = loop {
            let slot = match self.leftovers {
                Some(ref lo) => {
                    // Buckets below the cursor are known to be empty.
                    let old = lo.table.buckets() - lo.cursor;
                    let h = rng.gen_range(0..old + self.table.buckets());
                    if h < old {
                        Slot::Leftover(lo.cursor + h)
                    } else {
                        Slot::Main(h - old)
                    }
                }
                None => Slot::Main(rng.gen_range(0..self.table.buckets())),
            };
            if self.chain(slot).is_some() {
                break slot;
            }
        };

        let mut pick = None;
        let mut seen = 0;
        let mut cur = self.chain(slot).as_deref();
        while let Some(e) = cur {
            seen += 1;
            if rng.gen_range(0..seen) == 0 {
                pick = Some(e);
            }
            cur = e.next.as_deref();
        }
        pick
    }

    fn sample_from<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<&Entry<K, V>> {
        let mut out = Vec::with_capacity(count);
        let main = &self.table;
        let old = self.leftovers.as_ref();
        let max_mask = old.map_or(main.mask(), |lo| usize::max(lo.table.mask(), main.mask()));
        // The old table goes first, and everything below its cursor is already gone.
        let tables = [old.map(|lo| (&lo.table, lo.cursor)), Some((main, 0))];

        let mut steps = count.saturating_mul(SAMPLE_STEPS_PER_ENTRY);
        let mut i = rng.gen::<usize>() & max_mask;
        let mut empty_run = 0;
        while out.len() < count && steps > 0 {
            steps -= 1;
            for (t, below) in tables.iter().flatten() {
                if i < *below {
                    if i >= main.buckets() {
                        // Past the end of the main table too, so skip ahead to the cursor.
                        i = *below;
                    } else {
                        continue;
                    }
                }
                if i >= t.buckets() {
                    continue;
                }
                let head = t.bucket(i);
                if head.is_none() {
                    empty_run += 1;
                    if empty_run >= 5 && empty_run > count {
                        i = rng.gen::<usize>() & max_mask;
                        empty_run = 0;
                    }
                    continue;
                }
                empty_run = 0;
                let mut cur = head.as_deref();
                while let Some(e) = cur {
                    out.push(e);
                    if out.len() == count {
                        return out;
                    }
                    cur = e.next.as_deref();
                }
            }
            i = (i + 1) & max_mask;
        }
        out
    }
}
