//! Stateless, resumable traversal with [`Dict::scan`].
//!
//! The cursor walks bucket indices in bit-reversed order: it increments the *high* bits of the
//! index first. With a power-of-two table of mask `m`, bucket `i` of the table splits into
//! buckets `i` and `i | (m + 1)` when the table doubles, and those two merge back into `i & m`
//! when it halves. Counting in reverse means every index that has been visited is a prefix of
//! the indices still to come in both the old and the new table, so a resize between two calls
//! never makes the scan skip a bucket it hasn't seen yet. It may revisit some entries after a
//! shrink.

use crate::raw::{Entry, Link};
use crate::{Dict, DictType};

/// Advances `v` to the next bucket index in reverse-binary order for a table with `mask`.
#[inline]
fn next_cursor(v: usize, mask: usize) -> usize {
    // Set the bits above the mask so the increment carries out of the masked bits directly.
    (v | !mask).reverse_bits().wrapping_add(1).reverse_bits()
}

fn visit<K, V>(head: &Link<K, V>, f: &mut impl FnMut(&Entry<K, V>)) {
    let mut cur = head.as_deref();
    while let Some(e) = cur {
        f(e);
        cur = e.next.as_deref();
    }
}

impl<K, V, T> Dict<K, V, T>
where
    T: DictType<K, V>,
{
    /// Visits one bucket's worth of entries, starting from `cursor`, and returns the cursor to
    /// pass to the next call.
    ///
    /// Start with a cursor of `0`. The scan is complete when the returned cursor is `0` again.
    /// Between calls the dictionary may be modified freely, including being resized, and the
    /// scan still visits every entry that was present for its whole duration at least once.
    /// Entries may be visited more than once, and entries added or removed during the scan may or
    /// may not be visited at all. The number of calls is bounded by the largest table size seen
    /// during the scan.
    ///
    /// While a rehash is in progress, the bucket of the smaller table and every bucket of the
    /// larger table that expands it are visited in the same call.
    ///
    /// ```
    /// # #[cfg(feature = "ahash")] {
    /// let mut d = trickle::Dict::new();
    /// for i in 0..100 {
    ///     d.add(i, i * i).unwrap();
    /// }
    /// let mut sum = 0;
    /// let mut cursor = 0;
    /// loop {
    ///     cursor = d.scan(cursor, |e| sum += *e.value());
    ///     if cursor == 0 {
    ///         break;
    ///     }
    /// }
    /// assert_eq!(sum, (0..100).map(|i| i * i).sum::<i32>());
    /// # }
    /// ```
    pub fn scan(&self, cursor: usize, mut f: impl FnMut(&Entry<K, V>)) -> usize {
        if self.is_empty() {
            return 0;
        }
        let mut v = cursor;
        match self.leftovers {
            None => {
                let mask = self.table.mask();
                visit(self.table.bucket(v & mask), &mut f);
                v = next_cursor(v, mask);
            }
            Some(ref lo) => {
                let (small, large) = if lo.table.buckets() <= self.table.buckets() {
                    (&lo.table, &self.table)
                } else {
                    (&self.table, &lo.table)
                };
                let m0 = small.mask();
                let m1 = large.mask();

                visit(small.bucket(v & m0), &mut f);

                // Then every bucket of the larger table that the small bucket expands to.
                loop {
                    visit(large.bucket(v & m1), &mut f);
                    v = next_cursor(v, m1);
                    if v & (m0 ^ m1) == 0 {
                        break;
                    }
                }
            }
        }
        v
    }
}

#[cfg(test)]
mod tests {
    use super::next_cursor;
    use crate::test_util::Fnv;
    use crate::Dict;
    use alloc::vec::Vec;
    use std::collections::HashSet;

    #[test]
    fn reverse_binary_order() {
        let mut v = 0;
        let mut order = Vec::new();
        loop {
            order.push(v);
            v = next_cursor(v, 7);
            if v == 0 {
                break;
            }
        }
        assert_eq!(order, [0, 4, 2, 6, 1, 5, 3, 7]);
    }

    #[test]
    fn cursor_covers_every_bucket_once() {
        for bits in 2..12 {
            let mask = (1usize << bits) - 1;
            let mut seen = HashSet::new();
            let mut v = 0;
            loop {
                assert!(seen.insert(v & mask));
                v = next_cursor(v, mask);
                if v == 0 {
                    break;
                }
            }
            assert_eq!(seen.len(), mask + 1);
        }
    }

    fn full_scan(d: &Dict<u32, (), Fnv>) -> (HashSet<u32>, usize) {
        let mut seen = HashSet::new();
        let mut calls = 0;
        let mut cursor = 0;
        loop {
            cursor = d.scan(cursor, |e| {
                seen.insert(*e.key());
            });
            calls += 1;
            if cursor == 0 {
                break;
            }
        }
        (seen, calls)
    }

    #[test]
    fn empty_scan() {
        let d: Dict<u32, (), Fnv> = Dict::with_type(Fnv::default());
        assert_eq!(d.scan(0, |_| unreachable!()), 0);
    }

    #[test]
    fn scan_stable_table() {
        let mut d = Dict::with_type(Fnv::default());
        for i in 0..300u32 {
            d.add(i, ()).unwrap();
        }
        while d.rehash(100) {}
        let (seen, calls) = full_scan(&d);
        assert_eq!(seen.len(), 300);
        assert_eq!(calls, d.buckets());
    }

    #[test]
    fn scan_while_rehashing() {
        let mut d = Dict::with_type(Fnv::default());
        for i in 0..300u32 {
            d.add(i, ()).unwrap();
        }
        while d.rehash(100) {}
        d.expand(4000).unwrap();
        d.rehash(20);
        assert!(d.is_rehashing());
        let (seen, calls) = full_scan(&d);
        assert_eq!(seen.len(), 300);
        // One call per bucket of the smaller table.
        assert_eq!(calls, 512);
    }

    fn scan_across_resize(grow: bool) {
        let mut d = Dict::with_type(Fnv::default());
        for i in 0..1000u32 {
            d.add(i, ()).unwrap();
        }
        while d.rehash(100) {}
        let mut seen = HashSet::new();
        let mut cursor = 0;
        let mut calls = 0;
        let mut resized = false;
        loop {
            cursor = d.scan(cursor, |e| {
                seen.insert(*e.key());
            });
            calls += 1;
            if cursor == 0 {
                break;
            }
            if calls == 100 && !resized {
                if grow {
                    d.expand(8000).unwrap();
                } else {
                    for i in 500..1000u32 {
                        d.delete(&i).unwrap();
                    }
                    while d.rehash(1) {}
                    d.shrink_to_fit().unwrap();
                }
                resized = true;
            }
            // Keep the rehash moving between calls, like normal traffic would.
            let _ = d.find(&(calls as u32 % 500));
            assert!(calls < 100_000, "scan did not terminate");
        }
        assert!(resized);
        for i in 0..500u32 {
            assert!(seen.contains(&i), "never visited {}", i);
        }
    }

    #[test]
    fn scan_across_grow() {
        scan_across_resize(true);
    }

    #[test]
    fn scan_across_shrink() {
        scan_across_resize(false);
    }
}
