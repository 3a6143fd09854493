//! Chain length statistics, for diagnosing hash quality.

use core::fmt;

use crate::raw::{chain_len, RawTable};
use crate::{Dict, DictType};

/// Chains this long or longer share the last histogram slot.
pub const HISTOGRAM_LEN: usize = 50;

/// Bucket occupancy figures for one table of a [`Dict`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableStats {
    /// Number of buckets.
    pub buckets: usize,
    /// Number of entries.
    pub used: usize,
    /// Number of buckets with at least one entry.
    pub non_empty: usize,
    /// Length of the longest chain.
    pub max_chain: usize,
    /// `histogram[n]` is the number of buckets whose chain has `n` entries.
    pub histogram: [usize; HISTOGRAM_LEN],
}

impl TableStats {
    fn collect<K, V>(table: &RawTable<K, V>) -> Self {
        let mut s = TableStats {
            buckets: table.buckets(),
            used: table.len(),
            non_empty: 0,
            max_chain: 0,
            histogram: [0; HISTOGRAM_LEN],
        };
        for i in 0..table.buckets() {
            let len = chain_len(table.bucket(i));
            if len != 0 {
                s.non_empty += 1;
            }
            s.max_chain = usize::max(s.max_chain, len);
            s.histogram[usize::min(len, HISTOGRAM_LEN - 1)] += 1;
        }
        s
    }

    /// Average length of the non-empty chains.
    pub fn avg_chain(&self) -> f64 {
        if self.non_empty == 0 {
            0.0
        } else {
            self.used as f64 / self.non_empty as f64
        }
    }

    fn write(&self, f: &mut fmt::Formatter<'_>, n: usize, what: &str) -> fmt::Result {
        writeln!(f, "Hash table {} stats ({}):", n, what)?;
        if self.used == 0 {
            return writeln!(f, "No stats available for empty dictionaries");
        }
        writeln!(f, " table size: {}", self.buckets)?;
        writeln!(f, " number of elements: {}", self.used)?;
        writeln!(f, " different slots: {}", self.non_empty)?;
        writeln!(f, " max chain length: {}", self.max_chain)?;
        writeln!(f, " avg chain length: {:.2}", self.avg_chain())?;
        writeln!(f, " Chain length distribution:")?;
        for (len, &count) in self.histogram.iter().enumerate() {
            if count == 0 {
                continue;
            }
            writeln!(
                f,
                "   {}: {} ({:.2}%)",
                len,
                count,
                count as f64 * 100.0 / self.buckets as f64
            )?;
        }
        Ok(())
    }
}

/// A snapshot of how entries are spread over the buckets of a [`Dict`].
///
/// The [`Display`](fmt::Display) impl renders a human-readable report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stats {
    /// The main table, which is the rehash target while a rehash is in progress.
    pub main: TableStats,
    /// The table being drained, if a rehash is in progress.
    pub rehashing: Option<TableStats>,
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.main.write(f, 0, "main hash table")?;
        if let Some(ref lo) = self.rehashing {
            lo.write(f, 1, "being rehashed")?;
        }
        Ok(())
    }
}

impl<K, V, T> Dict<K, V, T>
where
    T: DictType<K, V>,
{
    /// Walks every bucket and reports chain length statistics.
    ///
    /// This takes time linear in the number of buckets.
    pub fn stats(&self) -> Stats {
        Stats {
            main: TableStats::collect(&self.table),
            rehashing: self
                .leftovers
                .as_ref()
                .map(|lo| TableStats::collect(&lo.table)),
        }
    }
}
