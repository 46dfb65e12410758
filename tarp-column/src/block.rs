//! Blocks of columns processed in lockstep.

use std::hash::Hasher;

use tarp_arena::{Arena, ArenaSpan};
use tracing::{instrument, trace};

use crate::column::{Column, ColumnPtr, MutableColumnPtr, SortOptions};
use crate::index::{
    bucket_counts,
    count_bytes_in_filter,
    identity_permutation,
    limited_size,
    replicated_size,
    EqualRanges,
    Permutation,
};
use crate::{row_hasher, ColumnError, ColumnResult, WeakHash32};

#[derive(Debug, Clone, Default)]
/// A set of columns sharing one row index space.
///
/// Every column of a block holds the same number of rows, this is checked
/// whenever a block is built and after every operation applied to it.
pub struct Block {
    columns: Vec<ColumnPtr>,
    rows: usize,
}

impl Block {
    /// Creates a new block from the given columns.
    ///
    /// Returns a [ColumnError::SizeMismatch] if the columns disagree on
    /// their number of rows.
    pub fn new(columns: Vec<ColumnPtr>) -> ColumnResult<Self> {
        let rows = columns.first().map_or(0, |column| column.size());
        Self::with_rows(columns, rows)
    }

    /// Creates a new block which is expected to hold `rows` rows.
    ///
    /// A block without columns still tracks its row count.
    pub fn with_rows(columns: Vec<ColumnPtr>, rows: usize) -> ColumnResult<Self> {
        if let Some(column) = columns.iter().find(|column| column.size() != rows) {
            return Err(ColumnError::size_mismatch(
                "block column",
                rows,
                column.size(),
            ));
        }

        Ok(Self { columns, rows })
    }

    #[inline]
    /// The number of rows in every column of the block.
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    #[inline]
    pub fn column(&self, position: usize) -> Option<&ColumnPtr> {
        self.columns.get(position)
    }

    #[inline]
    pub fn columns(&self) -> &[ColumnPtr] {
        &self.columns
    }

    /// Consumes the block and returns its columns.
    pub fn into_columns(self) -> Vec<ColumnPtr> {
        self.columns
    }

    fn check_rows(&self, what: &'static str, len: usize) -> ColumnResult<()> {
        if len != self.rows {
            return Err(ColumnError::size_mismatch(what, self.rows, len));
        }
        Ok(())
    }

    #[instrument(skip_all, fields(rows = self.rows, columns = self.columns.len()))]
    /// Returns a new block holding only the rows whose `mask` entry is
    /// non-zero.
    pub fn filter(&self, mask: &[u8]) -> ColumnResult<Self> {
        self.check_rows("filter", mask.len())?;

        let kept = count_bytes_in_filter(mask);
        let columns = self
            .columns
            .iter()
            .map(|column| column.filter(mask, kept as isize))
            .collect::<ColumnResult<Vec<_>>>()?;

        trace!(kept, "Filtered block");
        Self::with_rows(columns, kept)
    }

    #[instrument(skip_all, fields(rows = self.rows, limit = limit))]
    /// Returns a new block reordered by `perm`, keeping at most `limit` rows
    /// when `limit` is non-zero.
    pub fn permute(&self, perm: &[usize], limit: usize) -> ColumnResult<Self> {
        self.check_rows("permutation", perm.len())?;

        let columns = self
            .columns
            .iter()
            .map(|column| column.permute(perm, limit))
            .collect::<ColumnResult<Vec<_>>>()?;

        Self::with_rows(columns, limited_size(self.rows, limit))
    }

    #[instrument(skip_all, fields(rows = self.rows))]
    /// Returns a new block where row `i` is repeated as described by
    /// `offsets`.
    pub fn replicate(&self, offsets: &[u64]) -> ColumnResult<Self> {
        self.check_rows("offsets", offsets.len())?;

        let columns = self
            .columns
            .iter()
            .map(|column| column.replicate(offsets))
            .collect::<ColumnResult<Vec<_>>>()?;

        Self::with_rows(columns, replicated_size(offsets))
    }

    #[instrument(skip_all, fields(rows = self.rows, num_buckets = num_buckets))]
    /// Splits the block into `num_buckets` blocks, row `i` going to bucket
    /// `selector[i]`.
    pub fn scatter(&self, num_buckets: usize, selector: &[usize]) -> ColumnResult<Vec<Self>> {
        self.check_rows("selector", selector.len())?;

        let mut buckets: Vec<Vec<ColumnPtr>> = (0..num_buckets)
            .map(|_| Vec::with_capacity(self.columns.len()))
            .collect();
        for column in &self.columns {
            let parts = column.scatter(num_buckets, selector)?;
            if parts.len() != num_buckets {
                return Err(ColumnError::size_mismatch(
                    "scattered columns",
                    num_buckets,
                    parts.len(),
                ));
            }

            for (bucket, part) in buckets.iter_mut().zip(parts) {
                bucket.push(ColumnPtr::from(part));
            }
        }

        let counts = bucket_counts(num_buckets, selector);
        trace!(counts = ?counts, "Scattered block");
        buckets
            .into_iter()
            .zip(counts)
            .map(|(columns, rows)| Self::with_rows(columns, rows))
            .collect()
    }

    #[instrument(skip_all, fields(rows = self.rows, limit = options.limit))]
    /// Returns the permutation sorting the block by its columns in order.
    ///
    /// The first column produces the initial order, every following column
    /// only breaks ties left by the columns before it.
    ///
    /// The permutation always covers every row so it can be passed to
    /// [Block::permute]. With a limit set only the first `limit` entries are
    /// ordered.
    pub fn sort_permutation(&self, options: &SortOptions) -> Permutation {
        let Some((first, rest)) = self.columns.split_first() else {
            return identity_permutation(self.rows, 0);
        };

        let mut perm = first.get_permutation(
            options.direction,
            options.stability,
            options.limit,
            options.nan_direction_hint,
        );
        let mut equal_ranges =
            collect_equal_ranges(first.as_ref(), &perm, options.nan_direction_hint);

        for column in rest {
            if equal_ranges.is_empty() {
                break;
            }

            column.update_permutation(
                options.direction,
                options.stability,
                options.limit,
                options.nan_direction_hint,
                &mut perm,
                &mut equal_ranges,
            );
        }

        trace!(unresolved_ranges = equal_ranges.len(), "Sorted block");
        complete_permutation(perm, self.rows)
    }

    /// Packs every column's encoding of `row` into one contiguous region of
    /// the arena, producing a composite key for grouping.
    ///
    /// Each column contributes at least one byte, so keys of different rows
    /// can only be equal if every column's encoding is equal.
    pub fn serialize_row_key(&self, row: usize, arena: &mut Arena) -> ArenaSpan {
        let mut begin = None;
        for column in &self.columns {
            column.serialize_value_into_arena(row, arena, &mut begin);
        }

        match begin {
            Some(start) => arena.span_from(start),
            None => ArenaSpan::new(arena.len(), 0),
        }
    }

    /// Decodes one key produced by [Block::serialize_row_key] and appends a
    /// row to each of the given columns.
    ///
    /// Returns the bytes following the key. If the key cannot be decoded
    /// no column is changed.
    pub fn insert_row_key<'a>(
        columns: &mut [MutableColumnPtr],
        key: &'a [u8],
    ) -> ColumnResult<&'a [u8]> {
        columns
            .iter()
            .try_fold(key, |pos, column| column.skip_serialized_in_arena(pos))?;

        columns
            .iter_mut()
            .try_fold(key, |pos, column| column.deserialize_and_insert_from_arena(pos))
    }

    /// Hashes the values of `row` across every column.
    ///
    /// Columns without a payload contribute nothing to the hash.
    pub fn hash_row(&self, row: usize) -> u64 {
        let mut hasher = row_hasher();
        for column in &self.columns {
            column.update_hash_with_value(row, &mut hasher);
        }
        hasher.finish()
    }

    /// Computes a [WeakHash32] covering every row of the block.
    pub fn weak_hash(&self) -> ColumnResult<WeakHash32> {
        let mut hash = WeakHash32::new(self.rows);
        for column in &self.columns {
            column.update_weak_hash32(&mut hash)?;
        }
        Ok(hash)
    }
}

/// Appends every row missing from a partial sort order, in row order.
fn complete_permutation(mut perm: Permutation, rows: usize) -> Permutation {
    if perm.len() >= rows {
        return perm;
    }

    let mut seen = vec![false; rows];
    for &row in &perm {
        seen[row] = true;
    }
    perm.extend((0..rows).filter(|&row| !seen[row]));
    perm
}

/// Returns the ranges of `perm` whose rows compare equal in `column`.
///
/// Ranges of a single row are already resolved and are left out.
fn collect_equal_ranges(
    column: &dyn Column,
    perm: &[usize],
    nan_direction_hint: i32,
) -> EqualRanges {
    let mut ranges = EqualRanges::new();
    let mut start = 0;
    for i in 1..=perm.len() {
        let same = i < perm.len()
            && column
                .compare_at(perm[i - 1], perm[i], column, nan_direction_hint)
                .is_eq();
        if !same {
            if i - start > 1 {
                ranges.push(start..i);
            }
            start = i;
        }
    }
    ranges
}
