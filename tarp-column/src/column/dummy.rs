//! Columns which carry a row count and no per-row payload.
//!
//! Every row of a dummy column is indistinguishable from every other row, so
//! comparison and hashing are constant and shape operations reduce to size
//! bookkeeping. Operations which need a real value fail instead of inventing
//! one.

use std::cmp::Ordering;
use std::fmt::{Debug, Formatter};
use std::hash::Hasher;
use std::marker::PhantomData;
use std::sync::Arc;

use tarp_arena::{Arena, ArenaSpan};

use super::{Column, ColumnPtr, MutableColumnPtr, SortDirection, SortStability};
use crate::index::{
    bucket_counts,
    count_bytes_in_filter,
    identity_permutation,
    limited_size,
    replicated_size,
    EqualRanges,
    Permutation,
};
use crate::{ColumnError, ColumnResult, Field, WeakHash32};

/// The value written to the arena for each row.
const SENTINEL: u8 = 0;

/// Names a kind of dummy column.
pub trait DummyVariant: Send + Sync + 'static {
    /// The name reported in diagnostics.
    const NAME: &'static str;
}

#[derive(Debug, Copy, Clone, Default)]
/// The placeholder variant, used for slots which have a shape but no values.
pub struct Nothing;

impl DummyVariant for Nothing {
    const NAME: &'static str = "Nothing";
}

/// A dummy column of the [Nothing] variant.
pub type ColumnNothing = DummyColumn<Nothing>;

/// A column holding only its row count.
pub struct DummyColumn<V> {
    size: usize,
    variant: PhantomData<fn() -> V>,
}

impl<V: DummyVariant> Debug for DummyColumn<V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(size={})", V::NAME, self.size)
    }
}

impl<V> Clone for DummyColumn<V> {
    fn clone(&self) -> Self {
        Self::new(self.size)
    }
}

impl<V> Default for DummyColumn<V> {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<V> DummyColumn<V> {
    /// Creates a new dummy column with `size` rows.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            variant: PhantomData,
        }
    }

    /// Grows the column by `delta` rows.
    pub fn add_size(&mut self, delta: usize) {
        self.size += delta;
    }
}

impl<V: DummyVariant> DummyColumn<V> {
    fn clone_dummy(&self, size: usize) -> ColumnPtr {
        Arc::new(Self::new(size))
    }
}

/// Splits the one byte encoding of a row off the front of `pos`.
fn split_sentinel(pos: &[u8]) -> ColumnResult<&[u8]> {
    pos.get(1..)
        .ok_or_else(|| ColumnError::size_mismatch("serialized row", 1, pos.len()))
}

impl<V: DummyVariant> Column for DummyColumn<V> {
    fn name(&self) -> String {
        V::NAME.to_string()
    }

    #[inline]
    fn size(&self) -> usize {
        self.size
    }

    fn clone_resized(&self, size: usize) -> MutableColumnPtr {
        Box::new(Self::new(size))
    }

    fn byte_size(&self) -> usize {
        0
    }

    fn byte_size_at(&self, _row: usize) -> usize {
        0
    }

    fn allocated_bytes(&self) -> usize {
        0
    }

    fn is_dummy(&self) -> bool {
        true
    }

    fn insert_default(&mut self) {
        self.size += 1;
    }

    fn pop_back(&mut self, n: usize) {
        debug_assert!(
            n <= self.size,
            "Cannot pop {n} rows from a column of {} rows",
            self.size
        );
        self.size -= n;
    }

    fn insert_from(&mut self, _src: &dyn Column, _row: usize) -> ColumnResult<()> {
        self.size += 1;
        Ok(())
    }

    fn insert_range_from(
        &mut self,
        _src: &dyn Column,
        _start: usize,
        length: usize,
    ) -> ColumnResult<()> {
        self.size += length;
        Ok(())
    }

    fn insert_data(&mut self, _data: &[u8]) -> ColumnResult<()> {
        self.size += 1;
        Ok(())
    }

    fn get_data_at(&self, _row: usize) -> &[u8] {
        &[]
    }

    fn compare_at(
        &self,
        _row: usize,
        _rhs_row: usize,
        _rhs: &dyn Column,
        _nan_direction_hint: i32,
    ) -> Ordering {
        Ordering::Equal
    }

    fn compare_column(
        &self,
        _rhs: &dyn Column,
        _rhs_row: usize,
        _row_indexes: Option<&mut Vec<usize>>,
        _compare_results: &mut [i8],
        _direction: SortDirection,
        _nan_direction_hint: i32,
    ) {
    }

    fn has_equal_values(&self) -> bool {
        true
    }

    fn update_hash_with_value(&self, _row: usize, _hasher: &mut dyn Hasher) {}

    fn update_weak_hash32(&self, _hash: &mut WeakHash32) -> ColumnResult<()> {
        Ok(())
    }

    fn update_hash_fast(&self, _hasher: &mut dyn Hasher) {}

    fn serialize_value_into_arena(
        &self,
        _row: usize,
        arena: &mut Arena,
        begin: &mut Option<usize>,
    ) -> ArenaSpan {
        let (span, bytes) = arena.alloc_continue(1, begin);
        bytes[0] = SENTINEL;
        span
    }

    fn deserialize_and_insert_from_arena<'a>(
        &mut self,
        pos: &'a [u8],
    ) -> ColumnResult<&'a [u8]> {
        let rest = split_sentinel(pos)?;
        self.size += 1;
        Ok(rest)
    }

    fn skip_serialized_in_arena<'a>(&self, pos: &'a [u8]) -> ColumnResult<&'a [u8]> {
        split_sentinel(pos)
    }

    fn filter(&self, mask: &[u8], _size_hint: isize) -> ColumnResult<ColumnPtr> {
        if mask.len() != self.size {
            return Err(ColumnError::size_mismatch("filter", self.size, mask.len()));
        }

        Ok(self.clone_dummy(count_bytes_in_filter(mask)))
    }

    fn expand(&mut self, mask: &[u8], inverted: bool) {
        let kept = count_bytes_in_filter(mask);
        self.size = if inverted { mask.len() - kept } else { kept };
    }

    fn permute(&self, perm: &[usize], limit: usize) -> ColumnResult<ColumnPtr> {
        if perm.len() != self.size {
            return Err(ColumnError::size_mismatch("permutation", self.size, perm.len()));
        }

        Ok(self.clone_dummy(limited_size(self.size, limit)))
    }

    fn index(&self, indexes: &dyn Column, limit: usize) -> ColumnResult<ColumnPtr> {
        if indexes.size() < limit {
            return Err(ColumnError::size_mismatch("indexes", limit, indexes.size()));
        }

        Ok(self.clone_dummy(if limit > 0 { limit } else { self.size }))
    }

    fn replicate(&self, offsets: &[u64]) -> ColumnResult<ColumnPtr> {
        if offsets.len() != self.size {
            return Err(ColumnError::size_mismatch("offsets", self.size, offsets.len()));
        }

        Ok(self.clone_dummy(replicated_size(offsets)))
    }

    fn scatter(
        &self,
        num_buckets: usize,
        selector: &[usize],
    ) -> ColumnResult<Vec<MutableColumnPtr>> {
        if selector.len() != self.size {
            return Err(ColumnError::size_mismatch("selector", self.size, selector.len()));
        }

        let columns = bucket_counts(num_buckets, selector)
            .into_iter()
            .map(|count| self.clone_resized(count))
            .collect();
        Ok(columns)
    }

    fn get_permutation(
        &self,
        _direction: SortDirection,
        _stability: SortStability,
        limit: usize,
        _nan_direction_hint: i32,
    ) -> Permutation {
        identity_permutation(self.size, limit)
    }

    fn update_permutation(
        &self,
        _direction: SortDirection,
        _stability: SortStability,
        _limit: usize,
        _nan_direction_hint: i32,
        _perm: &mut Permutation,
        _equal_ranges: &mut EqualRanges,
    ) {
    }

    fn get_extremes(&self, _min: &mut Field, _max: &mut Field) {}
}

#[cfg(test)]
mod tests {
    use std::hash::Hasher;

    use super::*;
    use crate::gather::{GathererStream, RowSource};
    use crate::index::Offsets;
    use crate::row_hasher;

    #[derive(Debug, Copy, Clone)]
    struct Placeholder;

    impl DummyVariant for Placeholder {
        const NAME: &'static str = "Placeholder";
    }

    struct SingleSource;

    impl GathererStream for SingleSource {
        fn num_sources(&self) -> usize {
            1
        }

        fn next_row_source(&mut self) -> Option<RowSource> {
            Some(RowSource {
                source: 0,
                skip: false,
            })
        }
    }

    #[test]
    fn test_size_bookkeeping() {
        let mut column = ColumnNothing::default();
        assert!(column.is_empty());

        column.insert_default();
        column.insert_data(b"ignored").unwrap();
        column.insert_from(&ColumnNothing::new(1), 0).unwrap();
        column.insert_range_from(&ColumnNothing::new(10), 2, 4).unwrap();
        assert_eq!(column.size(), 7);

        column.add_size(3);
        assert_eq!(column.size(), 10);

        column.pop_back(6);
        assert_eq!(column.size(), 4);
        column.pop_back(4);
        assert!(column.is_empty());
    }

    #[test]
    fn test_clone_resized() {
        let column = ColumnNothing::new(5);

        let resized = column.clone_resized(9);
        assert_eq!(resized.size(), 9);
        assert!(resized.is_dummy());
        assert_eq!(column.clone_empty().size(), 0);
        assert_eq!(column.size(), 5, "Source column should be untouched");
    }

    #[test]
    fn test_byte_sizes_are_zero() {
        let column = ColumnNothing::new(5);
        assert_eq!(column.byte_size(), 0);
        assert_eq!(column.byte_size_at(3), 0);
        assert_eq!(column.allocated_bytes(), 0);
    }

    #[test]
    fn test_name_and_debug() {
        let column = DummyColumn::<Placeholder>::new(2);
        assert_eq!(column.name(), "Placeholder");
        assert_eq!(format!("{column:?}"), "Placeholder(size=2)");
        assert_eq!(ColumnNothing::new(1).name(), "Nothing");
    }

    #[test]
    fn test_value_access_is_unsupported() {
        let mut column = ColumnNothing::new(3);

        let err = column.get(0).unwrap_err();
        assert_eq!(
            err,
            ColumnError::Unsupported {
                operation: "get",
                column: "Nothing".to_string(),
            }
        );

        let mut out = Field::Null;
        assert!(column.get_into(0, &mut out).unwrap_err().is_unsupported());
        assert!(column.is_default_at(0).unwrap_err().is_unsupported());
        assert!(column.insert(&Field::from(1u64)).unwrap_err().is_unsupported());
        assert_eq!(column.size(), 3, "Failed insert should not grow the column");
    }

    #[test]
    fn test_get_data_at_is_empty() {
        let column = ColumnNothing::new(3);
        assert!(column.get_data_at(1).is_empty());
    }

    #[test]
    fn test_statistics_are_unsupported() {
        let mut column = DummyColumn::<Placeholder>::new(3);

        let err = column.get_ratio_of_default_rows(1.0).unwrap_err();
        assert!(err.to_string().contains("Placeholder"));

        let mut indices = Offsets::new();
        let err = column
            .get_indices_of_non_default_rows(&mut indices, 0, 3)
            .unwrap_err();
        assert!(err.is_unsupported());
        assert!(indices.is_empty());

        let err = column.gather(&mut SingleSource).unwrap_err();
        assert!(err.is_unsupported());
        assert_eq!(column.size(), 3);
    }

    #[test]
    fn test_get_extremes_leaves_arguments() {
        let column = ColumnNothing::new(3);
        let mut min = Field::from(1u64);
        let mut max = Field::from("z");
        column.get_extremes(&mut min, &mut max);
        assert_eq!(min, Field::from(1u64));
        assert_eq!(max, Field::from("z"));
    }

    #[test]
    fn test_comparison_is_constant() {
        let column = ColumnNothing::new(3);
        let other = DummyColumn::<Placeholder>::new(5);

        assert_eq!(column.compare_at(0, 4, &other, 1), Ordering::Equal);
        assert_eq!(column.compare_at(2, 1, &column, -1), Ordering::Equal);
        assert!(column.has_equal_values());

        let mut row_indexes = vec![0, 2];
        let mut results = vec![1i8, -1, 0];
        column.compare_column(
            &other,
            1,
            Some(&mut row_indexes),
            &mut results,
            SortDirection::Descending,
            1,
        );
        assert_eq!(row_indexes, vec![0, 2]);
        assert_eq!(results, vec![1, -1, 0]);
    }

    #[test]
    fn test_hashing_contributes_nothing() {
        let column = ColumnNothing::new(3);

        let mut hasher = row_hasher();
        column.update_hash_with_value(1, &mut hasher);
        column.update_hash_fast(&mut hasher);
        assert_eq!(hasher.finish(), row_hasher().finish());

        let mut hash = WeakHash32::new(3);
        column.update_weak_hash32(&mut hash).unwrap();
        assert_eq!(hash, WeakHash32::new(3));
    }

    #[test]
    fn test_serialize_writes_one_byte() {
        let column = ColumnNothing::new(5);
        let mut arena = Arena::new();

        let mut begin = None;
        let span = column.serialize_value_into_arena(0, &mut arena, &mut begin);
        assert_eq!(span, ArenaSpan::new(0, 1));
        assert_eq!(begin, Some(0));
        assert_eq!(arena.get(span), &[SENTINEL]);

        let skipped = column.skip_serialized_in_arena(arena.tail(0)).unwrap();
        assert_eq!(arena.len() - skipped.len(), 1, "Skip should advance by exactly 1 byte");
    }

    #[test]
    fn test_deserialize_agrees_with_skip() {
        let source = ColumnNothing::new(3);
        let mut arena = Arena::new();
        for row in 0..3 {
            let mut begin = None;
            source.serialize_value_into_arena(row, &mut arena, &mut begin);
        }
        assert_eq!(arena.len(), 3);

        let mut target = ColumnNothing::default();
        let mut consumed = arena.tail(0);
        let mut skipped = arena.tail(0);
        for _ in 0..3 {
            consumed = target.deserialize_and_insert_from_arena(consumed).unwrap();
            skipped = target.skip_serialized_in_arena(skipped).unwrap();
            assert_eq!(consumed.len(), skipped.len());
        }
        assert!(consumed.is_empty());
        assert_eq!(target.size(), 3);
    }

    #[test]
    fn test_deserialize_empty_buffer() {
        let mut column = ColumnNothing::new(2);

        let err = column.deserialize_and_insert_from_arena(&[]).unwrap_err();
        assert_eq!(
            err,
            ColumnError::SizeMismatch {
                what: "serialized row",
                expected: 1,
                actual: 0,
            }
        );
        assert_eq!(column.size(), 2, "Failed decode should not grow the column");
        assert!(column.skip_serialized_in_arena(&[]).is_err());
    }

    #[rstest::rstest]
    #[case(&[1, 0, 1, 1, 0], 3)]
    #[case(&[0, 0, 0, 0, 0], 0)]
    #[case(&[1, 1, 1, 1, 1], 5)]
    #[case(&[7, 0, 0, 0, 9], 2)]
    fn test_filter(#[case] mask: &[u8], #[case] expected: usize) {
        let column = ColumnNothing::new(5);
        let filtered = column.filter(mask, -1).unwrap();
        assert_eq!(filtered.size(), expected);
        assert!(filtered.is_dummy());
    }

    #[test]
    fn test_filter_ignores_wrong_size_hint() {
        let column = ColumnNothing::new(3);
        let filtered = column.filter(&[1, 0, 1], 100).unwrap();
        assert_eq!(filtered.size(), 2);
    }

    #[test]
    fn test_filter_size_mismatch() {
        let column = ColumnNothing::new(3);
        let err = column.filter(&[1, 0], -1).unwrap_err();
        assert!(err.is_size_mismatch());
    }

    #[rstest::rstest]
    #[case(&[1, 0, 1, 1, 0], false, 3)]
    #[case(&[1, 0, 1, 1, 0], true, 2)]
    #[case(&[], true, 0)]
    #[case(&[0, 0, 0, 0, 0, 0, 0], true, 7)]
    fn test_expand(#[case] mask: &[u8], #[case] inverted: bool, #[case] expected: usize) {
        let mut column = ColumnNothing::new(1);
        column.expand(mask, inverted);
        assert_eq!(column.size(), expected);
    }

    #[rstest::rstest]
    #[case(0, 5)]
    #[case(3, 3)]
    #[case(8, 5)]
    fn test_permute(#[case] limit: usize, #[case] expected: usize) {
        let column = ColumnNothing::new(5);
        let permuted = column.permute(&[4, 3, 2, 1, 0], limit).unwrap();
        assert_eq!(permuted.size(), expected);
    }

    #[test]
    fn test_permute_size_mismatch() {
        let column = ColumnNothing::new(5);
        let err = column.permute(&[0, 1, 2], 0).unwrap_err();
        assert_eq!(
            err,
            ColumnError::SizeMismatch {
                what: "permutation",
                expected: 5,
                actual: 3,
            }
        );
    }

    #[rstest::rstest]
    #[case(0, 5)]
    #[case(2, 2)]
    #[case(4, 4)]
    fn test_index(#[case] limit: usize, #[case] expected: usize) {
        let column = ColumnNothing::new(5);
        let indexes = ColumnNothing::new(4);
        let indexed = column.index(&indexes, limit).unwrap();
        assert_eq!(indexed.size(), expected);
    }

    #[test]
    fn test_index_too_few_indexes() {
        let column = ColumnNothing::new(5);
        let indexes = ColumnNothing::new(2);
        let err = column.index(&indexes, 3).unwrap_err();
        assert!(err.is_size_mismatch());
    }

    #[rstest::rstest]
    #[case(0, &[], 0)]
    #[case(3, &[2, 2, 5], 5)]
    #[case(2, &[0, 0], 0)]
    #[case(1, &[4], 4)]
    fn test_replicate(#[case] size: usize, #[case] offsets: &[u64], #[case] expected: usize) {
        let column = ColumnNothing::new(size);
        let replicated = column.replicate(offsets).unwrap();
        assert_eq!(replicated.size(), expected);
    }

    #[test]
    fn test_replicate_size_mismatch() {
        let column = ColumnNothing::new(2);
        assert!(column.replicate(&[1]).unwrap_err().is_size_mismatch());
        assert!(column.replicate(&[]).unwrap_err().is_size_mismatch());
    }

    #[rstest::rstest]
    #[case(2, &[0, 1, 0, 0, 1], &[3, 2])]
    #[case(3, &[2, 2, 2, 2, 2], &[0, 0, 5])]
    #[case(1, &[0, 0, 0, 0, 0], &[5])]
    fn test_scatter(
        #[case] num_buckets: usize,
        #[case] selector: &[usize],
        #[case] expected: &[usize],
    ) {
        let column = ColumnNothing::new(5);
        let buckets = column.scatter(num_buckets, selector).unwrap();
        let sizes: Vec<usize> = buckets.iter().map(|bucket| bucket.size()).collect();
        assert_eq!(sizes, expected);
        assert_eq!(sizes.iter().sum::<usize>(), column.size());
    }

    #[test]
    fn test_scatter_empty() {
        let column = ColumnNothing::default();
        let buckets = column.scatter(3, &[]).unwrap();
        assert_eq!(buckets.len(), 3);
        assert!(buckets.iter().all(|bucket| bucket.is_empty()));
    }

    #[test]
    fn test_scatter_size_mismatch() {
        let column = ColumnNothing::new(5);
        let err = column.scatter(2, &[0, 1]).unwrap_err();
        assert!(err.is_size_mismatch());
    }

    #[rstest::rstest]
    #[case(0, vec![0, 1, 2, 3, 4])]
    #[case(2, vec![0, 1])]
    #[case(9, vec![0, 1, 2, 3, 4])]
    fn test_get_permutation(#[case] limit: usize, #[case] expected: Permutation) {
        let column = ColumnNothing::new(5);
        let perm = column.get_permutation(
            SortDirection::Descending,
            SortStability::Stable,
            limit,
            1,
        );
        assert_eq!(perm, expected);
    }

    #[test]
    fn test_update_permutation_is_noop() {
        let column = ColumnNothing::new(4);
        let mut perm = vec![3, 1, 2, 0];
        let mut equal_ranges = vec![0..2, 2..4];
        column.update_permutation(
            SortDirection::Ascending,
            SortStability::Unstable,
            0,
            1,
            &mut perm,
            &mut equal_ranges,
        );
        assert_eq!(perm, vec![3, 1, 2, 0]);
        assert_eq!(equal_ranges, vec![0..2, 2..4]);
    }
}
