//! Auxiliary index structures consumed by the column contract.
//!
//! These describe *which* rows an operation touches and in what order, they
//! never carry values themselves.

use std::ops::Range;

/// One byte per row, a non-zero entry keeps the row.
pub type Filter = Vec<u8>;
/// A sequence of row indices describing a reordering.
pub type Permutation = Vec<usize>;
/// A bucket id per row, used to fan a column out into several columns.
pub type Selector = Vec<usize>;
/// Non-decreasing cumulative row counts, entry `i` is the number of output
/// rows produced by source rows `0..=i`.
pub type Offsets = Vec<u64>;
/// Half-open ranges of a permutation whose rows still compare equal.
pub type EqualRanges = Vec<Range<usize>>;

#[inline]
/// Counts the number of rows kept by the filter.
pub fn count_bytes_in_filter(filter: &[u8]) -> usize {
    filter.iter().filter(|&&flag| flag != 0).count()
}

#[inline]
/// The number of rows produced when at most `limit` rows are requested.
///
/// A `limit` of `0` means no limit.
pub fn limited_size(size: usize, limit: usize) -> usize {
    if limit > 0 {
        size.min(limit)
    } else {
        size
    }
}

#[inline]
/// The total number of rows described by the offsets.
///
/// Empty offsets describe no rows.
///
/// Only targets with a 64-bit `usize` are supported, a narrower target
/// would truncate totals above `usize::MAX`.
pub fn replicated_size(offsets: &[u64]) -> usize {
    offsets.last().map_or(0, |&total| {
        debug_assert!(
            usize::try_from(total).is_ok(),
            "Offsets total {total} does not fit in usize"
        );
        total as usize
    })
}

/// Returns the identity permutation over `size` rows, truncated to `limit`
/// rows when a limit is set.
pub fn identity_permutation(size: usize, limit: usize) -> Permutation {
    (0..limited_size(size, limit)).collect()
}

/// Tallies how many rows the selector assigns to each of the `num_buckets`
/// buckets.
///
/// Every selector entry must be below `num_buckets`, the caller is trusted to
/// uphold this.
pub fn bucket_counts(num_buckets: usize, selector: &[usize]) -> Vec<usize> {
    let mut counts = vec![0; num_buckets];
    for &bucket in selector {
        debug_assert!(
            bucket < num_buckets,
            "Selector bucket {bucket} is out of range for {num_buckets} buckets"
        );
        counts[bucket] += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    #[case(&[], 0)]
    #[case(&[1, 0, 1, 1, 0], 3)]
    #[case(&[0, 0, 0], 0)]
    #[case(&[255, 2, 1], 3)]
    fn test_count_bytes_in_filter(#[case] filter: &[u8], #[case] expected: usize) {
        assert_eq!(count_bytes_in_filter(filter), expected);
    }

    #[rstest::rstest]
    #[case(5, 0, 5)]
    #[case(5, 3, 3)]
    #[case(5, 10, 5)]
    #[case(0, 2, 0)]
    fn test_limited_size(#[case] size: usize, #[case] limit: usize, #[case] expected: usize) {
        assert_eq!(limited_size(size, limit), expected);
    }

    #[rstest::rstest]
    #[case(&[], 0)]
    #[case(&[2, 2, 5], 5)]
    #[case(&[0, 0], 0)]
    fn test_replicated_size(#[case] offsets: &[u64], #[case] expected: usize) {
        assert_eq!(replicated_size(offsets), expected);
    }

    #[test]
    fn test_identity_permutation() {
        assert_eq!(identity_permutation(4, 0), vec![0, 1, 2, 3]);
        assert_eq!(identity_permutation(4, 2), vec![0, 1]);
        assert!(identity_permutation(0, 0).is_empty());
    }

    #[test]
    fn test_bucket_counts() {
        assert_eq!(bucket_counts(2, &[0, 1, 0, 0, 1]), vec![3, 2]);
        assert_eq!(bucket_counts(3, &[2, 2]), vec![0, 0, 2]);
        assert!(bucket_counts(0, &[]).is_empty());
    }
}
