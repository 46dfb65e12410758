mod dummy;

use std::cmp::Ordering;
use std::fmt::Debug;
use std::hash::Hasher;
use std::sync::Arc;

use bon::Builder;
use tarp_arena::{Arena, ArenaSpan};

pub use self::dummy::{ColumnNothing, DummyColumn, DummyVariant, Nothing};
use crate::gather::GathererStream;
use crate::index::{EqualRanges, Offsets, Permutation};
use crate::{ColumnError, ColumnResult, Field, WeakHash32};

/// A published column which can be cheaply cloned and shared
/// across workers.
pub type ColumnPtr = Arc<dyn Column>;
/// A column under construction, owned by a single writer.
pub type MutableColumnPtr = Box<dyn Column>;

#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
/// The direction rows are ordered in by a sort.
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    #[inline]
    /// Returns `1` for ascending and `-1` for descending, the factor applied
    /// to a comparison result.
    pub fn as_sign(self) -> i8 {
        match self {
            Self::Ascending => 1,
            Self::Descending => -1,
        }
    }
}

#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
/// Whether equal rows must keep their relative order when sorted.
pub enum SortStability {
    #[default]
    Unstable,
    Stable,
}

#[derive(Debug, Clone, Builder)]
/// Options controlling how a sort permutation is produced.
pub struct SortOptions {
    #[builder(default)]
    /// The direction to order rows in.
    ///
    /// Default is ascending.
    pub direction: SortDirection,
    #[builder(default)]
    /// Whether equal rows keep their relative order.
    ///
    /// Default is unstable.
    pub stability: SortStability,
    #[builder(default)]
    /// Only the first `limit` rows of the result need to be ordered.
    ///
    /// A limit of `0` sorts every row and is the default.
    pub limit: usize,
    #[builder(default = 1)]
    /// Where not-a-number like values are placed, `1` places them after
    /// every other value and `-1` before.
    ///
    /// Default is `1`.
    pub nan_direction_hint: i32,
}

impl Default for SortOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// The contract every column variant implements.
///
/// A column is an ordered sequence of exactly [Column::size] values addressed
/// by a zero based row index shared with every other column of the same block.
///
/// Shape operations (sizing, selection, reordering and redistribution) are
/// required. Operations that need a real value to answer have default bodies
/// which fail with [ColumnError::Unsupported], a variant has to override them
/// to support values at all.
///
/// Transforming operations take `&self` and return new columns, so their
/// results can be handed to other workers without synchronisation. Mutating
/// operations take `&mut self`.
pub trait Column: Debug + Send + Sync {
    /// The name of the column variant, used in diagnostics.
    fn name(&self) -> String;

    /// The number of rows in the column.
    fn size(&self) -> usize;

    #[inline]
    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Returns a new column of the same shape with `size` rows.
    ///
    /// Value-bearing columns truncate or pad with default values.
    fn clone_resized(&self, size: usize) -> MutableColumnPtr;

    /// Returns a new empty column of the same shape.
    fn clone_empty(&self) -> MutableColumnPtr {
        self.clone_resized(0)
    }

    /// The number of bytes used by the column's values.
    fn byte_size(&self) -> usize;

    /// The number of bytes used by the value at `row`.
    fn byte_size_at(&self, row: usize) -> usize;

    /// The number of bytes reserved by the column, including unused capacity.
    fn allocated_bytes(&self) -> usize;

    /// Returns `true` if the column carries no per-row payload.
    fn is_dummy(&self) -> bool {
        false
    }

    /// Appends one default-valued row.
    fn insert_default(&mut self);

    /// Removes the last `n` rows.
    ///
    /// The caller must ensure `n <= self.size()`.
    fn pop_back(&mut self, n: usize);

    /// Appends a copy of `row` from `src`.
    fn insert_from(&mut self, src: &dyn Column, row: usize) -> ColumnResult<()>;

    /// Appends a copy of `length` rows of `src` starting at `start`.
    ///
    /// The caller must ensure the range is within `src`.
    fn insert_range_from(
        &mut self,
        src: &dyn Column,
        start: usize,
        length: usize,
    ) -> ColumnResult<()>;

    /// Appends one row from its raw byte representation.
    fn insert_data(&mut self, data: &[u8]) -> ColumnResult<()>;

    /// Returns the value at `row`.
    fn get(&self, _row: usize) -> ColumnResult<Field> {
        Err(ColumnError::unsupported("get", self.name()))
    }

    /// Writes the value at `row` into `out`.
    fn get_into(&self, _row: usize, _out: &mut Field) -> ColumnResult<()> {
        Err(ColumnError::unsupported("get_into", self.name()))
    }

    /// Appends one row holding `value`.
    fn insert(&mut self, _value: &Field) -> ColumnResult<()> {
        Err(ColumnError::unsupported("insert", self.name()))
    }

    /// Returns `true` if the value at `row` is the default value of the
    /// column's type.
    fn is_default_at(&self, _row: usize) -> ColumnResult<bool> {
        Err(ColumnError::unsupported("is_default_at", self.name()))
    }

    /// Returns an opaque byte view of the value at `row`.
    fn get_data_at(&self, row: usize) -> &[u8];

    /// Three-way compares `row` of this column with `rhs_row` of `rhs`.
    ///
    /// `nan_direction_hint` places not-a-number like values, see
    /// [SortOptions::nan_direction_hint].
    fn compare_at(
        &self,
        row: usize,
        rhs_row: usize,
        rhs: &dyn Column,
        nan_direction_hint: i32,
    ) -> Ordering;

    /// Compares every row of this column with `rhs_row` of `rhs`.
    ///
    /// Results are written to `compare_results` with `direction` applied. If
    /// `row_indexes` is given only those rows are compared, and rows which are
    /// no longer equal are removed from it.
    fn compare_column(
        &self,
        rhs: &dyn Column,
        rhs_row: usize,
        row_indexes: Option<&mut Vec<usize>>,
        compare_results: &mut [i8],
        direction: SortDirection,
        nan_direction_hint: i32,
    );

    /// Returns `true` if every row holds the same value.
    fn has_equal_values(&self) -> bool;

    /// Folds the value at `row` into `hasher`.
    fn update_hash_with_value(&self, row: usize, hasher: &mut dyn Hasher);

    /// Folds every row's value into the matching entry of `hash`.
    fn update_weak_hash32(&self, hash: &mut WeakHash32) -> ColumnResult<()>;

    /// Folds the whole column into `hasher`.
    fn update_hash_fast(&self, hasher: &mut dyn Hasher);

    /// Encodes the value at `row` into the arena, continuing the region that
    /// starts at `begin`.
    ///
    /// The encoding must never be zero bytes long, even for a row without a
    /// value. Encodings of several columns are concatenated into one key and
    /// a zero length encoding cannot be told apart from a missing one.
    fn serialize_value_into_arena(
        &self,
        row: usize,
        arena: &mut Arena,
        begin: &mut Option<usize>,
    ) -> ArenaSpan;

    /// Decodes one row from the front of `pos` and appends it.
    ///
    /// Returns the bytes following the consumed encoding.
    fn deserialize_and_insert_from_arena<'a>(
        &mut self,
        pos: &'a [u8],
    ) -> ColumnResult<&'a [u8]>;

    /// Skips one encoded row at the front of `pos` without decoding it.
    ///
    /// This must advance by exactly as many bytes as
    /// [Column::deserialize_and_insert_from_arena] consumes.
    fn skip_serialized_in_arena<'a>(&self, pos: &'a [u8]) -> ColumnResult<&'a [u8]>;

    /// Returns a new column holding the rows whose `mask` entry is non-zero.
    ///
    /// `size_hint` is the expected result size if known, or a negative value.
    /// It is only ever a hint.
    fn filter(&self, mask: &[u8], size_hint: isize) -> ColumnResult<ColumnPtr>;

    /// Resizes the column to the number of non-zero entries in `mask`, or the
    /// number of zero entries if `inverted`.
    fn expand(&mut self, mask: &[u8], inverted: bool);

    /// Returns a new column reordered by `perm`, keeping at most `limit` rows
    /// when `limit` is non-zero.
    fn permute(&self, perm: &[usize], limit: usize) -> ColumnResult<ColumnPtr>;

    /// Returns a new column gathering the rows named by the `indexes` column,
    /// taking the first `limit` indexes when `limit` is non-zero.
    fn index(&self, indexes: &dyn Column, limit: usize) -> ColumnResult<ColumnPtr>;

    /// Returns a new column where row `i` is repeated
    /// `offsets[i] - offsets[i - 1]` times.
    fn replicate(&self, offsets: &[u64]) -> ColumnResult<ColumnPtr>;

    /// Splits the column into `num_buckets` new columns, row `i` going to
    /// bucket `selector[i]`.
    fn scatter(
        &self,
        num_buckets: usize,
        selector: &[usize],
    ) -> ColumnResult<Vec<MutableColumnPtr>>;

    /// Returns the permutation which sorts the column.
    ///
    /// When `limit` is non-zero only the first `limit` rows of the order are
    /// required.
    fn get_permutation(
        &self,
        direction: SortDirection,
        stability: SortStability,
        limit: usize,
        nan_direction_hint: i32,
    ) -> Permutation;

    /// Refines `perm` within each of the `equal_ranges`, which are rows the
    /// previous sort keys left equal.
    ///
    /// The ranges are replaced by those still equal after this column.
    fn update_permutation(
        &self,
        direction: SortDirection,
        stability: SortStability,
        limit: usize,
        nan_direction_hint: i32,
        perm: &mut Permutation,
        equal_ranges: &mut EqualRanges,
    );

    /// Estimates the share of rows holding the default value by sampling
    /// `sample_ratio` of the rows.
    fn get_ratio_of_default_rows(&self, _sample_ratio: f64) -> ColumnResult<f64> {
        Err(ColumnError::unsupported(
            "get_ratio_of_default_rows",
            self.name(),
        ))
    }

    /// Appends the indices of rows in `from..limit` which do not hold the
    /// default value.
    fn get_indices_of_non_default_rows(
        &self,
        _indices: &mut Offsets,
        _from: usize,
        _limit: usize,
    ) -> ColumnResult<()> {
        Err(ColumnError::unsupported(
            "get_indices_of_non_default_rows",
            self.name(),
        ))
    }

    /// Fills the column by pulling merged rows from `stream`.
    fn gather(&mut self, _stream: &mut dyn GathererStream) -> ColumnResult<()> {
        Err(ColumnError::unsupported("gather", self.name()))
    }

    /// Writes the smallest and largest values of the column into `min` and
    /// `max`.
    fn get_extremes(&self, min: &mut Field, max: &mut Field);
}
