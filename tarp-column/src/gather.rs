//! The boundary to the multi-way merge used during sorted merges.
//!
//! The merge itself lives outside this crate, a column only pulls from it.

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
/// Identifies the source the next merged row is taken from.
pub struct RowSource {
    /// The index of the source column.
    pub source: usize,
    /// The row is consumed from the source but not emitted.
    pub skip: bool,
}

/// A pull-based stream of merge decisions over several source columns.
pub trait GathererStream {
    /// The number of source columns being merged.
    fn num_sources(&self) -> usize;

    /// Returns the source of the next output row, or `None` once the merge
    /// is complete.
    fn next_row_source(&mut self) -> Option<RowSource>;
}
