//! An append-only bump arena.
//!
//! Rows are packed into the arena one after the other and are only ever
//! reclaimed together, either by [Arena::reset] or by dropping the arena.
//! Allocations are addressed by [ArenaSpan] offsets rather than pointers, which
//! keeps them valid while the underlying buffer grows.

use std::fmt::{Debug, Formatter};
use std::ops::Range;

use bytes::{Bytes, BytesMut};
use tracing::trace;

use crate::ArenaConfig;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
/// A contiguous region of bytes allocated within an [Arena].
pub struct ArenaSpan {
    offset: usize,
    len: usize,
}

impl ArenaSpan {
    /// Creates a new [ArenaSpan] starting at `offset` and covering `len` bytes.
    pub fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    #[inline]
    /// The position of the first byte of the span within the arena.
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    /// The number of bytes covered by the span.
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    /// The position one past the last byte of the span.
    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }
}

/// A growable, append-only byte region.
///
/// The arena is owned by a single writer. Once packing is complete it can be
/// frozen into [Bytes] and shared read-only.
pub struct Arena {
    buffer: BytesMut,
}

impl Debug for Arena {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Arena(len={}, capacity={})",
            self.buffer.len(),
            self.buffer.capacity()
        )
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl Arena {
    /// Creates a new arena with the default [ArenaConfig].
    pub fn new() -> Self {
        Self::with_config(ArenaConfig::default())
    }

    /// Creates a new arena with the given [ArenaConfig].
    pub fn with_config(config: ArenaConfig) -> Self {
        Self {
            buffer: BytesMut::with_capacity(config.initial_capacity),
        }
    }

    #[inline]
    /// The number of bytes allocated so far.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    #[inline]
    /// The number of bytes the arena can hold before growing.
    pub fn allocated_bytes(&self) -> usize {
        self.buffer.capacity()
    }

    /// Allocates `n` zeroed contiguous bytes at the end of the arena.
    ///
    /// Returns the [ArenaSpan] of the allocation and the bytes to write into.
    pub fn alloc(&mut self, n: usize) -> (ArenaSpan, &mut [u8]) {
        let offset = self.buffer.len();
        self.buffer.resize(offset + n, 0);

        let span = ArenaSpan::new(offset, n);
        (span, &mut self.buffer[span.range()])
    }

    /// Allocates `n` bytes which continue the region starting at `begin`.
    ///
    /// If `begin` is `None` a new region is started at the current end of the
    /// arena and `begin` is set to its offset. Everything from `begin` to the
    /// end of the arena forms one contiguous region, so a caller packing
    /// several values into one key must not interleave unrelated allocations.
    ///
    /// The returned [ArenaSpan] covers only the newly allocated bytes, use
    /// [Arena::span_from] to get the whole region.
    pub fn alloc_continue(
        &mut self,
        n: usize,
        begin: &mut Option<usize>,
    ) -> (ArenaSpan, &mut [u8]) {
        let region_start = *begin.get_or_insert(self.buffer.len());
        trace!(region_start, n, "Continuing arena region");
        self.alloc(n)
    }

    /// Returns the span from `begin` up to the current end of the arena.
    pub fn span_from(&self, begin: usize) -> ArenaSpan {
        ArenaSpan::new(begin, self.buffer.len().saturating_sub(begin))
    }

    /// Returns the bytes covered by the given span.
    ///
    /// Panics if the span was not allocated by this arena.
    pub fn get(&self, span: ArenaSpan) -> &[u8] {
        &self.buffer[span.range()]
    }

    /// Returns all bytes allocated so far, starting at `offset`.
    ///
    /// This is the read cursor used when decoding rows packed back to back.
    ///
    /// Panics if `offset` is past the end of the arena.
    pub fn tail(&self, offset: usize) -> &[u8] {
        &self.buffer[offset..]
    }

    /// Discards all allocations while keeping the reserved memory.
    pub fn reset(&mut self) {
        trace!(len = self.buffer.len(), "Resetting arena");
        self.buffer.clear();
    }

    /// Consumes the arena and returns its contents as shareable [Bytes].
    pub fn freeze(self) -> Bytes {
        self.buffer.freeze()
    }
}
