use std::hash::BuildHasher;

const ROW_HASH_SEEDS: [u64; 4] = [
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
];

/// Creates the hasher used to fold a row's values across every column of a
/// block.
///
/// The hasher is seeded with fixed keys so the same row hashes identically
/// across blocks and threads.
pub fn row_hasher() -> ahash::AHasher {
    let [k0, k1, k2, k3] = ROW_HASH_SEEDS;
    ahash::RandomState::with_seeds(k0, k1, k2, k3).build_hasher()
}

#[derive(Debug, Clone, Eq, PartialEq)]
/// A 32-bit hash per row, accumulated column by column.
///
/// Used where speed matters more than hash quality, e.g. choosing a shuffle
/// bucket for each row.
pub struct WeakHash32 {
    data: Vec<u32>,
}

impl WeakHash32 {
    /// Creates a new hash for `rows` rows with every entry set to the initial
    /// value.
    pub fn new(rows: usize) -> Self {
        Self {
            data: vec![u32::MAX; rows],
        }
    }

    #[inline]
    /// The number of rows the hash covers.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn data(&self) -> &[u32] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [u32] {
        &mut self.data
    }

    /// Resets the hash to cover `rows` rows of initial values.
    pub fn reset(&mut self, rows: usize) {
        self.data.clear();
        self.data.resize(rows, u32::MAX);
    }
}

#[cfg(test)]
mod tests {
    use std::hash::Hasher;

    use super::*;

    #[test]
    fn test_row_hasher_is_deterministic() {
        let mut a = row_hasher();
        let mut b = row_hasher();
        a.write_u64(42);
        b.write_u64(42);
        assert_eq!(a.finish(), b.finish());
    }

    #[test]
    fn test_weak_hash_reset() {
        let mut hash = WeakHash32::new(3);
        assert_eq!(hash.data(), &[u32::MAX; 3]);

        hash.data_mut()[1] = 7;
        hash.reset(2);
        assert_eq!(hash.len(), 2);
        assert_eq!(hash.data(), &[u32::MAX; 2]);
    }
}
