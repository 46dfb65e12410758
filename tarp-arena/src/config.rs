use bon::Builder;

const DEFAULT_INITIAL_CAPACITY: usize = 4 << 10;

#[derive(Debug, Clone, Builder)]
#[cfg_attr(test, derive(Eq, PartialEq))]
/// Configuration options for creating an [Arena](crate::Arena).
pub struct ArenaConfig {
    #[builder(default = DEFAULT_INITIAL_CAPACITY)]
    /// The number of bytes reserved up front when the arena is created.
    ///
    /// The arena grows past this as needed, a larger initial capacity only
    /// avoids reallocating while packing the first rows.
    ///
    /// Default is `4 KiB`.
    pub initial_capacity: usize,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
