//! Columnar value containers for the vectorized executor.
//!
//! Every column variant implements the [Column] contract, which lets the
//! executor size, mutate, compare, hash, serialize, filter, permute, replicate
//! and redistribute blocks of rows without knowing the concrete representation.
//!
//! Columns are shared read-only as [ColumnPtr] once published, and are freshly
//! constructed whenever they are transformed.

mod block;
pub mod column;
mod error;
mod field;
pub mod gather;
mod hash;
pub mod index;

pub use tarp_arena::{Arena, ArenaConfig, ArenaSpan};

pub use self::block::Block;
pub use self::column::{
    Column,
    ColumnNothing,
    ColumnPtr,
    DummyColumn,
    DummyVariant,
    MutableColumnPtr,
    Nothing,
    SortDirection,
    SortOptions,
    SortStability,
};
pub use self::error::{ColumnError, ColumnResult};
pub use self::field::Field;
pub use self::hash::{row_hasher, WeakHash32};
