mod arena;
mod config;

pub use self::arena::{Arena, ArenaSpan};
pub use self::config::ArenaConfig;
