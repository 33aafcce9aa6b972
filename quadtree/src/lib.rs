pub mod entry;
pub mod error;
pub mod overlap;
pub mod pool;
pub mod quadtree;

pub use common::shapes;
pub use entry::{EntryRef, IndexEntry};
pub use error::{QuadtreeError, QuadtreeResult};
