pub mod error;
pub mod memory;
pub mod merge;
pub mod redb;
pub mod traits;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use merge::merge_patch;
pub use redb::RedbStore;
pub use traits::DocStore;
