pub mod draft;
pub mod error;
pub mod memory;
pub mod redb;
pub mod traits;

pub use draft::DraftStore;
pub use error::KVError;
pub use memory::MemoryStore;
pub use redb::RedbStore;
pub use traits::KVStore;
