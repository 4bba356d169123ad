pub mod blob;
pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use blob::BlobStore;
pub use error::StorageError;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use traits::KvStore;
