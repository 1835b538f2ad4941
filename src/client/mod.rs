//! Document database client abstraction

mod memory;
mod traits;

pub use memory::{CallCounts, MemoryDocumentClient};
pub use traits::{CollectionInfo, DocumentClient};
