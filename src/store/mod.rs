//! Session store contract and the Cosmos-backed implementation

mod cosmos;
mod traits;

pub use cosmos::CosmosStore;
pub use traits::SessionStore;
