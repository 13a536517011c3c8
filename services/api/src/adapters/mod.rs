pub mod file_store;
pub mod http_relay;
pub mod local_relay;
pub mod memory_store;

pub use file_store::FileStore;
pub use http_relay::HttpRelayClient;
pub use local_relay::LocalRelay;
pub use memory_store::{MemoryStore, UnavailableStore};
