pub mod credential_store;
pub mod error;
pub mod normalize;
pub mod wallabag;

#[cfg(test)]
pub(crate) mod test_support;

pub use credential_store::CredentialStore;
pub use error::{ApiFailure, ClientError, Operation};
pub use wallabag::WallabagClient;
