pub mod domain;
pub mod ports;
pub mod relay;

pub use domain::{
    Annotation, AnnotationRange, Article, ArticleFilter, Credentials, TokenData,
    DEFAULT_TOKEN_LIFETIME_SECS,
};
pub use ports::{Clock, KeyValueStore, PortError, PortResult, RelayTransport, SystemClock};
pub use relay::{RelayEnvelope, RelayFailure, RelayReply, RelayRequest};
