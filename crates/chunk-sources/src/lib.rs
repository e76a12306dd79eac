pub mod error;
pub mod trakt;

pub use error::SourceError;
pub use trakt::api::{ListProvider, TraktListClient};
pub use trakt::auth::{create_trakt_client, HttpTokenEndpoint, RefreshRequest, TokenEndpoint, TokenResponse};
