pub mod credentials;
pub mod media;
pub mod media_ids;

pub use credentials::CredentialRecord;
pub use media::{MediaType, SortDirection};
pub use media_ids::NormalizedItem;
