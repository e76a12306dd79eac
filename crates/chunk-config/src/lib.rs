pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{CredentialsConfig, LoggingConfig, ServerConfig, ServiceConfig, TraktConfig, WindowConfig, WindowPolicy};
pub use credentials::{CredentialStore, JsonFileCredentialStore, MemoryCredentialStore, StoreError};
pub use paths::{PathManager, container_base_path};
