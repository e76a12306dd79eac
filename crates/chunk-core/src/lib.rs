pub mod clock;
pub mod error;
pub mod normalize;
pub mod service;
pub mod token_manager;
pub mod window;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{AuthError, ChunkError};
pub use normalize::{normalize_items, MalformedItem, NormalizeObserver, TracingObserver};
pub use service::{ChunkService, ListQuery, ServiceOptions};
pub use token_manager::{AccessToken, TokenManager, TokenStatus};
pub use window::{parse_anchor, select_window, ChunkWindow, WindowError};
