mod auth;
mod headers;

pub use auth::FileTokenStore;
pub use auth::MemoryTokenStore;
pub use auth::TokenManager;
pub use auth::TokenStore;
pub use auth::is_expired;
pub use headers::HeadersManager;
