pub mod api_key;
pub mod event;
pub mod memory;
pub mod session;
pub mod user;

pub use api_key::PostgresApiKeyRepository;
pub use event::PostgresAuthEventRepository;
pub use memory::InMemoryStore;
pub use session::PostgresSessionRepository;
pub use user::PostgresUserRepository;
