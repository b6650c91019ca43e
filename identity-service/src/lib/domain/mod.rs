pub mod api_key;
pub mod authentication;
pub mod clock;
pub mod context;
pub mod errors;
pub mod event;
pub mod session;
pub mod token;
pub mod user;
