pub mod authenticator;
pub mod token_service;

pub use authenticator::Authenticator;
pub use token_service::TokenService;
