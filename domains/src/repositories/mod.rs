pub mod credentials;
pub mod messages;
pub mod tokens;
