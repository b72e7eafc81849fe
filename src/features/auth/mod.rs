mod jwks;
mod resolver;
mod validator;

pub mod guards;
pub mod model;
pub mod permissions;

pub use jwks::JwksClient;
pub use resolver::IdentityResolver;
pub use validator::JwtValidator;
