pub mod jwt;
pub mod middleware;
pub mod models;

pub use jwt::JwtValidator;
pub use middleware::{auth_middleware, AuthState};
pub use models::{JwtClaims, UserContext};
