pub mod ip_extractor;
pub mod jwt_auth;
pub mod rate_limit;

pub use ip_extractor::{extract_client_ip, ClientIp};
pub use jwt_auth::{jwt_auth_middleware, AuthUser};
pub use rate_limit::{signin_rate_limit, SigninRateLimiter};
