//! Cookie based authentication for the API routes.
//!
//! Token issuance happens outside this service. The middleware in this
//! module only validates that a request carries a private cookie pair that
//! has not expired and still refers to a registered user.

mod cookie;
mod middleware;

pub use cookie::{DEFAULT_COOKIE_DURATION, set_auth_cookie};
pub use middleware::auth_guard;

#[cfg(test)]
pub(crate) use cookie::COOKIE_USER_ID;
