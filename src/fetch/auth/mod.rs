//! Composable request-authentication wrappers.
//!
//! Socrata endpoints serve anonymous requests at a throttled rate; an
//! application token lifts the throttle. Socrata reads the token from the
//! `X-App-Token` header or from a query parameter, one wrapper per style.

mod api_key;
mod url_param;

pub use api_key::ApiKey;
pub use url_param::UrlParam;

/// Header Socrata reads application tokens from.
pub const APP_TOKEN_HEADER: &str = "X-App-Token";
