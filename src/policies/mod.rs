//! Built-in pipeline policies.

mod authorization;
mod headers;
mod logging;
mod redirect;

pub use authorization::AuthorizationPolicy;
pub use headers::{HeaderPolicy, REQUEST_ID_HEADER, RequestIdPolicy, UserAgentPolicy};
pub use logging::LoggingPolicy;
pub use redirect::RedirectPolicy;
