//! Pipeline request and response types.

mod headers;
mod request;
mod response;

pub use headers::HttpHeaders;
pub use request::HttpRequest;
pub use response::HttpResponse;
