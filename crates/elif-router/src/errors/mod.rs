pub mod http_error;
pub mod route_error;

pub use http_error::*;
pub use route_error::*;
