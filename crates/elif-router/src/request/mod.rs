pub mod context;

pub use context::{CancellationToken, Extensions, RequestContext};
