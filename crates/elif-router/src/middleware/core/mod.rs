pub mod logging;
pub mod recovery;
pub mod request_id;
pub mod timing;

pub use logging::*;
pub use recovery::*;
pub use request_id::*;
pub use timing::*;
