//! Default configuration values

pub struct RouterDefaults;

impl RouterDefaults {
    pub const ALLOW_PATH_TRAVERSAL: bool = false;
    pub const HEAD_FALLBACK_TO_GET: bool = true;
    pub const MAX_PATH_SEGMENTS: usize = 64;
    pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;
    pub const SLOW_REQUEST_THRESHOLD_MS: u64 = 1000;
    /// Zero disables the deadline
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
}
