/// Server configuration constants.
///
/// Defaults for the listening socket and for where card images are served from.
/// Every value here can be overridden on the command line (see `args`).
pub const DEFAULT_LISTEN: &str = "127.0.0.1:8080";

/// Prefix clients prepend to resolved image references. Empty means "same origin".
pub const SERVING_PREFIX: &str = "";

/// Static file server used for references starting with `/`.
pub const LOCAL_SERVING_ADDRESS: &str = "http://localhost:8000/";
