//! Shared fixtures for the unit tests.
//!
//! Every test in the crate rewrites from the same local site to the same
//! production host, so expectations read the same across modules:
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! assert_eq!(
//!     resolve("https://local.test/a.png", &prod(), LOCAL),
//!     "https://prod.com/a.png"
//! );
//! ```

use crate::types::RewriteConfig;

/// Base URL of the site being rewritten.
pub const LOCAL: &str = "https://local.test";

/// Production host every fixture redirects to.
pub const PROD: &str = "https://prod.com";

/// Enabled config pointing at [`PROD`].
pub fn prod() -> RewriteConfig {
    RewriteConfig::new(true, PROD)
}

/// Config with a production URL set but the switch turned off.
pub fn switched_off() -> RewriteConfig {
    RewriteConfig::new(false, PROD)
}

/// Prefix a path with the production host, for building expected output.
pub fn on_prod(path: &str) -> String {
    format!("{PROD}{path}")
}
