//! URL helpers
//!
//! The crawler only needs one thing from an article URL: the origin server,
//! used both as the per-server throttle key and as half of the duplicate-story
//! match key.

mod domain;

pub use domain::origin_server;
