//! Thread-level building blocks shared by the crawl strategies
//!
//! - [`WorkerPool`]: a fixed set of reusable workers fed by a dispatcher thread
//! - [`ResourceThrottle`]: a counting throttle whose permits release on drop
//! - [`ServerThrottles`]: lazily created per-server throttles

mod pool;
mod throttle;

pub use pool::{PoolHandle, WorkerPool};
pub use throttle::{OwnedPermit, Permit, ResourceThrottle, ServerThrottles};
