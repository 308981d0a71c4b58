//! Counting throttles
//!
//! A [`ResourceThrottle`] hands out at most `capacity` permits at a time.
//! Permits release themselves when dropped, so a permit can travel with the
//! work it guards (for example into a spawned thread) and is returned no
//! matter how that work ends.

use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::sync::Arc;

/// Counting semaphore with RAII permits
#[derive(Debug)]
pub struct ResourceThrottle {
    name: String,
    capacity: usize,
    available: Mutex<usize>,
    released: Condvar,
}

impl ResourceThrottle {
    /// Creates a throttle with `capacity` permits
    ///
    /// A capacity of zero is raised to one so that `acquire` can always make
    /// progress eventually.
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            name: name.into(),
            capacity,
            available: Mutex::new(capacity),
            released: Condvar::new(),
        }
    }

    /// Blocks until a permit is free and takes it
    pub fn acquire(&self) -> Permit<'_> {
        self.take();
        Permit { throttle: self }
    }

    /// Like [`acquire`](Self::acquire), but the permit keeps the throttle
    /// alive and can be moved to another thread
    pub fn acquire_owned(self: &Arc<Self>) -> OwnedPermit {
        self.take();
        OwnedPermit {
            throttle: Arc::clone(self),
        }
    }

    /// Permits currently free
    pub fn available(&self) -> usize {
        *self.available.lock()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn take(&self) {
        let mut available = self.available.lock();
        if *available == 0 {
            tracing::trace!("Throttle '{}' exhausted, waiting", self.name);
        }
        while *available == 0 {
            self.released.wait(&mut available);
        }
        *available -= 1;
    }

    fn release(&self) {
        {
            let mut available = self.available.lock();
            debug_assert!(*available < self.capacity, "throttle '{}' over-released", self.name);
            *available += 1;
        }
        self.released.notify_one();
    }
}

/// A permit borrowed from a [`ResourceThrottle`], released on drop
#[must_use = "the permit is released as soon as it is dropped"]
#[derive(Debug)]
pub struct Permit<'a> {
    throttle: &'a ResourceThrottle,
}

impl Permit<'_> {
    /// Returns the permit now instead of at end of scope
    pub fn release(self) {}
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.throttle.release();
    }
}

/// A permit that owns a handle to its [`ResourceThrottle`], released on drop
#[must_use = "the permit is released as soon as it is dropped"]
#[derive(Debug)]
pub struct OwnedPermit {
    throttle: Arc<ResourceThrottle>,
}

impl OwnedPermit {
    /// Returns the permit now instead of at end of scope
    pub fn release(self) {}
}

impl Drop for OwnedPermit {
    fn drop(&mut self) {
        self.throttle.release();
    }
}

/// One throttle per origin server, created on first use
///
/// The table lock is only held while looking up or creating a throttle, never
/// while waiting for a permit.
#[derive(Debug)]
pub struct ServerThrottles {
    per_server: usize,
    table: Mutex<HashMap<String, Arc<ResourceThrottle>>>,
}

impl ServerThrottles {
    /// # Arguments
    ///
    /// * `per_server` - Permits each server's throttle starts with
    pub fn new(per_server: usize) -> Self {
        Self {
            per_server,
            table: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the throttle for `server`, creating it at full capacity if
    /// this is the first request for that server
    pub fn throttle_for(&self, server: &str) -> Arc<ResourceThrottle> {
        let mut table = self.table.lock();
        if let Some(throttle) = table.get(server) {
            return Arc::clone(throttle);
        }

        tracing::trace!("Creating throttle for server {}", server);
        let throttle = Arc::new(ResourceThrottle::new(
            format!("server:{}", server),
            self.per_server,
        ));
        table.insert(server.to_string(), Arc::clone(&throttle));
        throttle
    }

    /// Blocks until `server` has a free permit and takes it
    pub fn acquire(&self, server: &str) -> OwnedPermit {
        let throttle = self.throttle_for(server);
        throttle.acquire_owned()
    }

    /// Number of servers that have a throttle
    pub fn server_count(&self) -> usize {
        self.table.lock().len()
    }
}
