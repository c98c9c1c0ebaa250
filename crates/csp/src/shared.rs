//! Lock-guarded policy handle for callers that share one policy across threads.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::policy::Policy;

/// A cloneable handle to a single [`Policy`].
///
/// Every clone refers to the same policy. Reads may proceed concurrently;
/// mutations take the write lock for the duration of one operation.
#[derive(Debug, Clone, Default)]
pub struct SharedPolicy {
    inner: Arc<RwLock<Policy>>,
}

impl SharedPolicy {
    pub fn new(policy: Policy) -> Self {
        Self {
            inner: Arc::new(RwLock::new(policy)),
        }
    }

    /// Parse a header value into a new shared policy
    pub fn parse(input: &str) -> Self {
        Self::new(Policy::parse(input))
    }

    /// Shared read access
    pub fn read(&self) -> RwLockReadGuard<'_, Policy> {
        self.inner.read()
    }

    /// Exclusive write access
    pub fn write(&self) -> RwLockWriteGuard<'_, Policy> {
        self.inner.write()
    }

    /// Serialize the current policy
    pub fn to_header_string(&self) -> String {
        self.inner.read().to_string()
    }

    /// Copy of the current policy
    pub fn snapshot(&self) -> Policy {
        self.inner.read().clone()
    }
}

impl From<Policy> for SharedPolicy {
    fn from(policy: Policy) -> Self {
        Self::new(policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_clones_share_state() {
        let shared = SharedPolicy::parse("default-src 'self';");
        let other = shared.clone();

        other.write().add_source("default-src", "https:").unwrap();
        assert_eq!(shared.to_header_string(), "default-src 'self' https:;");
    }

    #[test]
    fn test_concurrent_mutation() {
        let shared = SharedPolicy::default();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let shared = shared.clone();
                thread::spawn(move || {
                    shared
                        .write()
                        .add_source("connect-src", format!("wss://node{}.example.com", i))
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let sources = shared.read().get("connect-src").unwrap().unwrap();
        assert_eq!(sources.len(), 8);
        assert_eq!(shared.snapshot().len(), 1);
    }
}
