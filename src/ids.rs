//! Identifier generation.
//!
//! Payload builders never mint random values directly. They ask an
//! [`IdGenerator`], so tests can swap in [`SequentialIds`] and assert exact
//! output.

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

pub trait IdGenerator: Send + Sync {
    fn next(&self) -> String;
}

/// Random v4 UUIDs.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidV4Ids;

impl IdGenerator for UuidV4Ids {
    fn next(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic `<prefix>-<n>` identifiers, starting at 1.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), counter: AtomicU64::new(0) }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("id")
    }
}

impl IdGenerator for SequentialIds {
    fn next(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{}", self.prefix, n)
    }
}

impl<T: IdGenerator + ?Sized> IdGenerator for &T {
    fn next(&self) -> String {
        (**self).next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids() {
        let ids = SequentialIds::new("key");
        assert_eq!(ids.next(), "key-1");
        assert_eq!(ids.next(), "key-2");
    }

    #[test]
    fn test_uuid_ids_are_fresh() {
        let ids = UuidV4Ids;
        assert_ne!(ids.next(), ids.next());
    }
}
