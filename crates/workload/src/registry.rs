//! Set of active node connections.

use crate::ConnectionRef;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;

/// Active connections, in discovery order.
///
/// Not synchronized on its own: the lifecycle controller keeps it behind the
/// same lock as the pending table so that selection and removal never
/// interleave with bookkeeping.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: Vec<ConnectionRef>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection. Callers guarantee one add per discovery event.
    pub fn add(&mut self, connection: ConnectionRef) {
        self.connections.push(connection);
    }

    /// Remove every connection with the given URL. Returns how many were removed.
    pub fn remove(&mut self, url: &str) -> usize {
        let before = self.connections.len();
        self.connections.retain(|c| c.url() != url);
        before - self.connections.len()
    }

    /// Pick one connection uniformly at random.
    pub fn pick_random<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<ConnectionRef> {
        self.connections.choose(rng).cloned()
    }

    /// Whether this exact connection handle is still registered.
    ///
    /// Compares handles, not URLs: a connection removed and re-discovered
    /// under the same URL is a different handle.
    pub fn is_registered(&self, connection: &ConnectionRef) -> bool {
        self.connections.iter().any(|c| Arc::ptr_eq(c, connection))
    }

    /// Whether any connection has the given URL.
    pub fn contains(&self, url: &str) -> bool {
        self.connections.iter().any(|c| c.url() == url)
    }

    /// Remove and return all connections.
    pub fn drain(&mut self) -> Vec<ConnectionRef> {
        std::mem::take(&mut self.connections)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::RecordingConnection;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    #[test]
    fn test_pick_random_empty() {
        let registry = ConnectionRegistry::new();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        assert!(registry.pick_random(&mut rng).is_none());
    }

    #[test]
    fn test_pick_random_covers_all_connections() {
        let mut registry = ConnectionRegistry::new();
        registry.add(RecordingConnection::shared("tcp://a"));
        registry.add(RecordingConnection::shared("tcp://b"));
        registry.add(RecordingConnection::shared("tcp://c"));
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let seen: HashSet<String> = (0..100)
            .filter_map(|_| registry.pick_random(&mut rng))
            .map(|c| c.url().to_string())
            .collect();

        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_remove_by_url() {
        let mut registry = ConnectionRegistry::new();
        registry.add(RecordingConnection::shared("tcp://a"));
        registry.add(RecordingConnection::shared("tcp://a"));
        registry.add(RecordingConnection::shared("tcp://b"));

        assert_eq!(registry.remove("tcp://a"), 2);
        assert_eq!(registry.remove("tcp://missing"), 0);
        assert_eq!(registry.len(), 1);
        assert!(!registry.contains("tcp://a"));

        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..20 {
            let picked = registry.pick_random(&mut rng).unwrap();
            assert_eq!(picked.url(), "tcp://b");
        }
    }

    #[test]
    fn test_is_registered_compares_handles() {
        let mut registry = ConnectionRegistry::new();
        let original = RecordingConnection::shared("tcp://a");
        registry.add(original.clone());
        assert!(registry.is_registered(&original));

        registry.remove("tcp://a");
        registry.add(RecordingConnection::shared("tcp://a"));

        assert!(registry.contains("tcp://a"));
        assert!(!registry.is_registered(&original));
    }
}
