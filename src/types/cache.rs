use std::collections::HashMap;

use crate::host::StateProvider;

/// Read-through cache over a [`StateProvider`], scoped to one evaluation pass.
///
/// Each distinct entity is read from the provider at most once, including
/// entities the provider does not know. Create a fresh cache per pass.
pub struct StateCache<'a, P: StateProvider + ?Sized> {
    provider: &'a P,
    states: HashMap<String, Option<String>>,
}

impl<'a, P: StateProvider + ?Sized> StateCache<'a, P> {
    #[must_use]
    pub fn new(provider: &'a P) -> Self {
        Self {
            provider,
            states: HashMap::new(),
        }
    }

    /// State of `entity` as of the first read in this pass.
    pub fn get(&mut self, entity: &str) -> Option<&str> {
        if !self.states.contains_key(entity) {
            let state = self.provider.get_state(entity);
            self.states.insert(entity.to_owned(), state);
        }
        self.states.get(entity).and_then(Option::as_deref)
    }

    /// Number of provider reads performed so far.
    #[must_use]
    pub fn reads(&self) -> usize {
        self.states.len()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::Snapshot;

    struct Counting {
        inner: Snapshot,
        reads: Cell<usize>,
    }

    impl StateProvider for Counting {
        fn get_state(&self, entity: &str) -> Option<String> {
            self.reads.set(self.reads.get() + 1);
            self.inner.get_state(entity)
        }
    }

    #[test]
    fn reads_each_entity_once() {
        let provider = Counting {
            inner: Snapshot::new().set("a", "on"),
            reads: Cell::new(0),
        };
        let mut cache = StateCache::new(&provider);

        assert_eq!(cache.get("a"), Some("on"));
        assert_eq!(cache.get("a"), Some("on"));
        assert_eq!(provider.reads.get(), 1);
        assert_eq!(cache.reads(), 1);
    }

    #[test]
    fn unknown_is_cached_too() {
        let provider = Counting {
            inner: Snapshot::new(),
            reads: Cell::new(0),
        };
        let mut cache = StateCache::new(&provider);

        assert_eq!(cache.get("missing"), None);
        assert_eq!(cache.get("missing"), None);
        assert_eq!(provider.reads.get(), 1);
    }

    #[test]
    fn fresh_cache_reads_again() {
        let provider = Counting {
            inner: Snapshot::new().set("a", "off"),
            reads: Cell::new(0),
        };
        StateCache::new(&provider).get("a");
        StateCache::new(&provider).get("a");
        assert_eq!(provider.reads.get(), 2);
    }
}
