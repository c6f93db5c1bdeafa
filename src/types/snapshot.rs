use std::collections::HashMap;

use crate::host::{Actuator, StateProvider};

/// In-memory entity states, keyed by entity id such as `"binary_sensor.motion"`.
///
/// Implements both [`StateProvider`] and [`Actuator`], so it can stand in for
/// a host: `turn_on` and `turn_off` simply record `"on"` and `"off"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    data: HashMap<String, String>,
}

impl Snapshot {
    /// Create an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an entity's state.
    #[must_use]
    pub fn set(mut self, entity: &str, state: &str) -> Self {
        self.insert(entity, state);
        self
    }

    /// Insert a state (mutable reference version). Returns the previous state.
    pub fn insert(&mut self, entity: &str, state: &str) -> Option<String> {
        self.data.insert(entity.to_owned(), state.to_owned())
    }

    /// Forget an entity. Returns its last state.
    pub fn remove(&mut self, entity: &str) -> Option<String> {
        self.data.remove(entity)
    }

    #[must_use]
    pub fn get(&self, entity: &str) -> Option<&str> {
        self.data.get(entity).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl StateProvider for Snapshot {
    fn get_state(&self, entity: &str) -> Option<String> {
        self.data.get(entity).cloned()
    }
}

impl Actuator for Snapshot {
    fn turn_on(&mut self, entity: &str) {
        self.insert(entity, "on");
    }

    fn turn_off(&mut self, entity: &str) {
        self.insert(entity, "off");
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            data: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
