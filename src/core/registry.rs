//! Id-keyed registries that own catalog entities.
//!
//! Entries keep insertion order for listing. Keys are unique; a second
//! insert with the same key is refused and leaves the registry untouched.

use std::collections::HashMap;

use crate::domain::{Resource, User};

/// Anything stored in a registry exposes its unique key
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for Resource {
    fn key(&self) -> &str {
        self.id()
    }
}

impl Keyed for User {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Insertion-ordered map from id to owned entity
#[derive(Debug, Clone)]
pub struct Registry<T> {
    entries: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Keyed> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry. Returns false without mutation if the key exists.
    pub fn add(&mut self, entry: T) -> bool {
        if self.index.contains_key(entry.key()) {
            return false;
        }
        self.index.insert(entry.key().to_string(), self.entries.len());
        self.entries.push(entry);
        true
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.index.get(id).and_then(|&i| self.entries.get(i))
    }

    /// Mutable access stays crate-private so keys cannot be changed
    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.index.get(id).and_then(|&i| self.entries.get_mut(i))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// All entries in insertion order
    pub fn all(&self) -> &[T] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ResourceState;

    #[test]
    fn test_add_and_get() {
        let mut users = Registry::new();
        assert!(users.add(User::new("u1", "Ada")));
        assert!(users.add(User::new("u2", "Grace")));

        assert_eq!(users.len(), 2);
        assert_eq!(users.get("u2").map(|u| u.name.as_str()), Some("Grace"));
        assert!(users.get("u3").is_none());
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let mut users = Registry::new();
        assert!(users.add(User::new("u1", "Ada")));
        assert!(!users.add(User::new("u1", "Someone Else")));

        assert_eq!(users.len(), 1);
        assert_eq!(users.get("u1").map(|u| u.name.as_str()), Some("Ada"));
    }

    #[test]
    fn test_get_mut_finds_same_entry() {
        let mut resources = Registry::new();
        resources.add(Resource::book("b1", "Dune", "Herbert"));

        let resource = resources.get_mut("b1").unwrap();
        resource.set_state(ResourceState::Loaned);

        assert_eq!(resources.get("b1").unwrap().state(), ResourceState::Loaned);
        assert!(resources.get_mut("b2").is_none());
    }

    #[test]
    fn test_all_keeps_insertion_order() {
        let mut resources = Registry::new();
        resources.add(Resource::book("z", "Zed", "A"));
        resources.add(Resource::book("a", "Alpha", "B"));
        resources.add(Resource::dvd("m", "Middle", 90));

        let ids: Vec<_> = resources.all().iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["z", "a", "m"]);
    }
}
