use std::collections::{BTreeMap, HashSet};

use crate::keybindings::{is_valid_binding, normalize};

use super::BindingBackend;

/// In-memory accelerator table, keyed by action path.
///
/// Mirrors how the host toolkit behaves: entries must be added before they
/// can be changed, locked entries refuse changes, and bindings are stored
/// in canonical form (`"<Control>o"`, `"F5"`, or empty for none).
#[derive(Debug, Default, Clone)]
pub struct AccelMap {
    entries: BTreeMap<String, String>,
    locked: HashSet<String>,
}

impl AccelMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `path`. An existing entry keeps its binding.
    pub fn add_entry(&mut self, path: &str, binding: &str) {
        self.entries
            .entry(path.to_string())
            .or_insert_with(|| normalize(binding));
    }

    pub fn lock_path(&mut self, path: &str) {
        self.locked.insert(path.to_string());
    }

    pub fn unlock_path(&mut self, path: &str) {
        self.locked.remove(path);
    }

    pub fn is_locked(&self, path: &str) -> bool {
        self.locked.contains(path)
    }

    /// `(path, binding)` pairs in path order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, b)| (p.as_str(), b.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl BindingBackend for AccelMap {
    fn lookup(&self, path: &str) -> Option<String> {
        self.entries.get(path).cloned()
    }

    fn rewrite(&mut self, path: &str, binding: &str) -> bool {
        if self.is_locked(path) || !is_valid_binding(binding) {
            return false;
        }
        match self.entries.get_mut(path) {
            Some(current) => {
                *current = normalize(binding);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_entry_normalizes() {
        let mut map = AccelMap::new();
        map.add_entry("<Actions>/A", "ctrl+O");
        assert_eq!(map.lookup("<Actions>/A").as_deref(), Some("<Control>o"));
    }

    #[test]
    fn test_add_entry_keeps_existing() {
        let mut map = AccelMap::new();
        map.add_entry("<Actions>/A", "F1");
        map.add_entry("<Actions>/A", "F2");
        assert_eq!(map.lookup("<Actions>/A").as_deref(), Some("F1"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_rewrite_unknown_path_fails() {
        let mut map = AccelMap::new();
        assert!(!map.rewrite("<Actions>/Missing", "F1"));
        assert!(map.lookup("<Actions>/Missing").is_none());
    }

    #[test]
    fn test_rewrite_rejects_invalid_binding() {
        let mut map = AccelMap::new();
        map.add_entry("<Actions>/A", "F1");
        assert!(!map.rewrite("<Actions>/A", "<Control>notakey"));
        assert_eq!(map.lookup("<Actions>/A").as_deref(), Some("F1"));
    }

    #[test]
    fn test_rewrite_locked() {
        let mut map = AccelMap::new();
        map.add_entry("<Actions>/A", "F1");
        map.lock_path("<Actions>/A");
        assert!(!map.rewrite("<Actions>/A", "F2"));
        map.unlock_path("<Actions>/A");
        assert!(map.rewrite("<Actions>/A", "F2"));
        assert_eq!(map.lookup("<Actions>/A").as_deref(), Some("F2"));
    }

    #[test]
    fn test_rewrite_unset() {
        let mut map = AccelMap::new();
        map.add_entry("<Actions>/A", "F1");
        assert!(map.rewrite("<Actions>/A", ""));
        assert_eq!(map.lookup("<Actions>/A").as_deref(), Some(""));
    }

    #[test]
    fn test_lookup_unknown_vs_unset() {
        let mut map = AccelMap::new();
        map.add_entry("<Actions>/A", "");
        assert_eq!(map.lookup("<Actions>/A").as_deref(), Some(""));
        assert!(map.lookup("<Actions>/B").is_none());
    }

    #[test]
    fn test_entries_sorted() {
        let mut map = AccelMap::new();
        map.add_entry("<Actions>/B", "F2");
        map.add_entry("<Actions>/A", "F1");
        let paths: Vec<&str> = map.entries().map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["<Actions>/A", "<Actions>/B"]);
    }
}
