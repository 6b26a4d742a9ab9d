//! First-write-wins tables shared by the merge strategies.
//!
//! Every registry in a run (identifiers, geometries, texture entries,
//! translation keys) is a [`FirstWriteTable`] behind its own mutex.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

/// Outcome of [`FirstWriteTable::claim`].
#[derive(Debug, PartialEq, Eq)]
pub enum Claim<'a, V> {
    /// The key was free and now holds the offered value.
    New,
    /// The key was already claimed; the offered value was dropped.
    Taken(&'a V),
}

/// Map where the first value registered for a key is kept forever.
///
/// Iteration is sorted by key so flushed output is stable.
#[derive(Debug, Clone)]
pub struct FirstWriteTable<V> {
    entries: BTreeMap<String, V>,
}

impl<V> FirstWriteTable<V> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Register `value` under `key` unless the key is already taken.
    pub fn claim(&mut self, key: impl Into<String>, value: V) -> Claim<'_, V> {
        match self.entries.entry(key.into()) {
            Entry::Vacant(slot) => {
                slot.insert(value);
                Claim::New
            }
            Entry::Occupied(slot) => Claim::Taken(slot.into_mut()),
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &V)> {
        self.entries.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values()
    }
}

impl<V> Default for FirstWriteTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifier → path of the file that first defined it.
pub type IdentifierRegistry = FirstWriteTable<PathBuf>;

/// A value together with the file it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Sourced<V> {
    pub value: V,
    pub source: PathBuf,
}

impl<V> Sourced<V> {
    pub fn new(value: V, source: impl Into<PathBuf>) -> Self {
        Self {
            value,
            source: source.into(),
        }
    }
}

/// Language code → translation key → translated string.
#[derive(Debug, Clone, Default)]
pub struct TranslationTable {
    languages: BTreeMap<String, FirstWriteTable<Sourced<String>>>,
}

impl TranslationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a translation; the first value seen for `(language, key)` wins.
    pub fn claim(
        &mut self,
        language: &str,
        key: &str,
        value: Sourced<String>,
    ) -> Claim<'_, Sourced<String>> {
        self.languages
            .entry(language.to_string())
            .or_default()
            .claim(key, value)
    }

    /// Make sure a language shows up in `languages.json` even with no keys.
    pub fn touch_language(&mut self, language: &str) {
        self.languages.entry(language.to_string()).or_default();
    }

    pub fn get(&self, language: &str, key: &str) -> Option<&str> {
        self.languages
            .get(language)?
            .get(key)
            .map(|s| s.value.as_str())
    }

    pub fn languages(&self) -> impl Iterator<Item = &String> {
        self.languages.keys()
    }

    pub fn entries(
        &self,
    ) -> impl Iterator<Item = (&String, &FirstWriteTable<Sourced<String>>)> {
        self.languages.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}

/// Lock a table, recovering the data if another task panicked while holding it.
pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_write_wins() {
        let mut table = IdentifierRegistry::new();
        assert_eq!(table.claim("my:stone", PathBuf::from("a/stone.json")), Claim::New);
        match table.claim("my:stone", PathBuf::from("b/stone.json")) {
            Claim::Taken(original) => assert_eq!(original, &PathBuf::from("a/stone.json")),
            Claim::New => panic!("second claim should be rejected"),
        }
        assert_eq!(table.get("my:stone"), Some(&PathBuf::from("a/stone.json")));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_iteration_is_sorted() {
        let mut table = FirstWriteTable::new();
        table.claim("b", 2);
        table.claim("a", 1);
        table.claim("c", 3);
        let keys: Vec<&str> = table.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_translations_are_per_language() {
        let mut table = TranslationTable::new();
        table.claim("en_US", "item.gem", Sourced::new("Gem".to_string(), "a.lang"));
        table.claim("de_DE", "item.gem", Sourced::new("Edelstein".to_string(), "b.lang"));
        let dup = table.claim("en_US", "item.gem", Sourced::new("Jewel".to_string(), "c.lang"));
        assert!(matches!(dup, Claim::Taken(_)));

        assert_eq!(table.get("en_US", "item.gem"), Some("Gem"));
        assert_eq!(table.get("de_DE", "item.gem"), Some("Edelstein"));
        let langs: Vec<&String> = table.languages().collect();
        assert_eq!(langs, vec!["de_DE", "en_US"]);
    }
}
