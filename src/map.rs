//! Ordered map type for charge maps.
//!
//! [`UcMap`] wraps an [`IndexMap`] so entries keep the order they were parsed
//! or inserted in. Order matters in URI charge: only the last entry of a map
//! may be written as a bare suffix key.
//!
//! ## Examples
//!
//! ```rust
//! use uri_charge::{Charge, UcMap};
//!
//! let mut map = UcMap::new();
//! map.insert("name".to_string(), Charge::from("Alice"));
//! map.insert("age".to_string(), Charge::from(30));
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.get("name").and_then(|v| v.as_str()), Some("Alice"));
//! ```

use crate::Charge;
use indexmap::IndexMap;
use std::collections::HashMap;

/// An ordered map of string keys to charges.
///
/// # Examples
///
/// ```rust
/// use uri_charge::{Charge, UcMap};
///
/// let mut map = UcMap::new();
/// map.insert("first".to_string(), Charge::from(1));
/// map.insert("second".to_string(), Charge::from(2));
///
/// let keys: Vec<_> = map.keys().cloned().collect();
/// assert_eq!(keys, vec!["first", "second"]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UcMap(IndexMap<String, Charge>);

impl UcMap {
    #[must_use]
    pub fn new() -> Self {
        UcMap(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        UcMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts an entry.
    ///
    /// If the key is already present its value is replaced in place and the
    /// old value returned; the entry keeps its original position.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use uri_charge::{Charge, UcMap};
    ///
    /// let mut map = UcMap::new();
    /// assert!(map.insert("key".to_string(), Charge::from(42)).is_none());
    /// assert!(map.insert("key".to_string(), Charge::from(43)).is_some());
    /// ```
    pub fn insert(&mut self, key: String, value: Charge) -> Option<Charge> {
        self.0.insert(key, value)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Charge> {
        self.0.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Removes an entry, shifting later entries to keep their order.
    pub fn remove(&mut self, key: &str) -> Option<Charge> {
        self.0.shift_remove(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the last entry, the only one that may be encoded as a suffix.
    #[must_use]
    pub fn last(&self) -> Option<(&String, &Charge)> {
        self.0.last()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Charge> {
        self.0.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, String, Charge> {
        self.0.values()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Charge> {
        self.0.iter()
    }
}

impl From<HashMap<String, Charge>> for UcMap {
    fn from(map: HashMap<String, Charge>) -> Self {
        UcMap(map.into_iter().collect())
    }
}

impl From<UcMap> for HashMap<String, Charge> {
    fn from(map: UcMap) -> Self {
        map.0.into_iter().collect()
    }
}

impl IntoIterator for UcMap {
    type Item = (String, Charge);
    type IntoIter = indexmap::map::IntoIter<String, Charge>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a UcMap {
    type Item = (&'a String, &'a Charge);
    type IntoIter = indexmap::map::Iter<'a, String, Charge>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, Charge)> for UcMap {
    fn from_iter<T: IntoIterator<Item = (String, Charge)>>(iter: T) -> Self {
        UcMap(IndexMap::from_iter(iter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replacing_keeps_position() {
        let mut map = UcMap::new();
        map.insert("a".to_string(), Charge::from(1));
        map.insert("b".to_string(), Charge::from(2));
        map.insert("a".to_string(), Charge::from(3));

        let entries: Vec<_> = map.iter().map(|(k, v)| (k.as_str(), v.clone())).collect();
        assert_eq!(
            entries,
            vec![("a", Charge::from(3)), ("b", Charge::from(2))]
        );
        assert_eq!(map.last().map(|(k, _)| k.as_str()), Some("b"));
    }

    #[test]
    fn test_remove_shifts() {
        let mut map: UcMap = vec![
            ("x".to_string(), Charge::from(1)),
            ("y".to_string(), Charge::from(2)),
            ("z".to_string(), Charge::from(3)),
        ]
        .into_iter()
        .collect();

        assert_eq!(map.remove("y"), Some(Charge::from(2)));
        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec!["x", "z"]);
    }
}
