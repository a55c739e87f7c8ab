//! Bounded cache of quoted literals.

use std::collections::{HashMap, VecDeque};

/// Maps a raw literal to its quoted form, evicting the oldest entry once
/// `capacity` is reached. Literals longer than `max_len` are never stored.
#[derive(Debug)]
pub(crate) struct LiteralCache {
    capacity: usize,
    max_len: usize,
    map: HashMap<String, String>,
    order: VecDeque<String>,
}

impl LiteralCache {
    pub(crate) fn new(capacity: usize, max_len: usize) -> Self {
        Self {
            capacity,
            max_len,
            map: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    pub(crate) const fn accepts(&self, literal: &str) -> bool {
        self.capacity > 0 && literal.len() <= self.max_len
    }

    pub(crate) fn get(&self, literal: &str) -> Option<&str> {
        self.map.get(literal).map(String::as_str)
    }

    pub(crate) fn insert(&mut self, literal: String, quoted: String) {
        if !self.accepts(&literal) || self.map.contains_key(&literal) {
            return;
        }
        self.map.insert(literal.clone(), quoted);
        self.order.push_back(literal);
        while self.map.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.map.remove(&oldest);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evicts_oldest() {
        let mut cache = LiteralCache::new(2, 250);
        cache.insert(String::from("a"), String::from("'a'"));
        cache.insert(String::from("b"), String::from("'b'"));
        cache.insert(String::from("c"), String::from("'c'"));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("c"), Some("'c'"));
    }

    #[test]
    fn test_skips_long_literals() {
        let mut cache = LiteralCache::new(8, 3);
        cache.insert(String::from("long"), String::from("'long'"));
        assert_eq!(cache.get("long"), None);
        assert!(!cache.accepts("long"));
        assert!(cache.accepts("abc"));
    }

    #[test]
    fn test_zero_capacity_disables() {
        let mut cache = LiteralCache::new(0, 250);
        cache.insert(String::from("a"), String::from("'a'"));
        assert_eq!(cache.len(), 0);
    }
}
