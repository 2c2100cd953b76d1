//! Per-day exclusion list: film identity keys the user has banished for
//! the current calendar day, with LIFO undo. The persisted shape is the
//! plain `{date, ids}` structure; a stored date that doesn't match today
//! makes the whole list void.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Date-stamped, ordered list of banished identity keys.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BanishList {
    pub date: String,
    pub ids: Vec<String>,
}

impl BanishList {
    pub fn empty(date: &str) -> Self {
        Self {
            date: date.to_string(),
            ids: Vec::new(),
        }
    }

    /// Whether the list applies on the given day.
    pub fn is_current(&self, today: &str) -> bool {
        self.date == today
    }

    /// Append a key for today. A stale list is reset to an empty list
    /// dated today first. Idempotent: a key already present is not
    /// duplicated. Returns true if the list changed.
    pub fn banish(&mut self, key: String, today: &str) -> bool {
        if !self.is_current(today) {
            *self = Self::empty(today);
        }
        if self.ids.contains(&key) {
            return false;
        }
        self.ids.push(key);
        true
    }

    /// Remove and return the most recently banished key. No-op on a stale
    /// or empty list.
    pub fn undo(&mut self, today: &str) -> Option<String> {
        if !self.is_current(today) {
            return None;
        }
        self.ids.pop()
    }

    /// Keys in force today. A stale list contributes nothing.
    pub fn active_ids(&self, today: &str) -> &[String] {
        if self.is_current(today) { &self.ids } else { &[] }
    }

    pub fn active_set(&self, today: &str) -> HashSet<String> {
        self.active_ids(today).iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TODAY: &str = "2023-01-02";

    #[test]
    fn test_banish_is_idempotent() {
        let mut list = BanishList::empty(TODAY);
        assert!(list.banish("X::2000".into(), TODAY));
        assert!(!list.banish("X::2000".into(), TODAY));
        assert_eq!(list.ids, vec!["X::2000"]);
    }

    #[test]
    fn test_undo_is_lifo() {
        let mut list = BanishList::empty(TODAY);
        list.banish("A::1990".into(), TODAY);
        list.banish("B::1991".into(), TODAY);
        assert_eq!(list.undo(TODAY), Some("B::1991".to_string()));
        assert_eq!(list.ids, vec!["A::1990"]);
    }

    #[test]
    fn test_undo_on_empty_is_noop() {
        let mut list = BanishList::empty(TODAY);
        assert_eq!(list.undo(TODAY), None);
    }

    #[test]
    fn test_stale_list_reads_empty() {
        // Yesterday's list applies nothing today.
        let list = BanishList {
            date: "2023-01-01".into(),
            ids: vec!["X::2000".into()],
        };
        assert!(list.active_ids(TODAY).is_empty());
        assert!(list.active_set(TODAY).is_empty());
        assert_eq!(list.active_ids("2023-01-01"), ["X::2000"]);
    }

    #[test]
    fn test_banish_resets_stale_list() {
        let mut list = BanishList {
            date: "2023-01-01".into(),
            ids: vec!["Old::1980".into()],
        };
        list.banish("New::2020".into(), TODAY);
        assert_eq!(list.date, TODAY);
        assert_eq!(list.ids, vec!["New::2020"]);
    }

    #[test]
    fn test_undo_refuses_stale_list() {
        let mut list = BanishList {
            date: "2023-01-01".into(),
            ids: vec!["Old::1980".into()],
        };
        assert_eq!(list.undo(TODAY), None);
        assert_eq!(list.ids.len(), 1, "stale entries untouched");
    }
}
