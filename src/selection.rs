//! Per-item kept flags for one selection universe.

use log::debug;
use std::collections::{BTreeMap, BTreeSet};

/// Kept flag for every item of a fixed universe (all groups, or all
/// candidate channels).
///
/// The key set is fixed at construction: setters ignore names outside the
/// universe, so a result can never contain an item the loop was not given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    flags: BTreeMap<String, bool>,
}

impl SelectionState {
    /// Every item starts unselected.
    pub fn new<I, S>(universe: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            flags: universe.into_iter().map(|k| (k.into(), false)).collect(),
        }
    }

    /// Explicit starting flag per item.
    pub fn with_defaults<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = (S, bool)>,
        S: Into<String>,
    {
        Self {
            flags: items.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Seed from a previously saved kept-list.
    ///
    /// Saved names that are no longer in `universe` are dropped; new names
    /// start unselected.
    pub fn restore<I, S, P>(universe: I, saved: P) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        let mut state = Self::new(universe);
        let mut stale = 0usize;
        for name in saved {
            if !state.set(name.as_ref(), true) {
                stale += 1;
            }
        }
        debug!(
            "Restored {} saved selections ({} no longer present)",
            state.kept_count(),
            stale
        );
        state
    }

    /// Whether `name` is currently kept. Unknown names are not.
    pub fn is_kept(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    /// Set the flag for `name`. Returns false if `name` is not in the universe.
    pub fn set(&mut self, name: &str, kept: bool) -> bool {
        match self.flags.get_mut(name) {
            Some(flag) => {
                *flag = kept;
                true
            }
            None => false,
        }
    }

    /// Flip the flag for `name`, returning the new value.
    pub fn toggle(&mut self, name: &str) -> Option<bool> {
        self.flags.get_mut(name).map(|flag| {
            *flag = !*flag;
            *flag
        })
    }

    /// Set every item of the universe.
    pub fn set_all(&mut self, kept: bool) {
        for flag in self.flags.values_mut() {
            *flag = kept;
        }
    }

    /// The universe in sorted order.
    pub fn items(&self) -> impl Iterator<Item = &str> {
        self.flags.keys().map(String::as_str)
    }

    /// Number of items in the universe.
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn kept_count(&self) -> usize {
        self.flags.values().filter(|v| **v).count()
    }

    /// Consume the state, keeping only the selected names.
    pub fn into_kept(self) -> BTreeSet<String> {
        self.flags
            .into_iter()
            .filter_map(|(name, kept)| kept.then_some(name))
            .collect()
    }
}
