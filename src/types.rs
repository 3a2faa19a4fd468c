//! Type definitions for playlist-selector.
//!
//! A [`Playlist`] holds every parsed [`Channel`] keyed by display name, plus
//! the group index derived from those channels. Both maps are sorted, which is
//! the order the selectors page through.

use std::collections::{BTreeMap, BTreeSet};

/// Label used for channels without a group.
pub const UNGROUPED: &str = "No Group";

/// A single playlist entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Channel {
    /// Label of the group the channel belongs to.
    pub group: String,
    /// Name matched a blocked keyword when parsed.
    pub blocked: bool,
    /// Whether the channel survives into the saved selection.
    pub kept: bool,
    /// Stream URL the entry was matched with.
    pub url: String,
}

/// Parsed playlist: channels by name and channel names by group.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Playlist {
    pub groups: BTreeMap<String, BTreeSet<String>>,
    pub channels: BTreeMap<String, Channel>,
}

impl Playlist {
    /// Add or replace a channel, keeping the group index consistent.
    ///
    /// A name seen again moves to the new group; a group left without
    /// channels is removed.
    pub fn insert(&mut self, name: String, channel: Channel) {
        if let Some(previous) = self.channels.get(&name) {
            if previous.group != channel.group {
                let old_group = previous.group.clone();
                if let Some(members) = self.groups.get_mut(&old_group) {
                    members.remove(&name);
                    if members.is_empty() {
                        self.groups.remove(&old_group);
                    }
                }
            }
        }

        self.groups
            .entry(channel.group.clone())
            .or_default()
            .insert(name.clone());
        self.channels.insert(name, channel);
    }

    /// Group labels in sorted order.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Names of channels whose group is in `kept_groups`, sorted.
    pub fn candidates(&self, kept_groups: &BTreeSet<String>) -> BTreeSet<String> {
        self.channels
            .iter()
            .filter(|(_, channel)| kept_groups.contains(&channel.group))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Number of channels flagged as blocked.
    pub fn blocked_count(&self) -> usize {
        self.channels.values().filter(|c| c.blocked).count()
    }

    /// Copy a selection result onto the channel records.
    ///
    /// Channels named in `kept` are marked kept, every other channel is not.
    pub fn apply_channel_selection(&mut self, kept: &BTreeSet<String>) {
        for (name, channel) in self.channels.iter_mut() {
            channel.kept = kept.contains(name);
        }
    }

    /// Whether nothing was parsed.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
