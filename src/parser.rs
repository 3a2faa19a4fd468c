//! M3U playlist parsing.
//!
//! Only `#EXTINF` entries are read. An entry becomes a channel once it has a
//! stream URL, either on the `#EXTINF` line itself or on the next resource
//! line. Entries that never get one are dropped.

use crate::error::Result;
use crate::types::{Channel, Playlist, UNGROUPED};
use log::{debug, info};
use regex::{Regex, RegexBuilder};

const EXTINF: &str = "#EXTINF:";
const EXTGRP: &str = "#EXTGRP:";

/// Case-insensitive keyword matcher for the default "blocked" flag.
#[derive(Debug, Clone)]
pub struct BlockList {
    pattern: Option<Regex>,
}

impl BlockList {
    /// Build a matcher from plain keywords. Empty keywords are ignored.
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Result<Self> {
        let alternation = keywords
            .iter()
            .map(|k| k.as_ref().trim())
            .filter(|k| !k.is_empty())
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("|");

        if alternation.is_empty() {
            return Ok(Self { pattern: None });
        }

        let pattern = RegexBuilder::new(&alternation)
            .case_insensitive(true)
            .build()?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    /// Whether `name` contains any keyword.
    pub fn is_blocked(&self, name: &str) -> bool {
        self.pattern
            .as_ref()
            .map(|p| p.is_match(name))
            .unwrap_or(false)
    }
}

/// The parts of an `#EXTINF` line we care about.
#[derive(Debug, PartialEq)]
struct EntryHeader {
    name: String,
    group: Option<String>,
    inline_url: Option<String>,
}

/// Parse playlist text into channels and groups.
///
/// Never fails: unreadable entries are skipped and an empty or foreign file
/// yields an empty [`Playlist`].
pub fn parse_playlist(text: &str, blocklist: &BlockList) -> Playlist {
    let attr_re = Regex::new(r#"([A-Za-z0-9_-]+)="([^"]*)""#).unwrap();

    let mut playlist = Playlist::default();
    let mut pending: Option<EntryHeader> = None;
    let mut extgrp: Option<String> = None;
    let mut dropped = 0usize;

    for raw in text.lines() {
        let line = raw.trim_start_matches('\u{feff}').trim();
        if line.is_empty() {
            continue;
        }

        if let Some(info) = line.strip_prefix(EXTINF) {
            if let Some(stale) = pending.take() {
                debug!("Dropping '{}': no stream line before next entry", stale.name);
                dropped += 1;
            }
            extgrp = None;

            match parse_header(info, &attr_re) {
                Some(mut header) => match header.inline_url.take() {
                    Some(url) => emit(&mut playlist, header, None, url, blocklist),
                    None => pending = Some(header),
                },
                None => debug!("Skipping entry without a name: {}", line),
            }
            continue;
        }

        if let Some(group) = line.strip_prefix(EXTGRP) {
            if pending.is_some() {
                extgrp = non_empty(group);
            }
            continue;
        }

        if line.starts_with('#') {
            continue;
        }

        if let Some(header) = pending.take() {
            emit(&mut playlist, header, extgrp.take(), line.to_string(), blocklist);
        }
    }

    if let Some(stale) = pending {
        debug!("Dropping '{}': playlist ended before its stream line", stale.name);
        dropped += 1;
    }

    info!(
        "Parsed {} groups, {} channels ({} blocked, {} incomplete entries dropped)",
        playlist.groups.len(),
        playlist.channels.len(),
        playlist.blocked_count(),
        dropped
    );

    playlist
}

fn emit(
    playlist: &mut Playlist,
    header: EntryHeader,
    extgrp: Option<String>,
    url: String,
    blocklist: &BlockList,
) {
    let group = header
        .group
        .or(extgrp)
        .unwrap_or_else(|| UNGROUPED.to_string());
    let blocked = blocklist.is_blocked(&header.name);

    playlist.insert(
        header.name,
        Channel {
            group,
            blocked,
            kept: false,
            url,
        },
    );
}

/// Read name, group and an optional inline URL from the text after `#EXTINF:`.
fn parse_header(info: &str, attr_re: &Regex) -> Option<EntryHeader> {
    let (attributes, title) = split_title(info).unwrap_or((info, ""));

    let mut group = None;
    let mut tvg_name = None;
    for caps in attr_re.captures_iter(attributes) {
        match &caps[1] {
            "group-title" => group = non_empty(&caps[2]),
            "tvg-name" => tvg_name = non_empty(&caps[2]),
            _ => {}
        }
    }

    let title = title.trim();
    let (title, inline_url) = match title.rsplit_once(char::is_whitespace) {
        Some((head, tail)) if tail.contains("://") && !head.trim().is_empty() => {
            (head.trim(), Some(tail.to_string()))
        }
        _ => (title, None),
    };

    let name = tvg_name.or_else(|| non_empty(title))?;
    Some(EntryHeader {
        name,
        group,
        inline_url,
    })
}

/// Split at the first comma that is not inside a quoted attribute value.
fn split_title(info: &str) -> Option<(&str, &str)> {
    let mut in_quotes = false;
    for (i, c) in info.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => return Some((&info[..i], &info[i + 1..])),
            _ => {}
        }
    }
    None
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
