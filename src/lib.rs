//! An interactive curator for IPTV M3U playlists.
//!
//! playlist-selector loads a playlist from disk or over HTTP, groups its
//! channels, and lets the user pick which groups and then which channels to
//! keep through a paginated, line-based selector. The choice is saved next
//! to the playlist so the next run starts where the last one ended, and can
//! be handed to an external generator that writes the trimmed playlist.
//!
//! # Usage
//!
//! ```bash
//! # Use the first playlist found in the current directory
//! cargo run
//!
//! # Use a remote playlist and skip the generator
//! cargo run -- http://example.com/tv.m3u --no-generate
//! ```

pub mod config;
pub mod error;
pub mod generator;
pub mod parser;
pub mod selection;
pub mod selector;
pub mod session;
pub mod source;
pub mod store;
pub mod types;
pub mod ui;
pub mod view;
