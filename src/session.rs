//! Session orchestration: from playlist text to a saved selection.
//!
//! A session parses the playlist, restores the previous choice for the same
//! file, runs the group selector and then the channel selector over the
//! channels of the kept groups, and saves the result.

use crate::config::Settings;
use crate::error::{AppError, Result};
use crate::parser::{parse_playlist, BlockList};
use crate::selection::SelectionState;
use crate::selector::{self, Selector, SelectorKind};
use crate::source::{self, Acquired, PlaylistSource};
use crate::store::{self, PersistedConfig, SessionPaths};
use crate::types::Channel;
use crate::ui;
use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The group selector returned nothing; nothing was saved.
    NoGroupsKept,
    /// The selection was written to `config_path`.
    Saved {
        config_path: PathBuf,
        config: PersistedConfig,
    },
}

/// An interactive session reading commands from `input` and writing pages
/// to `output`.
pub struct Session<'a, R, W> {
    settings: &'a Settings,
    input: R,
    output: W,
    color: bool,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    pub fn new(settings: &'a Settings, input: R, output: W) -> Self {
        Self {
            settings,
            input,
            output,
            color: false,
        }
    }

    /// Style checkboxes and messages.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Decide which playlist to use.
    ///
    /// An explicit argument wins; otherwise the playlist directory is
    /// searched, and if that finds nothing the user is asked. A URL typed
    /// at the prompt must answer before it is accepted.
    pub async fn resolve_source(&mut self, arg: Option<&str>) -> Result<PlaylistSource> {
        if let Some(arg) = arg {
            return PlaylistSource::parse(arg);
        }

        let dir = Path::new(&self.settings.playlist_dir);
        if let Some(path) = source::discover_playlist(dir)? {
            writeln!(self.output, "Using playlist {}", path.display())?;
            return Ok(PlaylistSource::Local(path));
        }

        writeln!(
            self.output,
            "No playlist found in {}. Enter a file path or an http(s) URL.",
            dir.display()
        )?;
        loop {
            let answer = ui::prompt_with_retry(&mut self.input, &mut self.output, "Playlist: ", |value| {
                PlaylistSource::parse(value)
                    .map(|s| s.is_plausible())
                    .unwrap_or(false)
            })?;
            let Some(value) = answer else {
                return Err(AppError::Acquisition("No playlist given".to_string()));
            };

            let source = PlaylistSource::parse(&value)?;
            if let PlaylistSource::Remote(url) = &source {
                if let Err(e) = source::check_remote(url, self.settings).await {
                    debug!("Rejected {}: {}", url, e);
                    writeln!(self.output, "Invalid input. Try again.")?;
                    continue;
                }
            }
            return Ok(source);
        }
    }

    /// Offer to reuse the saved config instead of selecting again.
    ///
    /// Returns the saved config if the user accepts and it loads.
    pub fn offer_resume(&mut self, paths: &SessionPaths) -> Result<Option<PersistedConfig>> {
        if !paths.config.is_file() {
            return Ok(None);
        }

        writeln!(self.output, "\nFound saved session:")?;
        writeln!(self.output, "  Config: {}", file_name(&paths.config))?;
        let groups = if paths.groups.is_file() {
            file_name(&paths.groups)
        } else {
            "none".to_string()
        };
        writeln!(self.output, "  Groups: {}", groups)?;

        if !ui::confirm(&mut self.input, &mut self.output, "Reload saved session?")? {
            return Ok(None);
        }

        match store::load_config(&paths.config) {
            Some(config) => {
                writeln!(self.output, "Reloaded saved config!")?;
                Ok(Some(config))
            }
            None => {
                writeln!(self.output, "Failed to load saved config. Starting fresh...")?;
                Ok(None)
            }
        }
    }

    /// Parse, select and save.
    pub fn run(&mut self, acquired: &Acquired) -> Result<SessionOutcome> {
        let blocklist = BlockList::new(&self.settings.blocked_keywords)?;
        let mut playlist = parse_playlist(&acquired.text, &blocklist);
        if playlist.is_empty() {
            warn!("No channels found in {}", acquired.path.display());
        }
        writeln!(
            self.output,
            "Found {} groups, {} channels.",
            playlist.groups.len(),
            playlist.channels.len()
        )?;
        writeln!(
            self.output,
            "{} channels match blocked keywords and start unselected.",
            playlist.blocked_count()
        )?;

        let paths = SessionPaths::for_playlist(&acquired.path);
        let prior = store::load_config(&paths.config);

        let saved_groups =
            store::load_groups(&paths.groups).or_else(|| prior.as_ref().map(|c| c.groups.clone()));
        let group_state = match &saved_groups {
            Some(saved) => {
                let state = SelectionState::restore(playlist.group_names(), saved);
                writeln!(
                    self.output,
                    "Restored {} of {} saved groups.",
                    state.kept_count(),
                    saved.len()
                )?;
                state
            }
            None => SelectionState::new(playlist.group_names()),
        };

        writeln!(self.output, "\nSelect GROUPS to KEEP")?;
        let kept_groups = self.select(SelectorKind::Groups, group_state)?;
        store::save_groups(&paths.groups, &kept_groups)?;

        if kept_groups.is_empty() {
            writeln!(self.output, "No groups selected. Nothing to save.")?;
            info!("Session ended without groups");
            return Ok(SessionOutcome::NoGroupsKept);
        }

        let candidates = playlist.candidates(&kept_groups);
        writeln!(
            self.output,
            "\nFiltered to {} channels in {} groups.",
            candidates.len(),
            kept_groups.len()
        )?;

        let channel_state = match &prior {
            Some(prior) => SelectionState::restore(candidates.iter().cloned(), &prior.include_channels),
            None => SelectionState::with_defaults(
                candidates
                    .iter()
                    .map(|name| (name.clone(), self.default_kept(&playlist.channels[name]))),
            ),
        };

        writeln!(self.output, "Select CHANNELS to KEEP")?;
        let kept_channels = self.select(SelectorKind::Channels, channel_state)?;
        playlist.apply_channel_selection(&kept_channels);

        let include: BTreeSet<String> = playlist
            .channels
            .iter()
            .filter(|(_, channel)| channel.kept)
            .map(|(name, _)| name.clone())
            .collect();

        let mut config = PersistedConfig::from_selection(
            &acquired.source.to_string(),
            &kept_groups,
            &candidates,
            &include,
        );
        if let Some(generator) = &self.settings.generator {
            config.output_directory = Some(generator.work_dir.clone());
        }

        store::save_config(&paths.config, &config)?;
        writeln!(
            self.output,
            "Saved {} channels ({} discarded) to {}",
            config.include_channels.len(),
            config.discard_channels.len(),
            paths.config.display()
        )?;

        Ok(SessionOutcome::Saved {
            config_path: paths.config,
            config,
        })
    }

    fn default_kept(&self, channel: &Channel) -> bool {
        channel.kept || (self.settings.preselect_unblocked && !channel.blocked)
    }

    fn select(&mut self, kind: SelectorKind, state: SelectionState) -> Result<BTreeSet<String>> {
        if state.is_empty() {
            warn!("No {} to select from", kind.noun());
        }
        let selector = Selector::new(kind, state, self.settings.page_size(kind));
        let opts = self.settings.view_options(kind, self.color);
        Ok(selector::run(selector, &opts, &mut self.input, &mut self.output)?)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
