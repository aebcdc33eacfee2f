//! Playback resolution for a selected entry
//!
//! Embedded players take priority over direct files. An entry with neither
//! cannot be played and never opens the player.

use std::fmt;
use tracing::{debug, info};

use crate::constants::player::EMBED_ALLOW;
use crate::types::ManifestEntry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Media {
    Embed { url: String, allow: &'static str },
    File { src: String, poster: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playback {
    pub heading: String,
    pub body: String,
    pub media: Media,
    /// Opened by the download action: file, else embed
    pub download: Option<String>,
}

impl Playback {
    pub fn resolve(entry: &ManifestEntry) -> Option<Self> {
        let media = if let Some(url) = entry.embed.as_deref().filter(|s| !s.is_empty()) {
            Media::Embed {
                url: url.to_string(),
                allow: EMBED_ALLOW,
            }
        } else {
            let src = entry.file.as_deref().filter(|s| !s.is_empty())?;
            // posters for direct files only come from `thumb`
            Media::File {
                src: src.to_string(),
                poster: entry.thumb.clone().filter(|s| !s.is_empty()),
            }
        };

        Some(Self {
            heading: entry.display_title().to_string(),
            body: entry.description().to_string(),
            media,
            download: entry.playable_target().map(str::to_string),
        })
    }
}

impl fmt::Display for Playback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Now playing: {}", self.heading)?;
        match &self.media {
            Media::Embed { url, allow } => {
                writeln!(f, "  embed:  {url}")?;
                writeln!(f, "  allow:  {allow}")?;
            }
            Media::File { src, poster } => {
                writeln!(f, "  file:   {src}")?;
                if let Some(poster) = poster {
                    writeln!(f, "  poster: {poster}")?;
                }
            }
        }
        if !self.body.is_empty() {
            writeln!(f, "  {}", self.body)?;
        }
        if let Some(download) = &self.download {
            writeln!(f, "  download: {download}")?;
        }
        Ok(())
    }
}

/// At most one open playback at a time
#[derive(Debug, Default)]
pub struct Player {
    current: Option<Playback>,
}

impl Player {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `entry`, replacing whatever was playing
    /// Returns `None` (and leaves the player untouched) for inert entries
    pub fn open(&mut self, entry: &ManifestEntry) -> Option<&Playback> {
        let Some(playback) = Playback::resolve(entry) else {
            debug!(title = %entry.display_title(), "Entry has no playable target");
            return None;
        };
        if let Some(previous) = self.current.take() {
            debug!(heading = %previous.heading, "Replacing open playback");
        }
        info!(heading = %playback.heading, "Opening player");
        self.current = Some(playback);
        self.current.as_ref()
    }

    pub fn close(&mut self) -> Option<Playback> {
        let closed = self.current.take();
        if let Some(playback) = &closed {
            info!(heading = %playback.heading, "Closing player");
        }
        closed
    }

    pub fn current(&self) -> Option<&Playback> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(file: Option<&str>, embed: Option<&str>) -> ManifestEntry {
        ManifestEntry {
            title: Some("Clip".into()),
            description: Some("A clip".into()),
            file: file.map(str::to_string),
            embed: embed.map(str::to_string),
            thumb: Some("t.jpg".into()),
            poster: Some("p.jpg".into()),
        }
    }

    #[test]
    fn test_embed_beats_file() {
        let playback = Playback::resolve(&entry(Some("a.mp4"), Some("https://player/1"))).unwrap();
        assert_eq!(
            playback.media,
            Media::Embed {
                url: "https://player/1".into(),
                allow: EMBED_ALLOW,
            }
        );
        // Download still prefers the file
        assert_eq!(playback.download.as_deref(), Some("a.mp4"));
    }

    #[test]
    fn test_file_playback_uses_thumb_as_poster() {
        let playback = Playback::resolve(&entry(Some("a.mp4"), None)).unwrap();
        assert_eq!(
            playback.media,
            Media::File {
                src: "a.mp4".into(),
                poster: Some("t.jpg".into()),
            }
        );
        assert_eq!(playback.heading, "Clip");
        assert_eq!(playback.body, "A clip");
    }

    #[test]
    fn test_inert_entry_does_not_resolve() {
        assert!(Playback::resolve(&entry(None, None)).is_none());
        assert!(Playback::resolve(&entry(Some(""), Some(""))).is_none());
    }

    #[test]
    fn test_player_open_replace_close() {
        let mut player = Player::new();
        assert!(player.open(&entry(Some("a.mp4"), None)).is_some());
        assert!(player.open(&entry(None, Some("https://player/2"))).is_some());
        assert!(matches!(player.current().unwrap().media, Media::Embed { .. }));

        // Inert entry leaves the open playback alone
        assert!(player.open(&entry(None, None)).is_none());
        assert!(player.current().is_some());

        assert!(player.close().is_some());
        assert!(player.current().is_none());
        assert!(player.close().is_none());
    }

    #[test]
    fn test_display() {
        let text = Playback::resolve(&entry(Some("a.mp4"), None)).unwrap().to_string();
        assert!(text.starts_with("Now playing: Clip\n"));
        assert!(text.contains("file:   a.mp4"));
        assert!(text.contains("download: a.mp4"));
    }
}
