//! Manifest data types

use serde::{Deserialize, Serialize};

/// One video in the manifest
/// Every field is optional; unknown fields in the JSON are ignored
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Local or direct video file URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Embedded player URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
}

/// Treat `""` like a missing field, same as a falsy check in the manifest's producers
fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

impl ManifestEntry {
    /// Title shown on the card and in the player
    /// Falls back to file, then embed, then empty
    pub fn display_title(&self) -> &str {
        present(&self.title)
            .or_else(|| present(&self.file))
            .or_else(|| present(&self.embed))
            .unwrap_or("")
    }

    pub fn description(&self) -> &str {
        present(&self.description).unwrap_or("")
    }

    /// thumb, else poster
    pub fn thumbnail(&self) -> Option<&str> {
        present(&self.thumb).or_else(|| present(&self.poster))
    }

    /// Target used by the card and the download action: file, else embed
    pub fn playable_target(&self) -> Option<&str> {
        present(&self.file).or_else(|| present(&self.embed))
    }

    /// Lowercased "title description" used by search
    pub fn search_haystack(&self) -> String {
        format!("{} {}", present(&self.title).unwrap_or(""), self.description()).to_lowercase()
    }
}

/// Parse a manifest document (a JSON array of entries)
pub fn parse_manifest(text: &str) -> serde_json::Result<Vec<ManifestEntry>> {
    serde_json::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: Option<&str>, file: Option<&str>, embed: Option<&str>) -> ManifestEntry {
        ManifestEntry {
            title: title.map(str::to_string),
            file: file.map(str::to_string),
            embed: embed.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_display_title_fallback_chain() {
        assert_eq!(entry(Some("A"), Some("a.mp4"), None).display_title(), "A");
        assert_eq!(entry(None, Some("a.mp4"), Some("https://e/1")).display_title(), "a.mp4");
        assert_eq!(entry(None, None, Some("https://e/1")).display_title(), "https://e/1");
        assert_eq!(entry(None, None, None).display_title(), "");
        // Empty title counts as missing
        assert_eq!(entry(Some(""), Some("a.mp4"), None).display_title(), "a.mp4");
    }

    #[test]
    fn test_thumbnail_prefers_thumb_over_poster() {
        let mut e = ManifestEntry {
            thumb: Some("t.jpg".into()),
            poster: Some("p.jpg".into()),
            ..Default::default()
        };
        assert_eq!(e.thumbnail(), Some("t.jpg"));
        e.thumb = None;
        assert_eq!(e.thumbnail(), Some("p.jpg"));
        e.poster = None;
        assert_eq!(e.thumbnail(), None);
    }

    #[test]
    fn test_playable_target_prefers_file() {
        assert_eq!(entry(None, Some("a.mp4"), Some("https://e/1")).playable_target(), Some("a.mp4"));
        assert_eq!(entry(None, None, Some("https://e/1")).playable_target(), Some("https://e/1"));
        assert_eq!(entry(Some("inert"), None, None).playable_target(), None);
    }

    #[test]
    fn test_search_haystack_lowercases_title_and_description() {
        let e = ManifestEntry {
            title: Some("Cats".into()),
            description: Some("Funny CLIPS".into()),
            ..Default::default()
        };
        assert_eq!(e.search_haystack(), "cats funny clips");
        assert_eq!(ManifestEntry::default().search_haystack(), " ");
    }

    #[test]
    fn test_parse_manifest_ignores_unknown_fields() {
        let entries = parse_manifest(r#"[{"title":"A","file":"a.mp4","duration":12},{}]"#).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title.as_deref(), Some("A"));
        assert_eq!(entries[1], ManifestEntry::default());
    }

    #[test]
    fn test_parse_manifest_rejects_non_array() {
        assert!(parse_manifest(r#"{"title":"A"}"#).is_err());
        assert!(parse_manifest("not json").is_err());
    }
}
