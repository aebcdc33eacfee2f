//! Gallery view: search, sort and card rendering
//!
//! The view is a pure function of the store's entries plus its own query and
//! sort key. It never mutates the store.

use clap::ValueEnum;
use std::cmp::Ordering;
use std::io::{self, Write};

use crate::constants::view::{DEFAULT_THUMB_ALT, EMPTY_MESSAGE, PLACEHOLDER_THUMB};
use crate::types::ManifestEntry;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    /// Manifest order
    #[default]
    Document,
    /// Title, case-insensitive
    Title,
}

/// What one grid cell shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    /// Position in the manifest, stable across search/sort
    pub index: usize,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub thumb_alt: String,
    /// file, else embed, else empty (inert card)
    pub target: String,
}

impl Card {
    fn from_entry(index: usize, entry: &ManifestEntry) -> Self {
        Self {
            index,
            title: entry.display_title().to_string(),
            description: entry.description().to_string(),
            thumbnail: entry.thumbnail().unwrap_or(PLACEHOLDER_THUMB).to_string(),
            thumb_alt: entry
                .title
                .as_deref()
                .filter(|t| !t.is_empty())
                .unwrap_or(DEFAULT_THUMB_ALT)
                .to_string(),
            target: entry.playable_target().unwrap_or("").to_string(),
        }
    }
}

fn compare_titles(a: &ManifestEntry, b: &ManifestEntry) -> Ordering {
    let a = a.title.as_deref().unwrap_or("");
    let b = b.title.as_deref().unwrap_or("");
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

#[derive(Debug, Clone, Default)]
pub struct GalleryView {
    query: String,
    sort: SortKey,
}

impl GalleryView {
    pub fn new(query: impl Into<String>, sort: SortKey) -> Self {
        Self {
            query: query.into(),
            sort,
        }
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.sort = sort;
    }

    /// Sort, then filter by the trimmed, lowercased query
    pub fn cards(&self, entries: &[ManifestEntry]) -> Vec<Card> {
        let mut list: Vec<(usize, &ManifestEntry)> = entries.iter().enumerate().collect();
        if self.sort == SortKey::Title {
            // stable, ties keep manifest order
            list.sort_by(|(_, a), (_, b)| compare_titles(a, b));
        }

        let query = self.query.trim().to_lowercase();
        list.into_iter()
            .filter(|(_, entry)| query.is_empty() || entry.search_haystack().contains(&query))
            .map(|(index, entry)| Card::from_entry(index, entry))
            .collect()
    }

    /// Write the grid; returns the number of cards shown
    pub fn render<W: Write>(&self, out: &mut W, entries: &[ManifestEntry]) -> io::Result<usize> {
        let cards = self.cards(entries);
        if cards.is_empty() {
            render_empty(out)?;
            return Ok(0);
        }

        for card in &cards {
            write!(out, "[{}] {}", card.index, card.title)?;
            if !card.description.is_empty() {
                write!(out, " - {}", card.description)?;
            }
            if card.target.is_empty() {
                writeln!(out, "  (not playable)")?;
            } else {
                writeln!(out, "  <{}>", card.target)?;
            }
            if card.thumbnail != PLACEHOLDER_THUMB {
                writeln!(out, "    thumb: {} ({})", card.thumbnail, card.thumb_alt)?;
            }
        }
        out.flush()?;
        Ok(cards.len())
    }
}

pub fn render_empty<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{EMPTY_MESSAGE}")?;
    out.flush()
}
