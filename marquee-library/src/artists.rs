//! Saved artists: items, sort options and card projection

use serde::{Deserialize, Serialize};
use std::fmt;

/// Query name for the saved artists series
pub const ARTISTS_QUERY: &str = "library:artists";

/// Content-source filter id selecting artists
pub const ARTISTS_FILTER: &str = "1";

/// Artwork reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
}

/// One saved library entry as returned by the content source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryItem {
    pub uri: String,
    pub name: String,
    /// Largest first; may be missing entirely
    #[serde(default)]
    pub images: Vec<Image>,
}

/// Sort options offered for saved artists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortOption {
    Name,
    DateAdded,
}

impl SortOption {
    pub const ALL: [SortOption; 2] = [SortOption::Name, SortOption::DateAdded];

    /// Content-source sort id
    pub fn id(self) -> &'static str {
        match self {
            SortOption::Name => "0",
            SortOption::DateAdded => "1",
        }
    }

    /// Human label for the dropdown
    pub fn label(self) -> &'static str {
        match self {
            SortOption::Name => "Name",
            SortOption::DateAdded => "Date Added",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|option| option.id() == id)
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Card shown for one saved artist
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistCard {
    pub uri: String,
    pub header: String,
    pub subheader: String,
    /// First image url, empty when the artist has none
    pub image_url: String,
}

impl From<&LibraryItem> for ArtistCard {
    fn from(item: &LibraryItem) -> Self {
        Self {
            uri: item.uri.clone(),
            header: item.name.clone(),
            subheader: "Artist".to_string(),
            image_url: item
                .images
                .first()
                .map(|image| image.url.clone())
                .unwrap_or_default(),
        }
    }
}

/// Project library items onto cards, keeping order
pub fn artist_cards(items: &[LibraryItem]) -> Vec<ArtistCard> {
    items.iter().map(ArtistCard::from).collect()
}
