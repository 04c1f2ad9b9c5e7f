//! marquee-library - saved library browsing
//!
//! Streams library entries page by page from the host content source:
//! - `source`: content-source collaborator contract
//! - `page`: page values and next-offset rule
//! - `cache`: per-(key, offset) page cache with in-flight de-duplication
//! - `fetcher`: PaginatedFetcher
//! - `feed`: infinite-query state for one page of the UI
//! - `artists`: saved-artist items, sort options and card projection

pub mod artists;
pub mod cache;
pub mod feed;
pub mod fetcher;
pub mod page;
pub mod source;

pub use artists::{ArtistCard, Image, LibraryItem, SortOption};
pub use feed::{FetchOutcome, LibraryFeed, LibraryView};
pub use fetcher::PaginatedFetcher;
pub use page::Page;
pub use source::{ContentRequest, ContentResponse, ContentSource};
