//! Frequency distributions over catalog tracks

use crate::record::CatalogTrack;
use marquee_common::{Error, Result};
use serde::Serialize;
use std::collections::HashMap;

/// Label -> occurrence count
///
/// Absent labels read as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FrequencyMap(HashMap<String, u32>);

impl FrequencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more occurrence of `label`
    pub fn increment(&mut self, label: &str) {
        match self.0.get_mut(label) {
            Some(count) => *count += 1,
            None => {
                self.0.insert(label.to_string(), 1);
            }
        }
    }

    pub fn get(&self, label: &str) -> u32 {
        self.0.get(label).copied().unwrap_or(0)
    }

    /// Number of distinct labels
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all counts
    pub fn total(&self) -> u64 {
        self.0.values().map(|&count| u64::from(count)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(label, &count)| (label.as_str(), count))
    }

    /// Entries by descending count, ties broken by label
    pub fn ranked(&self) -> Vec<(&str, u32)> {
        let mut entries: Vec<(&str, u32)> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    /// First `n` entries of [`ranked`](Self::ranked)
    pub fn top(&self, n: usize) -> Vec<(&str, u32)> {
        let mut entries = self.ranked();
        entries.truncate(n);
        entries
    }
}

impl<'a> FromIterator<&'a str> for FrequencyMap {
    fn from_iter<I: IntoIterator<Item = &'a str>>(labels: I) -> Self {
        let mut map = FrequencyMap::new();
        for label in labels {
            map.increment(label);
        }
        map
    }
}

/// Count every (track, artist, genre) occurrence
///
/// Tracks without artists and artists without genres contribute nothing.
pub fn aggregate_genres(tracks: &[CatalogTrack]) -> FrequencyMap {
    tracks
        .iter()
        .flat_map(|track| track.artists.iter())
        .flat_map(|artist| artist.genres.iter())
        .map(String::as_str)
        .collect()
}

/// Count tracks per release year
///
/// The year label is the first four characters of the album release date.
///
/// # Errors
/// `Error::MalformedDate` if any release date is shorter than four characters.
pub fn aggregate_release_years(tracks: &[CatalogTrack]) -> Result<FrequencyMap> {
    let mut years = FrequencyMap::new();
    for track in tracks {
        years.increment(year_label(&track.album.release_date)?);
    }
    Ok(years)
}

fn year_label(release_date: &str) -> Result<&str> {
    match release_date.char_indices().nth(4) {
        Some((end, _)) => Ok(&release_date[..end]),
        None if release_date.chars().count() == 4 => Ok(release_date),
        None => Err(Error::MalformedDate(release_date.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Album, TrackArtist};

    fn track(id: &str, release_date: &str, genres: &[&[&str]]) -> CatalogTrack {
        CatalogTrack {
            id: id.to_string(),
            uri: format!("spotify:track:{}", id),
            name: id.to_string(),
            images: Vec::new(),
            popularity: 50,
            explicit: false,
            album: Album {
                release_date: release_date.to_string(),
            },
            artists: genres
                .iter()
                .map(|artist_genres| TrackArtist {
                    name: None,
                    genres: artist_genres.iter().map(|g| g.to_string()).collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_genre_example() {
        let tracks = vec![
            track("a", "2020", &[&["rock", "pop"]]),
            track("b", "2020", &[&["pop"]]),
            track("c", "2020", &[&[]]),
        ];
        let genres = aggregate_genres(&tracks);
        assert_eq!(genres.len(), 2);
        assert_eq!(genres.get("rock"), 1);
        assert_eq!(genres.get("pop"), 2);
        assert_eq!(genres.get("jazz"), 0);
    }

    #[test]
    fn test_genres_count_every_artist() {
        let tracks = vec![
            track("a", "2020", &[&["rock"], &["rock", "blues"]]),
            track("b", "2020", &[]),
        ];
        let genres = aggregate_genres(&tracks);
        assert_eq!(genres.get("rock"), 2);
        assert_eq!(genres.total(), 3);
    }

    #[test]
    fn test_genre_total_matches_triples_in_any_order() {
        let mut tracks = vec![
            track("a", "2020", &[&["rock", "pop"], &["indie"]]),
            track("b", "2021", &[&["pop"]]),
            track("c", "2022", &[&["jazz"], &[], &["pop", "soul"]]),
        ];
        let triples: usize = tracks
            .iter()
            .flat_map(|t| t.artists.iter())
            .map(|a| a.genres.len())
            .sum();

        let forward = aggregate_genres(&tracks);
        tracks.reverse();
        let backward = aggregate_genres(&tracks);

        assert_eq!(forward.total(), triples as u64);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_release_year_example() {
        let tracks = vec![
            track("a", "2020-01-01", &[]),
            track("b", "2020-06-01", &[]),
            track("c", "1999-12-31", &[]),
        ];
        let years = aggregate_release_years(&tracks).unwrap();
        assert_eq!(years.len(), 2);
        assert_eq!(years.get("2020"), 2);
        assert_eq!(years.get("1999"), 1);
        assert_eq!(years.total(), tracks.len() as u64);
    }

    #[test]
    fn test_year_only_dates_are_accepted() {
        let years = aggregate_release_years(&[track("a", "1987", &[])]).unwrap();
        assert_eq!(years.get("1987"), 1);
    }

    #[test]
    fn test_short_release_date_is_malformed() {
        let tracks = vec![track("a", "2020-01-01", &[]), track("b", "99", &[])];
        match aggregate_release_years(&tracks) {
            Err(Error::MalformedDate(date)) => assert_eq!(date, "99"),
            other => panic!("expected MalformedDate, got {:?}", other),
        }
    }

    #[test]
    fn test_ranked_orders_by_count_then_label() {
        let map: FrequencyMap = ["pop", "rock", "pop", "ambient", "rock", "pop"]
            .into_iter()
            .collect();
        assert_eq!(map.ranked(), vec![("pop", 3), ("rock", 2), ("ambient", 1)]);
        assert_eq!(map.top(1), vec![("pop", 3)]);
    }
}
