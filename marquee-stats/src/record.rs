//! Record classification
//!
//! Ranked tracks arrive from two sources. Catalog tracks carry the enrichment
//! fields (popularity, explicit flag, album, artist genres); external tracks
//! only carry an id and a name. Aggregation code takes `&[CatalogTrack]`, so
//! it cannot be handed an external record.

use marquee_common::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Unvalidated record as delivered by the ranking collaborator
pub type RawRecord = Value;

/// Fields whose presence marks a catalog record
const CATALOG_FIELDS: [&str; 6] = ["uri", "images", "popularity", "explicit", "album", "artists"];

/// Artwork reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    /// ISO date (`2020-01-01`) or year only (`2020`)
    pub release_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackArtist {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub genres: BTreeSet<String>,
}

/// Enrichment-eligible track from the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogTrack {
    pub id: String,
    pub uri: String,
    pub name: String,
    pub images: Vec<Image>,
    /// 0..=100
    pub popularity: u8,
    pub explicit: bool,
    pub album: Album,
    pub artists: Vec<TrackArtist>,
}

/// Track known only by id and name (scrobble history)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalTrack {
    pub id: String,
    pub name: String,
}

/// Ranked track tagged by source variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum Record {
    Catalog(CatalogTrack),
    External(ExternalTrack),
}

impl Record {
    pub fn id(&self) -> &str {
        match self {
            Record::Catalog(track) => &track.id,
            Record::External(track) => &track.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Record::Catalog(track) => &track.name,
            Record::External(track) => &track.name,
        }
    }

    pub fn variant(&self) -> &'static str {
        match self {
            Record::Catalog(_) => "catalog",
            Record::External(_) => "external",
        }
    }

    pub fn as_catalog(&self) -> Option<&CatalogTrack> {
        match self {
            Record::Catalog(track) => Some(track),
            Record::External(_) => None,
        }
    }
}

/// Tag a raw record with its source variant
///
/// An explicit `type` tag decides the variant (`spotify`/`catalog` or
/// `lastfm`/`external`). Untagged records are external only when none of the
/// catalog fields are present, catalog when all of them are.
///
/// # Errors
/// `Error::MalformedRecord` for non-objects, unknown tags, a partial set of
/// catalog fields, or fields of the wrong type.
pub fn classify(raw: &RawRecord) -> Result<Record> {
    let object = raw
        .as_object()
        .ok_or_else(|| Error::MalformedRecord(format!("expected an object, got {}", raw)))?;

    let tag = match object.get("type") {
        None => None,
        Some(Value::String(tag)) => Some(tag.as_str()),
        Some(other) => {
            return Err(Error::MalformedRecord(format!(
                "record type tag must be a string, got {}",
                other
            )))
        }
    };

    match tag {
        Some("spotify") | Some("catalog") => parse_catalog(raw),
        Some("lastfm") | Some("external") => parse_external(raw),
        Some(other) => Err(Error::MalformedRecord(format!(
            "unknown record type {:?}",
            other
        ))),
        None => {
            let present: Vec<&str> = CATALOG_FIELDS
                .iter()
                .copied()
                .filter(|field| object.contains_key(*field))
                .collect();
            if present.is_empty() {
                parse_external(raw)
            } else if present.len() == CATALOG_FIELDS.len() {
                parse_catalog(raw)
            } else {
                Err(Error::MalformedRecord(format!(
                    "partial catalog record, only has {:?}",
                    present
                )))
            }
        }
    }
}

/// Classify a batch, failing on the first malformed record
pub fn classify_all(raws: &[RawRecord]) -> Result<Vec<Record>> {
    raws.iter().map(classify).collect()
}

/// Keep catalog tracks in their original order, drop everything else
pub fn filter_catalog(records: impl IntoIterator<Item = Record>) -> Vec<CatalogTrack> {
    records
        .into_iter()
        .filter_map(|record| match record {
            Record::Catalog(track) => Some(track),
            Record::External(_) => None,
        })
        .collect()
}

fn parse_catalog(raw: &RawRecord) -> Result<Record> {
    let track: CatalogTrack = serde_json::from_value(raw.clone())
        .map_err(|e| Error::MalformedRecord(format!("invalid catalog record: {}", e)))?;
    if track.popularity > 100 {
        return Err(Error::MalformedRecord(format!(
            "popularity {} out of range for {}",
            track.popularity, track.id
        )));
    }
    Ok(Record::Catalog(track))
}

fn parse_external(raw: &RawRecord) -> Result<Record> {
    let track: ExternalTrack = serde_json::from_value(raw.clone())
        .map_err(|e| Error::MalformedRecord(format!("invalid external record: {}", e)))?;
    Ok(Record::External(track))
}
