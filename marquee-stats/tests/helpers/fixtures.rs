//! Raw record and feature vector builders

use marquee_common::config::StatsConfig;
use marquee_stats::FeatureVector;
use serde_json::{json, Value};

/// Untagged catalog record
pub fn catalog_track(
    id: &str,
    popularity: u8,
    explicit: bool,
    release_date: &str,
    artist_genres: &[&[&str]],
) -> Value {
    let artists: Vec<Value> = artist_genres
        .iter()
        .map(|genres| json!({ "genres": genres }))
        .collect();
    json!({
        "id": id,
        "uri": format!("spotify:track:{}", id),
        "name": format!("Track {}", id),
        "images": [{ "url": format!("https://img/{}", id) }],
        "popularity": popularity,
        "explicit": explicit,
        "album": { "release_date": release_date },
        "artists": artists,
    })
}

/// Scrobble-history record without enrichment fields
pub fn external_track(id: &str) -> Value {
    json!({ "type": "lastfm", "id": id, "name": format!("Scrobble {}", id) })
}

/// Vector over the default dimensions, every value equal to `value`
pub fn feature_vector(value: f64) -> FeatureVector {
    StatsConfig::default()
        .feature_dimensions
        .into_iter()
        .map(|dimension| (dimension, value))
        .collect()
}
