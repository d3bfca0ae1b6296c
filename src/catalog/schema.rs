//! Typed representations of the supported catalog record schemas.
//!
//! Raw records are decoded into these structs before normalization, so a
//! record missing a required field is rejected by the decoder itself.
//! Unknown fields are ignored; the catalogs carry far more data than we use.

use serde::Deserialize;

/// A value that catalogs emit either as a single item or as a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

impl OneOrMany<String> {
    /// Join all names into one display string.
    pub fn joined(&self) -> String {
        match self {
            OneOrMany::Many(items) => items.join(", "),
            OneOrMany::One(item) => item.clone(),
        }
    }
}

/// A numeric field that may be encoded as a JSON number or a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumberOrString {
    Number(serde_json::Number),
    Text(String),
}

impl NumberOrString {
    /// Interpret the value as an integer, if it is one.
    ///
    /// JSON floats with no fractional part (`5400000.0`) count as integers;
    /// strings must hold integer digits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            NumberOrString::Number(n) => n.as_i64().or_else(|| {
                let f = n.as_f64()?;
                let integral = f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64;
                integral.then_some(f as i64)
            }),
            NumberOrString::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl std::fmt::Display for NumberOrString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NumberOrString::Number(n) => write!(f, "{n}"),
            NumberOrString::Text(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Creators {
    pub creator: OneOrMany<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Contributors {
    pub contributor: OneOrMany<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Media<T> {
    pub track: OneOrMany<T>,
}

// ============================================================================
// TU Wien
// ============================================================================

/// One entry of a TU Wien catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct TuRecord {
    #[serde(rename = "dcCreated")]
    pub dc_created: String,
    pub mediapackage: TuMediaPackage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TuMediaPackage {
    pub title: String,
    pub creators: Creators,
    pub seriestitle: String,
    pub duration: NumberOrString,
    pub media: Media<TuTrack>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TuTrack {
    pub mimetype: String,
    pub url: String,
    #[serde(default)]
    pub video: Option<TuVideo>,
    #[serde(default)]
    pub audio: Option<TuAudio>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TuVideo {
    /// Frame size as `"WIDTHxHEIGHT"`.
    #[serde(default)]
    pub resolution: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TuAudio {
    #[serde(default)]
    pub bitrate: Option<NumberOrString>,
}

// ============================================================================
// Universität Wien
// ============================================================================

/// One entry of a Uni Wien (u:stream) catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct UwRecord {
    #[serde(rename = "dcCreated")]
    pub dc_created: String,
    pub mediapackage: UwMediaPackage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UwMediaPackage {
    pub title: String,
    pub creators: Creators,
    #[serde(default)]
    pub contributors: Option<Contributors>,
    pub seriestitle: String,
    pub duration: NumberOrString,
    pub media: Media<UwTrack>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UwTrack {
    pub mimetype: String,
    pub url: String,
    #[serde(default)]
    pub tags: Option<UwTags>,
}

/// Track tags; the first tag starts with the track's resolution rank.
#[derive(Debug, Clone, Deserialize)]
pub struct UwTags {
    pub tag: OneOrMany<String>,
}

impl UwTrack {
    pub fn first_tag(&self) -> Option<&str> {
        match &self.tags.as_ref()?.tag {
            OneOrMany::Many(tags) => tags.first().map(String::as_str),
            OneOrMany::One(tag) => Some(tag.as_str()),
        }
    }
}
