//! Reconciles raw catalog records into [`LectureRecord`]s.
//!
//! Each schema is decoded into its typed representation first, then tracks
//! are partitioned by MIME type and the best video (and, for TU Wien, audio)
//! track is selected. Selection keeps the first of several equal maxima.

use super::record::{CatalogSchema, LectureRecord, RawRecord};
use super::schema::{NumberOrString, TuRecord, TuTrack, UwRecord, UwTrack};
use crate::error::{HoersaalError, Result};
use chrono::{DateTime, FixedOffset};
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, error, info};

const VIDEO_MIME_PREFIX: &str = "video/mp4";
const AUDIO_MIME_PREFIX: &str = "audio/mpeg";

/// Normalize one raw record of the given schema.
pub fn normalize(raw: &RawRecord, schema: CatalogSchema) -> Result<LectureRecord> {
    match schema {
        CatalogSchema::Tu => normalize_tu(raw),
        CatalogSchema::UniWien => normalize_uni_wien(raw),
    }
}

/// Normalize every record of a catalog, dropping (and logging) malformed ones.
pub fn normalize_all(raw: &[RawRecord], schema: CatalogSchema) -> Vec<LectureRecord> {
    let mut records = Vec::with_capacity(raw.len());

    for (index, entry) in raw.iter().enumerate() {
        match normalize(entry, schema) {
            Ok(record) => records.push(record),
            Err(e) => error!("Skipping catalog entry {}: {}", index + 1, e),
        }
    }

    info!(
        "Normalized {} of {} catalog entries ({} schema)",
        records.len(),
        raw.len(),
        schema
    );
    debug!(
        "All lectures found:\n{}",
        records
            .iter()
            .map(|r| format!("{:20}{}", "", r.title))
            .collect::<Vec<_>>()
            .join("\n")
    );

    records
}

fn normalize_tu(raw: &RawRecord) -> Result<LectureRecord> {
    let record: TuRecord = decode(raw)?;
    let package = record.mediapackage;
    let title = package.title;

    let tracks = package.media.track.into_vec();
    let (videos, audios): (Vec<&TuTrack>, Vec<&TuTrack>) = (
        tracks.iter().filter(|t| t.mimetype.starts_with(VIDEO_MIME_PREFIX)).collect(),
        tracks.iter().filter(|t| t.mimetype.starts_with(AUDIO_MIME_PREFIX)).collect(),
    );

    let video = first_max_by_key(videos, |t| {
        t.video
            .as_ref()
            .and_then(|v| v.resolution.as_deref())
            .and_then(parse_resolution_width)
    })
    .ok_or_else(|| HoersaalError::malformed(Some(&title), "no video/mp4 track"))?;

    let audio = first_max_by_key(audios, |t| {
        t.audio
            .as_ref()
            .and_then(|a| a.bitrate.as_ref())
            .and_then(NumberOrString::as_i64)
    });

    Ok(LectureRecord {
        author: package.creators.creator.joined(),
        contributors: None,
        series_title: package.seriestitle,
        duration_millis: parse_duration_millis(&package.duration, &title)?,
        recorded_at: parse_recorded_at(&record.dc_created, &title)?,
        video_link: video.url.clone(),
        audio_link: audio.map(|t| t.url.clone()),
        title,
    })
}

fn normalize_uni_wien(raw: &RawRecord) -> Result<LectureRecord> {
    let record: UwRecord = decode(raw)?;
    let package = record.mediapackage;
    let title = package.title;

    let tracks = package.media.track.into_vec();
    let videos: Vec<&UwTrack> = tracks
        .iter()
        .filter(|t| t.mimetype.starts_with(VIDEO_MIME_PREFIX))
        .collect();

    let video = first_max_by_key(videos, |t| t.first_tag().and_then(parse_tag_rank))
        .ok_or_else(|| HoersaalError::malformed(Some(&title), "no video/mp4 track"))?;

    Ok(LectureRecord {
        author: package.creators.creator.joined(),
        contributors: package.contributors.map(|c| c.contributor.joined()),
        series_title: package.seriestitle,
        duration_millis: parse_duration_millis(&package.duration, &title)?,
        recorded_at: parse_recorded_at(&record.dc_created, &title)?,
        video_link: video.url.clone(),
        audio_link: None,
        title,
    })
}

/// Decode a raw record into its typed schema, failing closed.
fn decode<T: serde::de::DeserializeOwned>(raw: &RawRecord) -> Result<T> {
    serde_json::from_value(raw.clone()).map_err(|e| {
        let title = raw["mediapackage"]["title"].as_str();
        HoersaalError::malformed(title, e.to_string())
    })
}

/// Return the element with the largest key, keeping the first among equals.
///
/// Elements whose key is `None` rank below every element with a key.
fn first_max_by_key<T, K: Ord>(
    items: impl IntoIterator<Item = T>,
    key: impl Fn(&T) -> K,
) -> Option<T> {
    let mut best: Option<(K, T)> = None;
    for item in items {
        let k = key(&item);
        match &best {
            Some((best_key, _)) if k <= *best_key => {}
            _ => best = Some((k, item)),
        }
    }
    best.map(|(_, item)| item)
}

/// Width component of a `"WIDTHxHEIGHT"` resolution string.
pub fn parse_resolution_width(resolution: &str) -> Option<u64> {
    let (width, _) = resolution.trim().split_once(['x', 'X'])?;
    width.trim().parse().ok()
}

/// Numeric prefix (at most nine digits) of a resolution tag.
pub fn parse_tag_rank(tag: &str) -> Option<u64> {
    static PREFIX: OnceLock<Regex> = OnceLock::new();
    let re = PREFIX.get_or_init(|| Regex::new(r"^\s*(\d{1,9})").expect("valid regex"));
    re.captures(tag)?.get(1)?.as_str().parse().ok()
}

fn parse_duration_millis(value: &NumberOrString, title: &str) -> Result<u64> {
    let millis = value.as_i64().ok_or_else(|| {
        HoersaalError::malformed(Some(title), format!("duration '{value}' is not an integer"))
    })?;

    u64::try_from(millis).map_err(|_| {
        HoersaalError::malformed(Some(title), format!("duration {millis} is negative"))
    })
}

/// Parse an ISO-8601 timestamp with a numeric offset or a `Z` suffix.
pub fn parse_recorded_at(value: &str, title: &str) -> Result<DateTime<FixedOffset>> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z"))
        .map_err(|e| {
            HoersaalError::malformed(
                Some(title),
                format!("recording timestamp '{value}' is invalid: {e}"),
            )
        })
}
