//! Lecture catalogs.
//!
//! A catalog is the JSON document an institution's media server returns for
//! a lecture search. It is loaded as opaque records ([`loader`]), reconciled
//! into [`LectureRecord`]s per institution schema ([`normalize`]), then
//! narrowed to the requested titles ([`select`]).

mod loader;
mod normalize;
mod record;
mod schema;
mod select;

pub use loader::{parse_catalog, CatalogLoader, Source};
pub use normalize::{normalize, normalize_all, parse_recorded_at};
pub use record::{sanitize_file_stem, CatalogSchema, LectureRecord, RawRecord};
pub use select::select;
