//! Loads raw lecture catalogs from a file or a remote endpoint.

use super::record::RawRecord;
use super::schema::OneOrMany;
use crate::error::{HoersaalError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, instrument, warn};
use url::Url;

/// Where a catalog is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A local JSON file.
    File(PathBuf),
    /// A search endpoint returning the same JSON.
    Link(Url),
}

impl Source {
    /// Build a source from the two mutually exclusive command-line options.
    pub fn from_options(path: Option<PathBuf>, link: Option<Url>) -> Result<Self> {
        match (path, link) {
            (Some(path), None) => Ok(Source::File(path)),
            (None, Some(link)) => Ok(Source::Link(link)),
            (None, None) => Err(HoersaalError::NoSource),
            (Some(_), Some(_)) => Err(HoersaalError::InvalidInput(
                "a data file path and a data link are mutually exclusive".to_string(),
            )),
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::File(path) => write!(f, "file {}", path.display()),
            Source::Link(url) => write!(f, "link {}", url),
        }
    }
}

/// `{ "search-results": { "result": [ ... ] } }`
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "search-results")]
    search_results: SearchResults,
}

#[derive(Debug, Deserialize)]
struct SearchResults {
    #[serde(default)]
    result: Option<OneOrMany<RawRecord>>,
}

/// Parse catalog JSON and return the records of its `result` array as-is.
pub fn parse_catalog(json: &str) -> Result<Vec<RawRecord>> {
    let envelope: Envelope = serde_json::from_str(json)
        .map_err(|e| HoersaalError::Load(format!("unexpected catalog format: {e}")))?;

    match envelope.search_results.result {
        Some(result) => Ok(result.into_vec()),
        None => {
            warn!("Catalog contains no results");
            Ok(Vec::new())
        }
    }
}

/// Fetches catalogs with a bounded request timeout.
pub struct CatalogLoader {
    client: reqwest::Client,
}

impl CatalogLoader {
    /// Create a loader whose remote requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HoersaalError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Load the raw records of a catalog.
    #[instrument(skip(self), fields(source = %source))]
    pub async fn load(&self, source: &Source) -> Result<Vec<RawRecord>> {
        let result = match source {
            Source::File(path) => self.load_file(path).await,
            Source::Link(url) => self.load_link(url).await,
        };

        match &result {
            Ok(records) => info!("Loaded {} catalog entries", records.len()),
            Err(e) => error!("Could not load catalog from {}: {}", source, e),
        }

        result
    }

    async fn load_file(&self, path: &Path) -> Result<Vec<RawRecord>> {
        info!("Loading catalog from file {}", path.display());

        if !path.is_file() {
            return Err(HoersaalError::Load(format!(
                "{} is not a file or doesn't exist",
                path.display()
            )));
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| HoersaalError::Load(format!("cannot read {}: {e}", path.display())))?;

        parse_catalog(&content)
    }

    async fn load_link(&self, url: &Url) -> Result<Vec<RawRecord>> {
        info!("Loading catalog from link {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| HoersaalError::Load(format!("request failed: {e}")))?;

        let body = response
            .text()
            .await
            .map_err(|e| HoersaalError::Load(format!("cannot read response body: {e}")))?;

        parse_catalog(&body)
    }
}
