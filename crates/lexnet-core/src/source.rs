//! Where dataset files come from.
//!
//! The loader only ever asks for a path relative to the data root. A
//! [`FileSource`] resolves it against a local directory, an [`HttpSource`]
//! against a base URL. Use [`open_source`] to pick one from a location
//! string taken from configuration.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::GraphError;

/// A read-only store of dataset files.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetch the raw bytes of a file relative to the data root.
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, GraphError>;

    /// Short description for logs.
    fn describe(&self) -> String;
}

#[async_trait]
impl DataSource for Box<dyn DataSource> {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, GraphError> {
        (**self).fetch(path).await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

#[async_trait]
impl<S: DataSource + ?Sized> DataSource for Arc<S> {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, GraphError> {
        (**self).fetch(path).await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Dataset files in a local directory.
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl DataSource for FileSource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, GraphError> {
        let full = self.root.join(path);
        tokio::fs::read(&full)
            .await
            .map_err(|e| GraphError::fetch(full.display().to_string(), e))
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Dataset files served over HTTP.
pub struct HttpSource {
    base_url: String,
    client: Client,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl DataSource for HttpSource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, GraphError> {
        let url = self.url(path);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GraphError::fetch(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GraphError::fetch(&url, format!("HTTP {}", status.as_u16())));
        }

        let bytes = response.bytes().await.map_err(|e| GraphError::fetch(&url, e))?;
        Ok(bytes.to_vec())
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

/// Open a data source from a directory path or an `http(s)://` base URL.
pub fn open_source(location: &str) -> Box<dyn DataSource> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Box::new(HttpSource::new(location))
    } else {
        Box::new(FileSource::new(location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_url_join() {
        let source = HttpSource::new("https://example.org/data/");
        assert_eq!(source.url("/title-1.json"), "https://example.org/data/title-1.json");
        assert_eq!(source.url("manifest.json"), "https://example.org/data/manifest.json");
    }

    #[test]
    fn test_open_source_picks_backend() {
        assert_eq!(open_source("https://example.org").describe(), "https://example.org");
        assert_eq!(open_source("./data").describe(), "./data");
    }

    #[tokio::test]
    async fn test_file_source_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let source = FileSource::new(dir.path());
        let err = source.fetch("nope.json").await.unwrap_err();
        assert!(matches!(err, GraphError::FetchFailure { .. }));
    }
}
