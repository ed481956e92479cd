use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::debug;

use crate::error::{FeedError, Result};
use crate::io::write_xml;
use crate::models::Document;

/// Content type declared for every stored feed
pub const XML_CONTENT_TYPE: &str = "application/xml";

/// Configuration for rendering output documents
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Indent nested elements for human readers
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

/// Render a document to XML text
pub fn render_document(key: &str, document: &Document, config: &OutputConfig) -> Result<String> {
    write_xml(&document.to_xml(), config.pretty).map_err(|reason| FeedError::Serialize {
        key: key.to_string(),
        reason,
    })
}

/// Durable storage for rendered feeds
pub trait OutputSink {
    /// Store `body` under `key` and return a locator for later retrieval
    fn store(&self, key: &str, body: &str, content_type: &str) -> Result<String>;
}

/// Writes each feed to `<dir>/<key>.xml`
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Create the sink, creating the directory if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|err| FeedError::SinkWrite {
            key: dir.display().to_string(),
            reason: err.to_string(),
        })?;
        Ok(Self { dir })
    }
}

impl OutputSink for DirectorySink {
    fn store(&self, key: &str, body: &str, content_type: &str) -> Result<String> {
        let path = self.dir.join(format!("{}.xml", key));
        debug!("Writing {} ({}) to {:?}", key, content_type, path);
        std::fs::write(&path, body).map_err(|err| FeedError::SinkWrite {
            key: key.to_string(),
            reason: format!("{:?}: {}", path, err),
        })?;
        Ok(path.display().to_string())
    }
}

/// A record held by [`MemorySink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub body: String,
    pub content_type: String,
}

/// Keeps stored feeds in memory; used for dry runs
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<BTreeMap<String, StoredRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a copy of the record stored under `key`
    pub fn get(&self, key: &str) -> Option<StoredRecord> {
        self.records
            .lock()
            .ok()
            .and_then(|records| records.get(key).cloned())
    }

    /// Keys stored so far, in sorted order
    pub fn keys(&self) -> Vec<String> {
        self.records
            .lock()
            .map(|records| records.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl OutputSink for MemorySink {
    fn store(&self, key: &str, body: &str, content_type: &str) -> Result<String> {
        let mut records = self.records.lock().map_err(|err| FeedError::SinkWrite {
            key: key.to_string(),
            reason: err.to_string(),
        })?;
        records.insert(
            key.to_string(),
            StoredRecord {
                body: body.to_string(),
                content_type: content_type.to_string(),
            },
        );
        Ok(format!("memory://{}", key))
    }
}
