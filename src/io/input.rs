use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info};

use crate::error::{FeedError, Result};
use crate::io::parse_xml;
use crate::models::XmlElement;

/// Configuration for retrieving the source feed
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User-Agent header sent to the feed host
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("feedfork/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Where the source feed comes from
#[derive(Debug, Clone)]
pub enum FeedSource {
    /// Fetch over HTTP(S)
    Url(String),
    /// Read from a local file
    File(PathBuf),
}

impl FeedSource {
    /// Human-readable location for logs and errors
    pub fn location(&self) -> String {
        match self {
            FeedSource::Url(url) => url.clone(),
            FeedSource::File(path) => path.display().to_string(),
        }
    }
}

/// HTTP client for the source feed
pub struct FeedFetcher {
    client: Client,
}

impl FeedFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|err| FeedError::Fetch {
                location: "client".to_string(),
                reason: err.to_string(),
            })?;
        Ok(Self { client })
    }

    /// Fetch the raw feed body from a URL
    pub async fn fetch(&self, url: &str) -> Result<String> {
        debug!("Fetching feed from {}", url);
        let fetch_error = |reason: String| FeedError::Fetch {
            location: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| fetch_error(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("HTTP {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|err| fetch_error(err.to_string()))?;
        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }

    /// Load the raw feed body from either kind of source
    pub async fn load(&self, source: &FeedSource) -> Result<String> {
        match source {
            FeedSource::Url(url) => self.fetch(url).await,
            FeedSource::File(path) => {
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|err| FeedError::Fetch {
                        location: path.display().to_string(),
                        reason: err.to_string(),
                    })
            }
        }
    }
}

/// Parse raw feed text and check it has the RSS 2.0 outline
///
/// The returned tree is rooted at `<rss>` and has a `<channel>` child.
pub fn parse_feed(xml: &str) -> Result<XmlElement> {
    let root = parse_xml(xml)?;

    if root.name != "rss" {
        return Err(FeedError::Parse(format!(
            "expected <rss> root element, found <{}>",
            root.name
        )));
    }
    let channel = root
        .child("channel")
        .ok_or_else(|| FeedError::Parse("<rss> has no <channel> element".to_string()))?;

    info!(
        "Parsed feed with {} items",
        channel.children_named("item").count()
    );
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_feed_requires_rss_root() {
        let err = parse_feed("<feed><entry/></feed>").unwrap_err();
        assert!(matches!(err, FeedError::Parse(_)));
        assert!(err.to_string().contains("<feed>"));
    }

    #[test]
    fn test_parse_feed_requires_channel() {
        assert!(matches!(
            parse_feed(r#"<rss version="2.0"></rss>"#),
            Err(FeedError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_feed_single_item() {
        let root = parse_feed(
            r#"<rss version="2.0"><channel><title>t</title><item><title>only</title></item></channel></rss>"#,
        )
        .unwrap();
        let channel = root.child("channel").unwrap();
        assert_eq!(channel.children_named("item").count(), 1);
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.xml");
        std::fs::write(&path, "<rss><channel/></rss>").unwrap();

        let fetcher = FeedFetcher::new(&FetchConfig::default()).unwrap();
        let body = fetcher.load(&FeedSource::File(path)).await.unwrap();
        assert_eq!(body, "<rss><channel/></rss>");
    }

    #[tokio::test]
    async fn test_load_missing_file_is_fetch_error() {
        let fetcher = FeedFetcher::new(&FetchConfig::default()).unwrap();
        let err = fetcher
            .load(&FeedSource::File(PathBuf::from("/nonexistent/feed.xml")))
            .await
            .unwrap_err();
        assert_eq!(err.stage(), "fetch");
    }
}
