use std::collections::BTreeMap;

use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::io::{render_document, OutputConfig, OutputSink, XML_CONTENT_TYPE};
use crate::models::Document;

/// A variant handed to the sink
#[derive(Debug, Clone, Serialize)]
pub struct PublishedFeed {
    /// Variant name, also the storage key
    pub name: String,
    /// Locator returned by the sink
    pub locator: String,
    pub item_count: usize,
    /// Size of the rendered XML in bytes
    pub bytes: usize,
}

/// Execute Stage 2: render every variant and store it
///
/// All variants are rendered before the first write, so a rendering failure
/// leaves the sink untouched. The first failed write aborts the rest.
pub fn publish_variants<S: OutputSink + ?Sized>(
    variants: &BTreeMap<String, Document>,
    sink: &S,
    config: &OutputConfig,
) -> Result<Vec<PublishedFeed>> {
    let rendered = variants
        .iter()
        .map(|(name, document)| {
            render_document(name, document, config).map(|xml| (name, document.item_count(), xml))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut published = Vec::with_capacity(rendered.len());
    for (name, item_count, xml) in rendered {
        let locator = sink.store(name, &xml, XML_CONTENT_TYPE)?;
        info!(
            "Published {} ({} items, {} bytes) to {}",
            name,
            item_count,
            xml.len(),
            locator
        );
        published.push(PublishedFeed {
            name: name.clone(),
            locator,
            item_count,
            bytes: xml.len(),
        });
    }

    Ok(published)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::FeedError;
    use crate::io::{parse_feed, MemorySink};
    use crate::stages::derive_variants;
    use crate::variants::tests::canonical;
    use crate::variants::VariantConfig;

    /// Records keys and fails on one of them
    struct FailingSink {
        fail_on: &'static str,
        attempted: Mutex<Vec<String>>,
    }

    impl OutputSink for FailingSink {
        fn store(&self, key: &str, _body: &str, _content_type: &str) -> Result<String> {
            self.attempted.lock().unwrap().push(key.to_string());
            if key == self.fail_on {
                return Err(FeedError::SinkWrite {
                    key: key.to_string(),
                    reason: "disk full".to_string(),
                });
            }
            Ok(format!("test://{}", key))
        }
    }

    #[test]
    fn test_publishes_every_variant() {
        let variants = derive_variants(&canonical(2), &VariantConfig::default());
        let sink = MemorySink::new();

        let published = publish_variants(&variants, &sink, &OutputConfig::default()).unwrap();

        assert_eq!(published.len(), 3);
        assert_eq!(sink.keys(), vec!["apple-news", "smartnews", "truncated"]);
        for feed in &published {
            let record = sink.get(&feed.name).unwrap();
            assert_eq!(record.content_type, "application/xml");
            assert_eq!(record.body.len(), feed.bytes);
            assert_eq!(feed.locator, format!("memory://{}", feed.name));
            assert_eq!(feed.item_count, 2);
            assert!(parse_feed(&record.body).is_ok());
        }
    }

    #[test]
    fn test_sink_failure_aborts_remaining_writes() {
        let variants = derive_variants(&canonical(1), &VariantConfig::default());
        let sink = FailingSink {
            fail_on: "smartnews",
            attempted: Mutex::new(Vec::new()),
        };

        let err = publish_variants(&variants, &sink, &OutputConfig::default()).unwrap_err();

        assert!(matches!(err, FeedError::SinkWrite { ref key, .. } if key == "smartnews"));
        assert_eq!(err.stage(), "publish");
        assert_eq!(*sink.attempted.lock().unwrap(), vec!["apple-news", "smartnews"]);
    }
}
