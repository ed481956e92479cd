pub mod error;
pub mod html;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod stages;
pub mod variants;

#[cfg(test)]
mod test_support;

pub use error::{FeedError, Result};
pub use io::{
    parse_feed, render_document, DirectorySink, FeedFetcher, FeedSource, FetchConfig, MemorySink,
    OutputConfig, OutputSink,
};
pub use models::{Channel, Document, Extension, Item, XmlElement};
pub use pipeline::{load_canonical, run_pipeline, PipelineConfig, RunReport};
pub use stages::{
    derive_variants, publish_variants, NormalizationResult, NormalizeConfig, Normalizer,
    PublishedFeed,
};
pub use variants::{
    apple_news, smartnews, truncated, AppleNewsConfig, SmartNewsConfig, Variant, VariantConfig,
};
