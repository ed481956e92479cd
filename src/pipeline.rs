use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::error::{FeedError, Result};
use crate::io::{parse_feed, FeedFetcher, FeedSource, FetchConfig, OutputConfig, OutputSink};
use crate::stages::{
    derive_variants, publish_variants, NormalizationResult, NormalizeConfig, Normalizer,
    PublishedFeed,
};
use crate::variants::VariantConfig;

/// Configuration for a whole run
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub fetch: FetchConfig,
    pub normalize: NormalizeConfig,
    pub variants: VariantConfig,
    pub output: OutputConfig,
}

/// Summary of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub source: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Items in the source feed
    pub source_items: usize,
    /// Items kept in the canonical document
    pub canonical_items: usize,
    pub outputs: Vec<PublishedFeed>,
}

impl RunReport {
    /// Write to a JSON file
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let sink_error = |reason: String| FeedError::SinkWrite {
            key: path.display().to_string(),
            reason,
        };
        let file = std::fs::File::create(path).map_err(|err| sink_error(err.to_string()))?;
        serde_json::to_writer_pretty(file, self).map_err(|err| sink_error(err.to_string()))
    }
}

/// Fetch, parse and normalize the source feed
pub async fn load_canonical(
    fetcher: &FeedFetcher,
    source: &FeedSource,
    normalizer: &Normalizer,
) -> Result<NormalizationResult> {
    info!("Loading feed from {}", source.location());
    let body = fetcher.load(source).await?;
    let raw = parse_feed(&body)?;

    info!("Stage 0: Normalizing feed...");
    normalizer.normalize(&raw)
}

/// Run the whole pipeline once: load, normalize, derive, publish
///
/// Any error aborts the run. Variants are only handed to the sink after all
/// of them have been derived and rendered.
pub async fn run_pipeline<S: OutputSink + ?Sized>(
    fetcher: &FeedFetcher,
    source: &FeedSource,
    sink: &S,
    config: &PipelineConfig,
) -> Result<RunReport> {
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    info!("Run {} started", run_id);

    let normalizer = Normalizer::new(config.normalize.clone())?;
    let normalized = load_canonical(fetcher, source, &normalizer).await?;
    let canonical = &normalized.document;

    info!("Stage 1: Deriving variants...");
    let variants = derive_variants(canonical, &config.variants);

    info!("Stage 2: Publishing variants...");
    let outputs = publish_variants(&variants, sink, &config.output)?;

    let report = RunReport {
        run_id,
        source: source.location(),
        started_at,
        finished_at: Utc::now(),
        source_items: normalized.source_items,
        canonical_items: canonical.item_count(),
        outputs,
    };
    info!(
        "Run {} complete: {} items, {} outputs",
        run_id,
        report.canonical_items,
        report.outputs.len()
    );
    Ok(report)
}
