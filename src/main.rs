use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use feedfork::{
    load_canonical, run_pipeline, DirectorySink, FeedFetcher, FeedSource, MemorySink,
    NormalizeConfig, Normalizer, OutputSink, PipelineConfig,
};

#[derive(Parser)]
#[command(name = "feedfork")]
#[command(author, version, about = "Derive publisher-specific RSS feeds from one source feed", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct SourceArgs {
    /// Source feed URL
    #[arg(short, long)]
    url: Option<String>,

    /// Read the source feed from a local file instead
    #[arg(short, long)]
    input: Option<PathBuf>,
}

impl SourceArgs {
    fn source(&self) -> Result<FeedSource> {
        if let Some(url) = &self.url {
            return Ok(FeedSource::Url(url.clone()));
        }
        self.input
            .clone()
            .map(FeedSource::File)
            .context("Either --url or --input is required")
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize the feed and publish every variant
    Run {
        #[command(flatten)]
        source: SourceArgs,

        /// Directory receiving <variant>.xml files
        #[arg(short, long, default_value = "output")]
        out_dir: PathBuf,

        /// Maximum number of items per feed
        #[arg(long, default_value = "20")]
        max_items: usize,

        /// Request timeout in seconds
        #[arg(long, default_value = "30")]
        timeout_secs: u64,

        /// Write compact XML instead of indented
        #[arg(long)]
        compact: bool,

        /// Write a JSON run report to this path
        #[arg(long)]
        report: Option<PathBuf>,

        /// Derive and render everything but keep it in memory
        #[arg(long)]
        dry_run: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print a summary of the canonical feed without publishing
    Inspect {
        #[command(flatten)]
        source: SourceArgs,

        /// Maximum number of items kept
        #[arg(long, default_value = "20")]
        max_items: usize,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            source,
            out_dir,
            max_items,
            timeout_secs,
            compact,
            report,
            dry_run,
            verbose,
        } => {
            setup_logging(verbose);
            let mut config = PipelineConfig::default();
            config.normalize.max_items = max_items;
            config.fetch.timeout_secs = timeout_secs;
            config.output.pretty = !compact;

            if dry_run {
                let sink = MemorySink::new();
                run(&source.source()?, &sink, &config, report).await?;
                for key in sink.keys() {
                    if let Some(record) = sink.get(&key) {
                        println!("{}: {} bytes ({})", key, record.body.len(), record.content_type);
                    }
                }
                Ok(())
            } else {
                let sink = DirectorySink::new(&out_dir)
                    .with_context(|| format!("Failed to prepare output directory {:?}", out_dir))?;
                run(&source.source()?, &sink, &config, report).await
            }
        }
        Commands::Inspect {
            source,
            max_items,
            verbose,
        } => {
            setup_logging(verbose);
            inspect(&source.source()?, max_items).await
        }
    }
}

fn setup_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new(Level::DEBUG.as_str())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::INFO.as_str()))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run<S: OutputSink>(
    source: &FeedSource,
    sink: &S,
    config: &PipelineConfig,
    report_path: Option<PathBuf>,
) -> Result<()> {
    let fetcher = FeedFetcher::new(&config.fetch).context("Failed to build HTTP client")?;

    let report = run_pipeline(&fetcher, source, sink, config)
        .await
        .map_err(|err| {
            let stage = err.stage();
            anyhow::Error::new(err).context(format!("Pipeline failed during {} stage", stage))
        })?;

    for output in &report.outputs {
        info!("{}: {} items -> {}", output.name, output.item_count, output.locator);
    }

    if let Some(path) = report_path {
        report
            .write_json(&path)
            .with_context(|| format!("Failed to write run report to {:?}", path))?;
        info!("Run report written to {:?}", path);
    }

    Ok(())
}

async fn inspect(source: &FeedSource, max_items: usize) -> Result<()> {
    let config = NormalizeConfig {
        max_items,
        ..Default::default()
    };
    let normalizer = Normalizer::new(config)?;
    let fetcher = FeedFetcher::new(&Default::default())?;

    let result = load_canonical(&fetcher, source, &normalizer)
        .await
        .context("Failed to load source feed")?;
    let document = &result.document;

    println!("Feed Summary");
    println!("============");
    println!("Title: {}", document.channel.title.as_deref().unwrap_or("-"));
    println!("Link: {}", document.channel.link.as_deref().unwrap_or("-"));
    println!(
        "Items: {} kept of {} ({} without a parseable date)",
        document.item_count(),
        result.source_items,
        result.undated_items
    );
    println!();

    println!("Namespaces");
    println!("----------");
    for (prefix, uri) in &document.namespaces {
        println!("{:<10} {}", prefix, uri);
    }
    println!();

    println!("Items");
    println!("-----");
    for (index, item) in document.items().iter().enumerate() {
        let category = if item.category.is_empty() {
            "-"
        } else {
            item.category.as_str()
        };
        println!(
            "{:>2}. [{}] {} ({})",
            index + 1,
            item.pub_date.as_deref().unwrap_or("undated"),
            item.title.as_deref().unwrap_or("untitled"),
            category
        );
    }

    Ok(())
}
