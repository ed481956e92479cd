use std::collections::BTreeMap;
use std::thread::{self, ScopedJoinHandle};

use tracing::{debug, info};

use crate::models::Document;
use crate::variants::{apple_news, smartnews, truncated, Variant, VariantConfig};

/// Execute Stage 1: derive every publisher variant from the canonical document
///
/// Each independent chain runs on its own scoped thread:
/// 1. `apple-news`, then `truncated` composed on its output
/// 2. `smartnews`
///
/// The canonical document is only borrowed; every variant owns its own
/// deep copy, so nothing computed here can alias another variant.
pub fn derive_variants(canonical: &Document, config: &VariantConfig) -> BTreeMap<String, Document> {
    let (apple, trimmed, smart) = thread::scope(|scope| {
        let apple_chain = scope.spawn(|| {
            let apple = apple_news(canonical, &config.apple_news);
            let trimmed = truncated(&apple);
            (apple, trimmed)
        });
        let smart_chain = scope.spawn(|| smartnews(canonical, &config.smartnews));

        let (apple, trimmed) = join(apple_chain);
        (apple, trimmed, join(smart_chain))
    });

    let variants = BTreeMap::from([
        (Variant::AppleNews.name().to_string(), apple),
        (Variant::SmartNews.name().to_string(), smart),
        (Variant::Truncated.name().to_string(), trimmed),
    ]);

    for (name, document) in &variants {
        debug!("Variant {}: {} items", name, document.item_count());
    }
    info!("Stage 1: derived {} variants", variants.len());

    variants
}

/// Rules never fail; a panic in a worker is a bug and is re-raised here
fn join<T>(handle: ScopedJoinHandle<'_, T>) -> T {
    handle
        .join()
        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
}
