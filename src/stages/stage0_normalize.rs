use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Utc};
use tracing::{debug, info, warn};

use crate::error::{FeedError, Result};
use crate::html::{remove_matching, text_content, FragmentSelector};
use crate::models::{
    parse_pub_date, Channel, Document, Item, XmlElement, CHANNEL_CORE_FIELDS, CONTENT_ENCODED,
};

/// RFC 1123 date layout used for channel timestamps
const RFC1123_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Tuning table for Stage 0
#[derive(Debug, Clone)]
pub struct NormalizeConfig {
    /// Maximum number of items kept after sorting
    pub max_items: usize,
    /// Category value rewritten to the empty string
    pub sentinel_category: String,
    /// Selector for the description's text container
    pub description_selector: String,
    /// Selector for page-break separators removed from the body
    pub separator_selector: String,
    /// RSS version written on the root
    pub version: String,
    /// Namespace declarations forced onto the root (prefix, URI)
    pub namespaces: Vec<(String, String)>,
    /// Namespace prefixes removed from the root
    pub dropped_namespaces: Vec<String>,
    /// Channel elements removed from the output
    pub dropped_channel_fields: Vec<String>,
    /// Item elements removed from every item
    pub dropped_item_fields: Vec<String>,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            max_items: 20,
            sentinel_category: "Uncategorized".to_string(),
            description_selector: "div".to_string(),
            separator_selector: "div.npagebreak".to_string(),
            version: "2.0".to_string(),
            namespaces: vec![
                ("media".to_string(), "http://search.yahoo.com/mrss/".to_string()),
                ("dc".to_string(), "http://purl.org/dc/elements/1.1/".to_string()),
                (
                    "content".to_string(),
                    "http://purl.org/rss/1.0/modules/content/".to_string(),
                ),
            ],
            dropped_namespaces: vec![
                "wfw".to_string(),
                "atom".to_string(),
                "sy".to_string(),
                "slash".to_string(),
            ],
            dropped_channel_fields: vec![
                "sy:updatePeriod".to_string(),
                "sy:updateFrequency".to_string(),
                "atom:link".to_string(),
                "generator".to_string(),
            ],
            dropped_item_fields: vec!["enclosure".to_string(), "media:content".to_string()],
        }
    }
}

/// Result of Stage 0 normalization
#[derive(Debug)]
pub struct NormalizationResult {
    /// The canonical document
    pub document: Document,
    /// Number of items in the source feed
    pub source_items: usize,
    /// Source items without a parseable publish date
    pub undated_items: usize,
}

/// Stage 0: turns a raw RSS tree into the canonical document
///
/// Selectors are compiled once here so a bad configuration fails before
/// any feed is processed.
#[derive(Debug, Clone)]
pub struct Normalizer {
    config: NormalizeConfig,
    description_selector: FragmentSelector,
    separator_selector: FragmentSelector,
}

impl Normalizer {
    pub fn new(config: NormalizeConfig) -> Result<Self> {
        let description_selector = FragmentSelector::parse(&config.description_selector)?;
        let separator_selector = FragmentSelector::parse(&config.separator_selector)?;
        Ok(Self {
            config,
            description_selector,
            separator_selector,
        })
    }

    /// Normalize using the current wall-clock time for channel dates
    pub fn normalize(&self, raw: &XmlElement) -> Result<NormalizationResult> {
        self.normalize_at(raw, Utc::now())
    }

    /// Perform Stage 0 with an explicit clock
    ///
    /// This stage:
    /// 1. Forces the canonical root declarations and drops unused ones
    /// 2. Sorts items newest first and keeps at most `max_items`
    /// 3. Stamps channel `lastBuildDate` and `pubDate` with `now`
    /// 4. Cleans every retained item
    ///
    /// The raw tree is only borrowed; the result owns all of its data.
    pub fn normalize_at(&self, raw: &XmlElement, now: DateTime<Utc>) -> Result<NormalizationResult> {
        let channel_element = raw
            .child("channel")
            .ok_or_else(|| FeedError::Parse("<rss> has no <channel> element".to_string()))?;

        let namespaces = self.build_namespaces(raw);

        // A channel with one item is still a sequence
        let mut dated: Vec<(Option<DateTime<FixedOffset>>, &XmlElement)> = channel_element
            .children_named("item")
            .map(|item| {
                let published = item.child_text("pubDate").and_then(|d| parse_pub_date(&d));
                (published, item)
            })
            .collect();
        let source_items = dated.len();
        let undated_items = dated.iter().filter(|(date, _)| date.is_none()).count();
        if undated_items > 0 {
            warn!("{} items have no parseable pubDate; sorting them last", undated_items);
        }

        // Stable: equal timestamps keep source order, undated items go last
        dated.sort_by(|a, b| b.0.cmp(&a.0));
        dated.truncate(self.config.max_items);

        let items = dated
            .into_iter()
            .enumerate()
            .map(|(index, (_, element))| self.clean_item(index, element))
            .collect::<Result<Vec<Item>>>()?;

        let stamp = now.format(RFC1123_FORMAT).to_string();
        let kept: Vec<&XmlElement> = channel_element
            .elements()
            .filter(|field| field.name != "item")
            .filter(|field| !self.config.dropped_channel_fields.contains(&field.name))
            .collect();
        let channel = Channel {
            title: channel_element.child_text("title"),
            link: channel_element.child_text("link"),
            last_build_date: Some(stamp.clone()),
            pub_date: Some(stamp),
            fields: kept
                .iter()
                .filter(|field| !CHANNEL_CORE_FIELDS.contains(&field.name.as_str()))
                .map(|field| (*field).clone())
                .collect(),
            layout: kept.iter().map(|field| field.name.clone()).collect(),
        };

        info!(
            "Normalized feed: kept {} of {} items",
            items.len(),
            source_items
        );

        Ok(NormalizationResult {
            document: Document {
                version: self.config.version.clone(),
                namespaces,
                channel,
                items,
            },
            source_items,
            undated_items,
        })
    }

    fn build_namespaces(&self, raw: &XmlElement) -> BTreeMap<String, String> {
        let mut namespaces: BTreeMap<String, String> = raw
            .attributes
            .iter()
            .filter_map(|(key, uri)| {
                if key == "xmlns" {
                    Some((String::new(), uri.clone()))
                } else {
                    key.strip_prefix("xmlns:")
                        .map(|prefix| (prefix.to_string(), uri.clone()))
                }
            })
            .collect();

        for (prefix, uri) in &self.config.namespaces {
            namespaces.insert(prefix.clone(), uri.clone());
        }
        for prefix in &self.config.dropped_namespaces {
            namespaces.remove(prefix);
        }
        namespaces
    }

    /// Build a canonical item from its raw element
    fn clean_item(&self, index: usize, element: &XmlElement) -> Result<Item> {
        let mut item = Item::default();
        let mut category: Option<String> = None;
        let mut description: Option<String> = None;
        let mut content: Option<String> = None;

        for child in element.elements() {
            match child.name.as_str() {
                "title" if item.title.is_none() => item.title = Some(child.text()),
                "link" if item.link.is_none() => item.link = Some(child.text()),
                "pubDate" if item.pub_date.is_none() => item.pub_date = Some(child.text()),
                "category" if category.is_none() => category = Some(child.text()),
                "description" if description.is_none() => description = Some(child.text()),
                CONTENT_ENCODED if content.is_none() => content = Some(child.text()),
                name if self.config.dropped_item_fields.iter().any(|f| f == name) => {}
                _ => item.fields.push(child.clone()),
            }
        }

        let missing = |field: &'static str| FeedError::MalformedItem {
            index,
            identifier: item.identifier(),
            field,
        };
        let category = category.ok_or_else(|| missing("category"))?;
        let description = description.ok_or_else(|| missing("description"))?;
        let content = content.ok_or_else(|| missing(CONTENT_ENCODED))?;

        item.category = if category == self.config.sentinel_category {
            String::new()
        } else {
            category
        };
        item.description = text_content(&description, &self.description_selector);
        item.content_encoded = Some(remove_matching(&content, &self.separator_selector));

        debug!("Cleaned item {} ({})", index, item.identifier());
        Ok(item)
    }
}
