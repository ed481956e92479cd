use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::{XmlElement, XmlNode};

/// Element name of the encoded item body
pub const CONTENT_ENCODED: &str = "content:encoded";

/// Channel elements held in typed fields of [`Channel`]
pub const CHANNEL_CORE_FIELDS: [&str; 4] = ["title", "link", "lastBuildDate", "pubDate"];

/// Canonical RSS document: root declarations, channel metadata and items
///
/// Every field is owned, so `clone()` is a full deep copy: a derived
/// document never shares items, extensions or attribute blocks with the
/// document it was cloned from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// RSS version attribute
    pub version: String,
    /// Namespace declarations on the root, prefix -> URI ("" is the default namespace)
    pub namespaces: BTreeMap<String, String>,
    /// Channel-level metadata
    pub channel: Channel,
    /// Items in output order
    pub items: Vec<Item>,
}

/// Channel metadata
///
/// `layout` records the element names of the source channel in order, so
/// output keeps typed and pass-through elements where the feed had them.
/// Elements the source lacked are placed as in a fresh channel: title and
/// link first, new pass-through fields next, dates last.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub title: Option<String>,
    pub link: Option<String>,
    pub last_build_date: Option<String>,
    pub pub_date: Option<String>,
    /// Channel elements carried through verbatim (description, language, image, ...)
    pub fields: Vec<XmlElement>,
    #[serde(default)]
    pub layout: Vec<String>,
}

/// A single feed item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub title: Option<String>,
    pub link: Option<String>,
    /// Raw publish timestamp as written in the feed
    pub pub_date: Option<String>,
    /// Primary category, possibly empty
    pub category: String,
    /// Plain-text description
    pub description: String,
    /// HTML body, `None` once removed by a variant
    pub content_encoded: Option<String>,
    /// Item elements carried through verbatim (guid, dc:creator, ...)
    pub fields: Vec<XmlElement>,
    /// Namespace-qualified fields added by variant rules
    pub extensions: BTreeMap<String, Extension>,
}

/// Value of an extension field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extension {
    /// Element with text content
    Text(String),
    /// Empty element carrying attributes
    Attributes(BTreeMap<String, String>),
}

impl Extension {
    /// Build an attribute block from name/value pairs
    pub fn attributes<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Extension::Attributes(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    fn to_element(&self, name: &str) -> XmlElement {
        match self {
            Extension::Text(text) => XmlElement::with_text(name, text.as_str()),
            Extension::Attributes(attrs) => {
                let mut element = XmlElement::new(name);
                for (key, value) in attrs {
                    element.set_attr(key.as_str(), value.as_str());
                }
                element
            }
        }
    }
}

impl Document {
    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        self.namespaces.get(prefix).map(String::as_str)
    }

    /// Declare a namespace, overwriting any existing URI for the prefix
    pub fn set_namespace(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        self.namespaces.insert(prefix.into(), uri.into());
    }

    /// Remove a namespace declaration, returning its URI if it was present
    pub fn remove_namespace(&mut self, prefix: &str) -> Option<String> {
        self.namespaces.remove(prefix)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [Item] {
        &mut self.items
    }

    /// Keep at most `max` items from the front of the sequence
    pub fn truncate_items(&mut self, max: usize) {
        self.items.truncate(max);
    }

    /// Replace the item sequence wholesale
    pub fn replace_items(&mut self, items: Vec<Item>) {
        self.items = items;
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Convert to a generic XML tree rooted at `<rss>`
    pub fn to_xml(&self) -> XmlElement {
        let mut rss = XmlElement::new("rss");
        rss.set_attr("version", self.version.as_str());
        for (prefix, uri) in &self.namespaces {
            let name = if prefix.is_empty() {
                "xmlns".to_string()
            } else {
                format!("xmlns:{}", prefix)
            };
            rss.set_attr(name, uri.as_str());
        }

        let mut channel = self.channel.to_xml();
        for item in &self.items {
            channel.push_element(item.to_xml());
        }
        rss.push_element(channel);
        rss
    }
}

impl Channel {
    /// First pass-through field with the given name
    pub fn field(&self, name: &str) -> Option<&XmlElement> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Remove every pass-through field with the given name
    pub fn remove_field(&mut self, name: &str) -> usize {
        let before = self.fields.len();
        self.fields.retain(|f| f.name != name);
        before - self.fields.len()
    }

    /// Typed element for one of [`CHANNEL_CORE_FIELDS`], if set
    fn core_element(&self, name: &str) -> Option<XmlElement> {
        let value = match name {
            "title" => &self.title,
            "link" => &self.link,
            "lastBuildDate" => &self.last_build_date,
            "pubDate" => &self.pub_date,
            _ => return None,
        };
        value
            .as_deref()
            .map(|text| XmlElement::with_text(name, text))
    }

    fn in_layout(&self, name: &str) -> bool {
        self.layout.iter().any(|entry| entry == name)
    }

    fn to_xml(&self) -> XmlElement {
        let mut channel = XmlElement::new("channel");
        let mut pending: Vec<Option<&XmlElement>> = self.fields.iter().map(Some).collect();
        let mut placed: Vec<&str> = Vec::new();

        for name in ["title", "link"] {
            if !self.in_layout(name) {
                channel.children.extend(self.core_element(name).map(XmlNode::Element));
            }
        }

        for name in &self.layout {
            if CHANNEL_CORE_FIELDS.contains(&name.as_str()) {
                if !placed.contains(&name.as_str()) {
                    placed.push(name.as_str());
                    channel.children.extend(self.core_element(name).map(XmlNode::Element));
                }
            } else if let Some(slot) = pending
                .iter_mut()
                .find(|slot| slot.is_some_and(|field| field.name == *name))
            {
                channel.children.extend(slot.take().cloned().map(XmlNode::Element));
            }
        }

        for field in pending.into_iter().flatten() {
            channel.push_element(field.clone());
        }
        for name in ["lastBuildDate", "pubDate"] {
            if !self.in_layout(name) {
                channel.children.extend(self.core_element(name).map(XmlNode::Element));
            }
        }
        channel
    }
}

impl Item {
    /// Parsed publish timestamp, if present and valid
    pub fn published_at(&self) -> Option<DateTime<FixedOffset>> {
        self.pub_date.as_deref().and_then(parse_pub_date)
    }

    /// First pass-through field with the given name
    pub fn field(&self, name: &str) -> Option<&XmlElement> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn set_field(&mut self, element: XmlElement) {
        self.remove_field(&element.name);
        self.fields.push(element);
    }

    /// Remove every pass-through field with the given name
    pub fn remove_field(&mut self, name: &str) -> usize {
        let before = self.fields.len();
        self.fields.retain(|f| f.name != name);
        before - self.fields.len()
    }

    pub fn extension(&self, name: &str) -> Option<&Extension> {
        self.extensions.get(name)
    }

    pub fn set_extension(&mut self, name: impl Into<String>, value: Extension) {
        self.extensions.insert(name.into(), value);
    }

    pub fn remove_extension(&mut self, name: &str) -> Option<Extension> {
        self.extensions.remove(name)
    }

    /// Drop the encoded body; a no-op when it is already gone
    pub fn remove_content(&mut self) -> Option<String> {
        self.content_encoded.take()
    }

    /// Best available identifier for log and error messages
    pub fn identifier(&self) -> String {
        self.field("guid")
            .map(|guid| guid.text())
            .or_else(|| self.link.clone())
            .or_else(|| self.title.clone())
            .unwrap_or_else(|| "untitled".to_string())
    }

    fn to_xml(&self) -> XmlElement {
        let mut item = XmlElement::new("item");
        if let Some(title) = &self.title {
            item.push_element(XmlElement::with_text("title", title.as_str()));
        }
        if let Some(link) = &self.link {
            item.push_element(XmlElement::with_text("link", link.as_str()));
        }
        if let Some(date) = &self.pub_date {
            item.push_element(XmlElement::with_text("pubDate", date.as_str()));
        }
        item.push_element(XmlElement::with_text("category", self.category.as_str()));
        for field in &self.fields {
            item.push_element(field.clone());
        }
        item.push_element(XmlElement::with_text("description", self.description.as_str()));
        if let Some(content) = &self.content_encoded {
            let mut element = XmlElement::new(CONTENT_ENCODED);
            element.children.push(XmlNode::CData(content.clone()));
            item.push_element(element);
        }
        for (name, extension) in &self.extensions {
            item.push_element(extension.to_element(name));
        }
        item
    }
}

/// Parse an RSS date (RFC 2822, with RFC 3339 as a fallback)
pub fn parse_pub_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_document() -> Document {
        let mut item = Item {
            title: Some("First".to_string()),
            link: Some("https://example.com/first".to_string()),
            pub_date: Some("Tue, 10 Jun 2025 04:00:00 GMT".to_string()),
            category: "News".to_string(),
            description: "Summary".to_string(),
            content_encoded: Some("<p>Body</p>".to_string()),
            ..Default::default()
        };
        item.set_extension("x:flag", Extension::attributes([("on", "true")]));

        Document {
            version: "2.0".to_string(),
            namespaces: BTreeMap::from([(
                "dc".to_string(),
                "http://purl.org/dc/elements/1.1/".to_string(),
            )]),
            channel: Channel {
                title: Some("Example".to_string()),
                link: Some("https://example.com".to_string()),
                ..Default::default()
            },
            items: vec![item],
        }
    }

    #[test]
    fn test_clone_is_independent() {
        let original = sample_document();
        let mut copy = original.clone();

        copy.items_mut()[0].category = "Changed".to_string();
        copy.items_mut()[0].set_extension("x:flag", Extension::Text("off".to_string()));
        copy.set_namespace("snf", "http://www.smartnews.be/snf");

        assert_eq!(original.items[0].category, "News");
        assert_eq!(
            original.items[0].extension("x:flag"),
            Some(&Extension::attributes([("on", "true")]))
        );
        assert_eq!(original.namespace("snf"), None);
    }

    #[test]
    fn test_remove_content_is_noop_when_absent() {
        let mut item = sample_document().items.remove(0);
        assert_eq!(item.remove_content(), Some("<p>Body</p>".to_string()));
        assert_eq!(item.remove_content(), None);
    }

    #[test]
    fn test_identifier_prefers_guid() {
        let mut item = sample_document().items.remove(0);
        assert_eq!(item.identifier(), "https://example.com/first");

        item.set_field(XmlElement::with_text("guid", "post-42"));
        assert_eq!(item.identifier(), "post-42");
    }

    #[test]
    fn test_to_xml_layout() {
        let xml = sample_document().to_xml();

        assert_eq!(xml.name, "rss");
        assert_eq!(xml.attr("version"), Some("2.0"));
        assert_eq!(xml.attr("xmlns:dc"), Some("http://purl.org/dc/elements/1.1/"));

        let channel = xml.child("channel").unwrap();
        let item = channel.child("item").unwrap();
        assert_eq!(item.child_text("category").as_deref(), Some("News"));
        assert_eq!(item.child_text(CONTENT_ENCODED).as_deref(), Some("<p>Body</p>"));
        assert_eq!(item.child("x:flag").unwrap().attr("on"), Some("true"));
    }

    fn channel_names(channel: &Channel) -> Vec<String> {
        channel
            .to_xml()
            .elements()
            .map(|element| element.name.clone())
            .collect()
    }

    #[test]
    fn test_channel_keeps_source_layout() {
        let channel = Channel {
            title: Some("Example".to_string()),
            link: None,
            last_build_date: Some("Sun, 18 Oct 2026 08:30:00 GMT".to_string()),
            pub_date: Some("Sun, 18 Oct 2026 08:30:00 GMT".to_string()),
            fields: vec![
                XmlElement::with_text("description", "About"),
                XmlElement::with_text("language", "en-US"),
            ],
            layout: ["description", "lastBuildDate", "title", "language"]
                .map(String::from)
                .to_vec(),
        };

        assert_eq!(
            channel_names(&channel),
            vec!["description", "lastBuildDate", "title", "language", "pubDate"]
        );
    }

    #[test]
    fn test_channel_without_layout() {
        let mut channel = Channel {
            title: Some("Example".to_string()),
            pub_date: Some("Sun, 18 Oct 2026 08:30:00 GMT".to_string()),
            fields: vec![XmlElement::with_text("description", "About")],
            ..Default::default()
        };
        assert_eq!(channel_names(&channel), vec!["title", "description", "pubDate"]);

        channel.layout = vec!["description".to_string()];
        channel.remove_field("description");
        assert_eq!(channel_names(&channel), vec!["title", "pubDate"]);
    }

    #[test]
    fn test_parse_pub_date() {
        assert!(parse_pub_date("Tue, 10 Jun 2025 04:00:00 +0000").is_some());
        assert!(parse_pub_date(" 2025-06-10T04:00:00Z ").is_some());
        assert!(parse_pub_date("yesterday").is_none());
    }
}
