use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};

use crate::error::{FeedError, Result};

/// A compiled CSS selector applied to HTML fragments
#[derive(Debug, Clone)]
pub struct FragmentSelector {
    selector: Selector,
}

impl FragmentSelector {
    pub fn parse(source: &str) -> Result<Self> {
        let selector = Selector::parse(source).map_err(|err| FeedError::InvalidSelector {
            selector: source.to_string(),
            reason: err.to_string(),
        })?;
        Ok(Self { selector })
    }
}

/// Trimmed text content of every top-level element matching `selector`
///
/// A match nested inside another match is already covered by its ancestor.
/// Texts are joined in document order. Falls back to the text of the whole
/// fragment when nothing matches.
pub fn text_content(html: &str, selector: &FragmentSelector) -> String {
    let fragment = Html::parse_fragment(html);
    let matched: Vec<ElementRef> = fragment.select(&selector.selector).collect();
    if matched.is_empty() {
        let text: String = fragment.root_element().text().collect();
        return text.trim().to_string();
    }

    let ids: HashSet<_> = matched.iter().map(|element| element.id()).collect();
    let text: String = matched
        .iter()
        .filter(|element| !element.ancestors().any(|ancestor| ids.contains(&ancestor.id())))
        .flat_map(|element| element.text())
        .collect();
    text.trim().to_string()
}

/// Remove every subtree matching `selector` and serialize the remainder
pub fn remove_matching(html: &str, selector: &FragmentSelector) -> String {
    let mut fragment = Html::parse_fragment(html);
    let matched: Vec<_> = fragment
        .select(&selector.selector)
        .map(|element| element.id())
        .collect();

    for id in matched {
        if let Some(mut node) = fragment.tree.get_mut(id) {
            node.detach();
        }
    }
    fragment.root_element().inner_html()
}
