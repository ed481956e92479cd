use crate::models::{Document, Extension};

/// Settings for the SmartNews script variant
#[derive(Debug, Clone)]
pub struct SmartNewsConfig {
    pub prefix: String,
    pub namespace_uri: String,
    /// Script markup attached to every item
    ///
    /// The same payload goes on every item; nothing is fetched per item.
    pub analytics_script: String,
}

impl Default for SmartNewsConfig {
    fn default() -> Self {
        Self {
            prefix: "snf".to_string(),
            namespace_uri: "http://www.smartnews.be/snf".to_string(),
            analytics_script: "<script></script>".to_string(),
        }
    }
}

impl SmartNewsConfig {
    pub fn analytics_field(&self) -> String {
        format!("{}:analytics", self.prefix)
    }
}

/// Script-injection variant: declares the SmartNews namespace and attaches
/// the analytics payload to every item
pub fn smartnews(document: &Document, config: &SmartNewsConfig) -> Document {
    let mut derived = document.clone();
    derived.set_namespace(config.prefix.as_str(), config.namespace_uri.as_str());

    let field = config.analytics_field();
    for item in derived.items_mut() {
        item.set_extension(
            field.as_str(),
            Extension::Text(config.analytics_script.clone()),
        );
    }

    derived
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variants::tests::canonical;

    #[test]
    fn test_adds_analytics_to_every_item() {
        let derived = smartnews(&canonical(4), &SmartNewsConfig::default());

        assert_eq!(derived.namespace("snf"), Some("http://www.smartnews.be/snf"));
        for item in derived.items() {
            assert_eq!(
                item.extension("snf:analytics"),
                Some(&Extension::Text("<script></script>".to_string()))
            );
            assert_eq!(item.extensions.len(), 1);
        }
    }

    #[test]
    fn test_custom_payload() {
        let config = SmartNewsConfig {
            analytics_script: "<script>track()</script>".to_string(),
            ..Default::default()
        };
        let derived = smartnews(&canonical(1), &config);
        assert_eq!(
            derived.items[0].extension("snf:analytics"),
            Some(&Extension::Text("<script>track()</script>".to_string()))
        );
    }
}
