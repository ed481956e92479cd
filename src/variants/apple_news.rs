use crate::models::{Document, Extension};

/// Settings for the Flatplan metadata variant
#[derive(Debug, Clone)]
pub struct AppleNewsConfig {
    /// Namespace prefix for the added fields
    pub prefix: String,
    /// Namespace URI declared on the root
    pub namespace_uri: String,
    /// Template identifier attached to every item
    pub template_identifier: String,
    /// Value of the `isPreview` flag
    pub is_preview: bool,
}

impl Default for AppleNewsConfig {
    fn default() -> Self {
        Self {
            prefix: "flatplan".to_string(),
            namespace_uri: "https://www.flatplan.io/feedspec/".to_string(),
            template_identifier: "standard".to_string(),
            is_preview: true,
        }
    }
}

impl AppleNewsConfig {
    pub fn template_field(&self) -> String {
        format!("{}:template", self.prefix)
    }

    pub fn parameters_field(&self) -> String {
        format!("{}:parameters", self.prefix)
    }
}

/// Metadata variant: declares the Flatplan namespace and gives every item
/// a template reference and a parameters block
pub fn apple_news(document: &Document, config: &AppleNewsConfig) -> Document {
    let mut derived = document.clone();
    derived.set_namespace(config.prefix.as_str(), config.namespace_uri.as_str());

    let template = Extension::attributes([("identifier", config.template_identifier.as_str())]);
    let parameters = Extension::attributes([("isPreview", config.is_preview.to_string())]);
    let template_field = config.template_field();
    let parameters_field = config.parameters_field();

    for item in derived.items_mut() {
        item.set_extension(template_field.as_str(), template.clone());
        item.set_extension(parameters_field.as_str(), parameters.clone());
    }

    derived
}
