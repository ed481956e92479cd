pub mod apple_news;
pub mod smartnews;
pub mod truncated;

pub use apple_news::*;
pub use smartnews::*;
pub use truncated::*;

/// Configuration for all variant rules
#[derive(Debug, Clone, Default)]
pub struct VariantConfig {
    pub apple_news: AppleNewsConfig,
    pub smartnews: SmartNewsConfig,
}

/// The publisher variants produced by a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Variant {
    /// Flatplan template metadata on every item
    AppleNews,
    /// Analytics script on every item
    SmartNews,
    /// Apple News variant without item bodies
    Truncated,
}

impl Variant {
    /// Key under which the variant is stored
    pub fn name(self) -> &'static str {
        match self {
            Variant::AppleNews => "apple-news",
            Variant::SmartNews => "smartnews",
            Variant::Truncated => "truncated",
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
