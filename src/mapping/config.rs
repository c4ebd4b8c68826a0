//! Mapper configuration: resolver callbacks and strict/lenient error modes.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::models::{ContentItem, RichTextImage};

/// How a recoverable content-resolution problem is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Abort the mapping pass with an error.
    #[default]
    Strict,
    /// Degrade to empty content and emit a diagnostic.
    Lenient,
}

impl ErrorMode {
    #[must_use]
    pub fn is_strict(self) -> bool {
        self == Self::Strict
    }
}

/// How a linked item is embedded into rich text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Component owned by the rich-text element (`data-rel="component"`).
    Component,
    /// Reference to a standalone content item.
    Link,
}

/// Where a linked item is being embedded.
#[derive(Debug, Clone, Copy)]
pub struct RichTextContext<'a> {
    /// Codename of the item that owns the rich-text element.
    pub item_codename: &'a str,
    /// Rich-text element codename.
    pub element: &'a str,
    pub relation: Relation,
}

/// Target of a link to be turned into a URL.
///
/// For URL slug elements `link_id` and `text` are `None` and the target is
/// the item owning the element.
#[derive(Debug, Clone, Copy)]
pub struct LinkContext<'a> {
    pub link_id: Option<&'a str>,
    pub codename: &'a str,
    pub item_type: &'a str,
    pub url_slug: &'a str,
    /// Inner HTML of the anchor, for rich-text hyperlinks.
    pub text: Option<&'a str>,
}

/// Output of a link resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedLink {
    /// Value for the anchor's `href`.
    Url(String),
    /// HTML replacing the whole anchor.
    Html(String),
}

impl ResolvedLink {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Url(value) | Self::Html(value) => value.is_empty(),
        }
    }
}

/// Image embedded in rich text whose URL is being resolved.
#[derive(Debug, Clone, Copy)]
pub struct ImageContext<'a> {
    pub item_codename: &'a str,
    pub element: &'a str,
    pub image: &'a RichTextImage,
}

/// Produces HTML for a linked item embedded in rich text.
pub type RichTextResolverFn =
    Arc<dyn Fn(&ContentItem, &RichTextContext<'_>) -> Option<String> + Send + Sync>;

/// Produces a URL (or anchor HTML) for a link target.
pub type LinkResolverFn = Arc<dyn Fn(&LinkContext<'_>) -> Option<ResolvedLink> + Send + Sync>;

/// Overrides the URL of a rich-text image.
pub type ImageResolverFn = Arc<dyn Fn(&ImageContext<'_>) -> Option<String> + Send + Sync>;

/// Chooses a property name for an element codename.
pub type PropertyResolverFn = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Per-query mapping configuration.
///
/// Resolvers set here take precedence over the ones declared on registered
/// types.
#[derive(Clone)]
pub struct MapperConfig {
    pub rich_text_resolver: Option<RichTextResolverFn>,
    /// Resolves hyperlinks inside rich text.
    pub link_resolver: Option<LinkResolverFn>,
    /// Resolves URL slug elements.
    pub url_slug_resolver: Option<LinkResolverFn>,
    pub image_resolver: Option<ImageResolverFn>,
    /// Linked items missing from the response (insufficient depth).
    pub missing_linked_items: ErrorMode,
    /// Rich-text images missing from the response.
    pub missing_images: ErrorMode,
    /// Elements with a type string the mapper does not know.
    pub unknown_field_types: ErrorMode,
    /// Emit lenient-mode diagnostics at `warn` level instead of `debug`.
    pub advanced_logging: bool,
    /// Keep the raw JSON of each item on the mapped item.
    pub include_raw: bool,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            rich_text_resolver: None,
            link_resolver: None,
            url_slug_resolver: None,
            image_resolver: None,
            missing_linked_items: ErrorMode::Lenient,
            missing_images: ErrorMode::Strict,
            unknown_field_types: ErrorMode::Strict,
            advanced_logging: false,
            include_raw: true,
        }
    }
}

impl MapperConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_rich_text_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&ContentItem, &RichTextContext<'_>) -> Option<String> + Send + Sync + 'static,
    {
        self.rich_text_resolver = Some(Arc::new(resolver));
        self
    }

    #[must_use]
    pub fn with_link_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&LinkContext<'_>) -> Option<ResolvedLink> + Send + Sync + 'static,
    {
        self.link_resolver = Some(Arc::new(resolver));
        self
    }

    #[must_use]
    pub fn with_url_slug_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&LinkContext<'_>) -> Option<ResolvedLink> + Send + Sync + 'static,
    {
        self.url_slug_resolver = Some(Arc::new(resolver));
        self
    }

    #[must_use]
    pub fn with_image_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&ImageContext<'_>) -> Option<String> + Send + Sync + 'static,
    {
        self.image_resolver = Some(Arc::new(resolver));
        self
    }

    /// `ErrorMode::Strict` aborts on linked items missing from the response.
    #[must_use]
    pub fn with_missing_linked_items(mut self, mode: ErrorMode) -> Self {
        self.missing_linked_items = mode;
        self
    }

    #[must_use]
    pub fn with_missing_images(mut self, mode: ErrorMode) -> Self {
        self.missing_images = mode;
        self
    }

    #[must_use]
    pub fn with_unknown_field_types(mut self, mode: ErrorMode) -> Self {
        self.unknown_field_types = mode;
        self
    }

    #[must_use]
    pub fn with_advanced_logging(mut self, enabled: bool) -> Self {
        self.advanced_logging = enabled;
        self
    }

    #[must_use]
    pub fn with_include_raw(mut self, enabled: bool) -> Self {
        self.include_raw = enabled;
        self
    }

    /// Emits a lenient-mode diagnostic.
    pub(crate) fn diagnostic(&self, kind: &'static str, codename: &str, detail: &str) {
        if self.advanced_logging {
            warn!(kind, codename, detail, "Content resolution degraded");
        } else {
            debug!(kind, codename, detail, "Content resolution degraded");
        }
    }
}

impl fmt::Debug for MapperConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapperConfig")
            .field("rich_text_resolver", &self.rich_text_resolver.is_some())
            .field("link_resolver", &self.link_resolver.is_some())
            .field("url_slug_resolver", &self.url_slug_resolver.is_some())
            .field("image_resolver", &self.image_resolver.is_some())
            .field("missing_linked_items", &self.missing_linked_items)
            .field("missing_images", &self.missing_images)
            .field("unknown_field_types", &self.unknown_field_types)
            .field("advanced_logging", &self.advanced_logging)
            .field("include_raw", &self.include_raw)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_modes() {
        let config = MapperConfig::default();
        assert_eq!(config.missing_linked_items, ErrorMode::Lenient);
        assert_eq!(config.missing_images, ErrorMode::Strict);
        assert_eq!(config.unknown_field_types, ErrorMode::Strict);
        assert!(!config.advanced_logging);
        assert!(config.include_raw);
    }

    #[test]
    fn test_builder_sets_resolvers() {
        let config = MapperConfig::new()
            .with_rich_text_resolver(|item, _| Some(item.codename().to_string()))
            .with_url_slug_resolver(|ctx| Some(ResolvedLink::Url(format!("/{}", ctx.url_slug))))
            .with_missing_linked_items(ErrorMode::Strict);
        assert!(config.rich_text_resolver.is_some());
        assert!(config.url_slug_resolver.is_some());
        assert!(config.link_resolver.is_none());
        assert!(config.missing_linked_items.is_strict());
    }

    #[test]
    fn test_debug_hides_closures() {
        let config = MapperConfig::new().with_image_resolver(|_| None);
        let debug_str = format!("{config:?}");
        assert!(debug_str.contains("image_resolver: true"));
        assert!(debug_str.contains("link_resolver: false"));
    }

    #[test]
    fn test_resolved_link_is_empty() {
        assert!(ResolvedLink::Url(String::new()).is_empty());
        assert!(!ResolvedLink::Html("<b>x</b>".to_string()).is_empty());
    }
}
