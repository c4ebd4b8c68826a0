//! Resolution of rich-text placeholders against a mapped item graph.

use std::collections::BTreeMap;

use regex::Captures;
use tracing::{debug, trace};

use super::placeholder::{
    ANCHOR_PATTERN, IMAGE_PATTERN, OBJECT_PATTERN, OBJECT_TYPE, attribute, try_replace_all,
    with_attribute,
};
use crate::mapping::{
    ImageContext, LinkContext, MapperConfig, MappingError, Relation, ResolvedLink,
    RichTextContext, TypeRegistry,
};
use crate::models::{ItemGraph, ItemLink, RichTextImage};

/// One rich-text element to resolve.
#[derive(Debug, Clone, Copy)]
pub struct RichTextInput<'a> {
    /// Codename of the item owning the element.
    pub item_codename: &'a str,
    /// Element codename.
    pub element: &'a str,
    /// HTML with placeholders, as delivered.
    pub html: &'a str,
    pub images: &'a [RichTextImage],
    pub links: &'a BTreeMap<String, ItemLink>,
}

/// Result of resolving one rich-text element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedRichText {
    pub html: String,
    /// Linked items dereferenced by `data-rel="link"` embeds, first-use order.
    pub linked_items: Vec<String>,
    /// Components dereferenced by `data-rel="component"` embeds, first-use order.
    pub components: Vec<String>,
}

impl ResolvedRichText {
    fn record(&mut self, relation: Relation, codename: &str) {
        let target = match relation {
            Relation::Component => &mut self.components,
            Relation::Link => &mut self.linked_items,
        };
        if !target.iter().any(|existing| existing == codename) {
            target.push(codename.to_string());
        }
    }
}

/// Replaces linked-item, image and hyperlink placeholders in rich text.
///
/// Per-query resolvers from the [`MapperConfig`] take precedence over the
/// resolvers declared on registered types.
#[derive(Debug, Clone, Copy)]
pub struct RichTextResolver<'a> {
    registry: &'a TypeRegistry,
    config: &'a MapperConfig,
}

impl<'a> RichTextResolver<'a> {
    #[must_use]
    pub fn new(registry: &'a TypeRegistry, config: &'a MapperConfig) -> Self {
        Self { registry, config }
    }

    /// Resolves every placeholder of one element.
    ///
    /// Images and hyperlinks are rewritten first, then linked-item embeds are
    /// replaced; HTML produced by resolvers is not scanned again.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::LinkedItemNotFound`] or
    /// [`MappingError::ImageNotFound`] when the corresponding error mode is
    /// strict. Hyperlinks never fail.
    #[tracing::instrument(skip(self, input, graph), fields(item = input.item_codename, element = input.element))]
    pub fn resolve(
        &self,
        input: &RichTextInput<'_>,
        graph: &ItemGraph,
    ) -> Result<ResolvedRichText, MappingError> {
        let html = try_replace_all(&IMAGE_PATTERN, input.html, |caps| {
            self.resolve_image(input, graph, caps)
        })?;

        let html = ANCHOR_PATTERN
            .replace_all(&html, |caps: &Captures<'_>| self.resolve_hyperlink(input, caps))
            .into_owned();

        let mut resolved = ResolvedRichText::default();
        let html = try_replace_all(&OBJECT_PATTERN, &html, |caps| {
            self.resolve_embed(input, graph, caps, &mut resolved)
        })?;
        resolved.html = html;

        trace!(
            linked_items = resolved.linked_items.len(),
            components = resolved.components.len(),
            "Rich text resolved"
        );
        Ok(resolved)
    }

    fn resolve_embed(
        &self,
        input: &RichTextInput<'_>,
        graph: &ItemGraph,
        caps: &Captures<'_>,
        resolved: &mut ResolvedRichText,
    ) -> Result<String, MappingError> {
        let attributes = &caps[1];
        if attribute(attributes, "type") != Some(OBJECT_TYPE)
            || attribute(attributes, "data-type") != Some("item")
        {
            return Ok(caps[0].to_string());
        }

        let Some(codename) = attribute(attributes, "data-codename") else {
            self.config.diagnostic(
                "placeholder_without_codename",
                input.item_codename,
                input.element,
            );
            return Ok(String::new());
        };

        let relation = if attribute(attributes, "data-rel") == Some("component") {
            Relation::Component
        } else {
            Relation::Link
        };

        let Some(item) = graph.get(codename) else {
            if self.config.missing_linked_items.is_strict() {
                return Err(MappingError::linked_item_not_found(
                    input.item_codename,
                    input.element,
                    codename,
                ));
            }
            self.config.diagnostic(
                "linked_item_not_found",
                input.item_codename,
                &format!("'{codename}' in element '{}'", input.element),
            );
            return Ok(String::new());
        };
        resolved.record(relation, codename);

        let ctx = RichTextContext {
            item_codename: input.item_codename,
            element: input.element,
            relation,
        };

        let resolver = self.config.rich_text_resolver.as_ref().or_else(|| {
            self.registry
                .resolve(&item.system.item_type)
                .and_then(|descriptor| descriptor.rich_text_resolver())
        });

        match resolver {
            Some(resolver) => Ok(resolver(item, &ctx).unwrap_or_else(|| {
                debug!(linked = codename, "Rich-text resolver returned no HTML");
                String::new()
            })),
            None => {
                self.config.diagnostic(
                    "no_rich_text_resolver",
                    codename,
                    &format!("no resolver for type '{}'", item.system.item_type),
                );
                Ok(String::new())
            }
        }
    }

    fn resolve_image(
        &self,
        input: &RichTextInput<'_>,
        graph: &ItemGraph,
        caps: &Captures<'_>,
    ) -> Result<String, MappingError> {
        let attributes = &caps[1];
        let Some(image_id) = attribute(attributes, "data-image-id") else {
            return Ok(caps[0].to_string());
        };

        let Some(image) = find_image(input.images, graph, image_id) else {
            if self.config.missing_images.is_strict() {
                return Err(MappingError::image_not_found(
                    input.item_codename,
                    input.element,
                    image_id,
                ));
            }
            self.config
                .diagnostic("image_not_found", input.item_codename, image_id);
            return Ok(caps[0].to_string());
        };

        let ctx = ImageContext {
            item_codename: input.item_codename,
            element: input.element,
            image,
        };
        let url = self
            .config
            .image_resolver
            .as_ref()
            .and_then(|resolver| resolver(&ctx))
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| image.url.clone());

        Ok(format!(
            "<img{}{}",
            with_attribute(attributes, "src", &url),
            &caps[2]
        ))
    }

    fn resolve_hyperlink(&self, input: &RichTextInput<'_>, caps: &Captures<'_>) -> String {
        let attributes = &caps[1];
        let text = &caps[2];
        let Some(link_id) = attribute(attributes, "data-item-id") else {
            return caps[0].to_string();
        };

        let Some(link) = input.links.get(link_id) else {
            self.config.diagnostic(
                "missing_link_for_placeholder",
                input.item_codename,
                &format!("link '{link_id}' in element '{}'", input.element),
            );
            return anchor(attributes, "", text);
        };

        let ctx = LinkContext {
            link_id: Some(link_id),
            codename: &link.codename,
            item_type: &link.item_type,
            url_slug: &link.url_slug,
            text: Some(text),
        };

        let per_query = [&self.config.link_resolver, &self.config.url_slug_resolver]
            .into_iter()
            .flatten()
            .find_map(|resolver| resolver(&ctx).filter(|resolved| !resolved.is_empty()));

        let resolution = per_query.or_else(|| {
            self.registry
                .resolve(&link.item_type)
                .and_then(|descriptor| descriptor.link_resolver())
                .and_then(|resolver| resolver(&ctx))
                .filter(|resolved| !resolved.is_empty())
        });

        match resolution {
            Some(ResolvedLink::Url(url)) => anchor(attributes, &url, text),
            Some(ResolvedLink::Html(html)) => html,
            None => {
                self.config.diagnostic(
                    "unresolved_link",
                    &link.codename,
                    &format!("no link resolver produced a URL for type '{}'", link.item_type),
                );
                anchor(attributes, "", text)
            }
        }
    }
}

fn anchor(attributes: &str, href: &str, text: &str) -> String {
    format!("<a{}>{text}</a>", with_attribute(attributes, "href", href))
}

/// Looks for an image in the element first, then in every rich-text field of
/// the graph.
fn find_image<'g>(
    own: &'g [RichTextImage],
    graph: &'g ItemGraph,
    image_id: &str,
) -> Option<&'g RichTextImage> {
    own.iter()
        .find(|image| image.image_id == image_id)
        .or_else(|| {
            graph
                .iter()
                .flat_map(|item| item.rich_text_fields())
                .find_map(|rich_text| rich_text.image(image_id))
        })
}
