//! The item mapper: raw items to a typed, possibly cyclic item graph.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info, trace};

use super::config::{LinkContext, MapperConfig, ResolvedLink};
use super::error::MappingError;
use super::field::{self, ElementRef};
use super::registry::{ContentModel, TypeDescriptor, TypeRegistry, property_name};
use crate::models::{
    ContentItem, Field, FieldType, FieldValue, ItemGraph, RawElement, RawItem, RawItemMap,
    UrlSlug,
};
use crate::rich_text::{RichTextInput, RichTextResolver, embedded_codenames};

/// Items processed during one mapping pass.
///
/// A codename is reserved before its fields are converted, so a field that
/// leads back to an item already being mapped reuses it instead of recursing.
#[derive(Debug, Default)]
pub struct ProcessedItems {
    graph: ItemGraph,
    in_progress: HashSet<String>,
}

impl ProcessedItems {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the codename is mapped or currently being mapped.
    #[must_use]
    pub fn contains(&self, codename: &str) -> bool {
        self.graph.contains(codename) || self.in_progress.contains(codename)
    }

    /// Returns a completely mapped item.
    #[must_use]
    pub fn get(&self, codename: &str) -> Option<&ContentItem> {
        self.graph.get(codename)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.graph.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    fn reserve(&mut self, codename: &str) {
        self.in_progress.insert(codename.to_string());
    }

    fn complete(&mut self, item: ContentItem) {
        self.in_progress.remove(item.codename());
        self.graph.insert(item);
    }

    /// Returns the mapped items. Rich text is not resolved yet.
    #[must_use]
    pub fn into_graph(self) -> ItemGraph {
        self.graph
    }
}

/// A single mapped item together with the graph of everything it references.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappedItem {
    /// Codename of the requested item.
    pub codename: String,
    pub graph: ItemGraph,
}

impl MappedItem {
    /// The requested item.
    ///
    /// # Panics
    ///
    /// Never in practice: the mapper always inserts the root item.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn item(&self) -> &ContentItem {
        self.graph
            .get(&self.codename)
            .expect("mapped item is always part of its graph")
    }

    /// Converts the requested item into a typed model.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::ModelConversion`] when the item is not of the
    /// model's type or the model rejects it.
    pub fn cast<T: ContentModel>(&self) -> Result<T, MappingError> {
        cast_item(self.item(), &self.graph)
    }
}

/// A list of mapped items sharing one graph.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MappedItems {
    /// Codenames of the listed items, in response order.
    pub codenames: Vec<String>,
    pub graph: ItemGraph,
}

impl MappedItems {
    /// Iterates over the listed items in response order.
    pub fn items(&self) -> impl Iterator<Item = &ContentItem> {
        self.codenames
            .iter()
            .filter_map(|codename| self.graph.get(codename))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.codenames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codenames.is_empty()
    }

    /// Converts every listed item into a typed model.
    ///
    /// # Errors
    ///
    /// Returns the first conversion error.
    pub fn cast_all<T: ContentModel>(&self) -> Result<Vec<T>, MappingError> {
        self.items()
            .map(|item| cast_item(item, &self.graph))
            .collect()
    }
}

/// Converts a mapped item into a [`ContentModel`], checking its type first.
///
/// # Errors
///
/// Returns [`MappingError::ModelConversion`] on a type mismatch or when the
/// model rejects the item.
pub fn cast_item<T: ContentModel>(item: &ContentItem, graph: &ItemGraph) -> Result<T, MappingError> {
    if item.system.item_type != T::TYPE {
        return Err(MappingError::model_conversion(
            item.codename(),
            T::TYPE,
            &format!("item is of type '{}'", item.system.item_type),
        ));
    }
    T::from_item(item, graph)
}

/// Maps raw items into an [`ItemGraph`] and resolves their rich text.
#[derive(Debug, Clone, Default)]
pub struct ItemMapper {
    registry: TypeRegistry,
    config: MapperConfig,
}

impl ItemMapper {
    #[must_use]
    pub fn new(registry: TypeRegistry, config: MapperConfig) -> Self {
        Self { registry, config }
    }

    #[must_use]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Returns a mapper sharing this registry with a different configuration.
    #[must_use]
    pub fn with_config(&self, config: MapperConfig) -> Self {
        Self {
            registry: self.registry.clone(),
            config,
        }
    }

    /// Maps one item and every item it reaches through `linked`.
    ///
    /// # Errors
    ///
    /// Returns a [`MappingError`]; the pass is aborted and nothing partial is
    /// returned.
    #[tracing::instrument(skip(self, item, linked), fields(codename = item.codename(), linked = linked.len()))]
    pub fn map_item(&self, item: &RawItem, linked: &RawItemMap) -> Result<MappedItem, MappingError> {
        let mut processed = ProcessedItems::new();
        let codename = self.map_item_into(item, linked, &mut processed)?;
        let graph = self.finish(processed, std::slice::from_ref(&codename))?;
        info!(items = graph.len(), "Item mapped");
        Ok(MappedItem { codename, graph })
    }

    /// Maps a list of items sharing one set of linked items.
    ///
    /// # Errors
    ///
    /// Returns the first [`MappingError`] encountered.
    #[tracing::instrument(skip(self, items, linked), fields(items = items.len(), linked = linked.len()))]
    pub fn map_items(
        &self,
        items: &[RawItem],
        linked: &RawItemMap,
    ) -> Result<MappedItems, MappingError> {
        let mut processed = ProcessedItems::new();
        let mut codenames = Vec::with_capacity(items.len());
        for item in items {
            codenames.push(self.map_item_into(item, linked, &mut processed)?);
        }
        let graph = self.finish(processed, &codenames)?;
        info!(items = codenames.len(), graph = graph.len(), "Items mapped");
        Ok(MappedItems { codenames, graph })
    }

    /// Maps one raw item into `processed`, recursing into linked items.
    ///
    /// Returns the item's codename. If the codename was already processed
    /// (or is being processed further up the stack) the existing entry is
    /// reused and nothing is mapped. Rich text stays unresolved until the
    /// graph is complete; [`ItemMapper::map_item`] and
    /// [`ItemMapper::map_items`] take care of that.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::UnsupportedFieldType`],
    /// [`MappingError::InvalidFieldValue`] or, in strict mode,
    /// [`MappingError::LinkedItemNotFound`].
    pub fn map_item_into(
        &self,
        item: &RawItem,
        linked: &RawItemMap,
        processed: &mut ProcessedItems,
    ) -> Result<String, MappingError> {
        let codename = item.codename().to_string();
        if processed.contains(&codename) {
            trace!(codename = %codename, "Item already processed, reusing");
            return Ok(codename);
        }

        let descriptor = self.registry.resolve(&item.system.item_type);
        if descriptor.is_none() {
            trace!(
                codename = %codename,
                content_type = %item.system.item_type,
                "No registered type, mapping as generic item"
            );
        }
        processed.reserve(&codename);

        let mut fields = Vec::with_capacity(item.elements.len());
        for (element_codename, element) in &item.elements {
            let Some(field_type) = FieldType::parse(&element.element_type) else {
                if self.config.unknown_field_types.is_strict() {
                    return Err(MappingError::unsupported_field_type(
                        &codename,
                        element_codename,
                        &element.element_type,
                    ));
                }
                self.config.diagnostic(
                    "unsupported_field_type",
                    &codename,
                    &format!(
                        "element '{element_codename}' has type '{}'",
                        element.element_type
                    ),
                );
                continue;
            };

            let at = ElementRef {
                codename: &codename,
                element: element_codename,
                field_type,
            };
            let value = self.convert(at, item, element, descriptor, linked, processed)?;
            fields.push(Field {
                codename: element_codename.clone(),
                property: property_name(descriptor, element_codename),
                name: element.name.clone(),
                value,
            });
        }

        let raw = self.config.include_raw.then(|| item.source().clone());

        processed.complete(ContentItem {
            system: item.system.clone(),
            content_type: descriptor.map(|d| d.codename().to_string()),
            fields,
            raw,
        });
        debug!(codename = %codename, "Item mapped into graph");
        Ok(codename)
    }

    fn convert(
        &self,
        at: ElementRef<'_>,
        item: &RawItem,
        element: &RawElement,
        descriptor: Option<&TypeDescriptor>,
        linked: &RawItemMap,
        processed: &mut ProcessedItems,
    ) -> Result<FieldValue, MappingError> {
        let value = match at.field_type {
            FieldType::Text => FieldValue::Text(field::text(at, element)?),
            FieldType::Number => FieldValue::Number(field::number(at, element)?),
            FieldType::DateTime => FieldValue::DateTime(field::date_time(at, element)?),
            FieldType::MultipleChoice => {
                FieldValue::MultipleChoice(field::multiple_choice(at, element)?)
            }
            FieldType::Asset => FieldValue::Asset(field::assets(at, element)?),
            FieldType::Taxonomy => FieldValue::Taxonomy(field::taxonomy(at, element)?),
            FieldType::UrlSlug => {
                let slug = field::text(at, element)?;
                let url = self.resolve_url_slug(item, &slug, descriptor);
                FieldValue::UrlSlug(UrlSlug { slug, url })
            }
            FieldType::ModularContent => {
                let codenames = field::codenames(at, element)?;
                FieldValue::LinkedItems(self.map_linked(at, &codenames, linked, processed)?)
            }
            FieldType::RichText => {
                let rich_text = field::rich_text(at, element)?;
                self.map_rich_text_references(&rich_text.modular_content, linked, processed)?;
                FieldValue::RichText(rich_text)
            }
        };
        Ok(value)
    }

    /// Maps the items of a linked-items element and returns the references
    /// that exist, in declared order.
    fn map_linked(
        &self,
        at: ElementRef<'_>,
        codenames: &[String],
        linked: &RawItemMap,
        processed: &mut ProcessedItems,
    ) -> Result<Vec<String>, MappingError> {
        let mut references = Vec::with_capacity(codenames.len());
        for codename in codenames {
            if processed.contains(codename) {
                references.push(codename.clone());
                continue;
            }
            match linked.get(codename) {
                Some(raw) => {
                    self.map_item_into(raw, linked, processed)?;
                    references.push(codename.clone());
                }
                None if self.config.missing_linked_items.is_strict() => {
                    return Err(MappingError::linked_item_not_found(
                        at.codename,
                        at.element,
                        codename,
                    ));
                }
                None => self.config.diagnostic(
                    "linked_item_not_found",
                    at.codename,
                    &format!("'{codename}' in element '{}' dropped", at.element),
                ),
            }
        }
        Ok(references)
    }

    /// Maps items embedded in rich text so they are in the graph at
    /// resolution time. Missing ones are reported by the resolver.
    fn map_rich_text_references(
        &self,
        codenames: &[String],
        linked: &RawItemMap,
        processed: &mut ProcessedItems,
    ) -> Result<(), MappingError> {
        for codename in codenames {
            if processed.contains(codename) {
                continue;
            }
            if let Some(raw) = linked.get(codename) {
                self.map_item_into(raw, linked, processed)?;
            }
        }
        Ok(())
    }

    /// URL for a URL slug element: per-query resolver first, then the one
    /// declared on the item's type, otherwise unresolved.
    fn resolve_url_slug(
        &self,
        item: &RawItem,
        slug: &str,
        descriptor: Option<&TypeDescriptor>,
    ) -> Option<String> {
        let resolver = self
            .config
            .url_slug_resolver
            .as_ref()
            .or(self.config.link_resolver.as_ref())
            .or_else(|| descriptor.and_then(TypeDescriptor::link_resolver))?;

        let ctx = LinkContext {
            link_id: None,
            codename: item.codename(),
            item_type: &item.system.item_type,
            url_slug: slug,
            text: None,
        };
        match resolver(&ctx) {
            Some(ResolvedLink::Url(url)) => Some(url),
            Some(ResolvedLink::Html(_)) => {
                self.config.diagnostic(
                    "url_slug_resolved_to_html",
                    item.codename(),
                    "URL slug elements need a URL, HTML result ignored",
                );
                None
            }
            None => None,
        }
    }

    /// Resolves every rich-text field against the complete graph.
    ///
    /// Items embedded in rich text are resolved before the items embedding
    /// them, so a resolver rendering an embedded item sees its final
    /// `resolved_html`. On a cycle the item further up the stack is seen
    /// unresolved. `roots` are resolved first.
    fn finish(&self, processed: ProcessedItems, roots: &[String]) -> Result<ItemGraph, MappingError> {
        let mut graph = processed.into_graph();
        let resolver = RichTextResolver::new(&self.registry, &self.config);
        let codenames: Vec<String> = roots
            .iter()
            .cloned()
            .chain(graph.iter().map(|item| item.codename().to_string()))
            .collect();

        let mut pass = RichTextPass::default();
        for codename in &codenames {
            self.resolve_rich_text(codename, &mut graph, &resolver, &mut pass)?;
        }
        trace!(items = pass.resolved.len(), "Rich text resolved for graph");
        Ok(graph)
    }

    fn resolve_rich_text(
        &self,
        codename: &str,
        graph: &mut ItemGraph,
        resolver: &RichTextResolver<'_>,
        pass: &mut RichTextPass,
    ) -> Result<(), MappingError> {
        if pass.resolved.contains(codename) || !pass.in_progress.insert(codename.to_string()) {
            return Ok(());
        }
        let Some(item) = graph.get(codename) else {
            pass.in_progress.remove(codename);
            return Ok(());
        };

        let embedded: Vec<String> = item
            .rich_text_fields()
            .flat_map(|rich_text| embedded_codenames(&rich_text.html))
            .filter(|embedded| *embedded != codename)
            .map(ToString::to_string)
            .collect();
        for embedded in &embedded {
            self.resolve_rich_text(embedded, graph, resolver, pass)?;
        }

        let mut updates = Vec::new();
        if let Some(item) = graph.get(codename) {
            for (position, field) in item.fields.iter().enumerate() {
                let FieldValue::RichText(rich_text) = &field.value else {
                    continue;
                };
                let input = RichTextInput {
                    item_codename: codename,
                    element: &field.codename,
                    html: &rich_text.html,
                    images: &rich_text.images,
                    links: &rich_text.links,
                };
                updates.push((position, resolver.resolve(&input, graph)?));
            }
        }

        if let Some(item) = graph.get_mut(codename) {
            for (position, resolved) in updates {
                if let Some(FieldValue::RichText(rich_text)) =
                    item.fields.get_mut(position).map(|field| &mut field.value)
                {
                    rich_text.resolved_html = resolved.html;
                    rich_text.linked_items = resolved.linked_items;
                    rich_text.components = resolved.components;
                }
            }
        }

        pass.in_progress.remove(codename);
        pass.resolved.insert(codename.to_string());
        Ok(())
    }
}

/// Bookkeeping for the depth-first rich-text pass.
#[derive(Debug, Default)]
struct RichTextPass {
    resolved: HashSet<String>,
    in_progress: HashSet<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::mapping::config::ErrorMode;

    fn raw(value: &Value) -> RawItem {
        RawItem::from_value(value).unwrap()
    }

    fn movie(codename: &str, stars: &[&str]) -> RawItem {
        raw(&json!({
            "system": {"id": codename, "codename": codename, "type": "movie"},
            "elements": {
                "title": {"type": "text", "name": "Title", "value": codename},
                "stars": {"type": "modular_content", "name": "Stars", "value": stars}
            }
        }))
    }

    fn actor(codename: &str, movies: &[&str]) -> RawItem {
        raw(&json!({
            "system": {"id": codename, "codename": codename, "type": "actor"},
            "elements": {
                "first_name": {"type": "text", "name": "First name", "value": codename},
                "movies": {"type": "modular_content", "name": "Movies", "value": movies}
            }
        }))
    }

    fn linked(items: Vec<RawItem>) -> RawItemMap {
        items
            .into_iter()
            .map(|item| (item.codename().to_string(), item))
            .collect()
    }

    #[test]
    fn test_processed_items_tracks_reservations() {
        let mut processed = ProcessedItems::new();
        processed.reserve("a");
        assert!(processed.contains("a"));
        assert!(processed.get("a").is_none());
        assert!(processed.is_empty());
    }

    #[test]
    fn test_map_generic_item_uses_codenames() {
        let mapper = ItemMapper::default();
        let mapped = mapper.map_item(&movie("warrior", &[]), &RawItemMap::new()).unwrap();
        let item = mapped.item();
        assert!(item.is_generic());
        assert_eq!(item.text("title"), Some("warrior"));
        assert!(item.raw.is_some());
    }

    #[test]
    fn test_map_registered_type_renames_properties() {
        let mut registry = TypeRegistry::new();
        registry.register(TypeDescriptor::new("movie").with_property("title", "name"));
        let mapper = ItemMapper::new(registry, MapperConfig::default());
        let mapped = mapper.map_item(&movie("warrior", &[]), &RawItemMap::new()).unwrap();
        assert_eq!(mapped.item().content_type.as_deref(), Some("movie"));
        assert_eq!(mapped.item().text("name"), Some("warrior"));
        assert!(mapped.item().field("title").is_none());
    }

    #[test]
    fn test_cycle_maps_each_item_once() {
        let mapper = ItemMapper::default();
        let siblings = linked(vec![actor("tom_hardy", &["warrior"]), movie("warrior", &["tom_hardy"])]);
        let mapped = mapper.map_item(&movie("warrior", &["tom_hardy"]), &siblings).unwrap();

        assert_eq!(mapped.graph.len(), 2);
        let tom = &mapped.graph.linked_items(mapped.item(), "stars")[0];
        let back = mapped.graph.linked_items(tom, "movies");
        assert_eq!(back.len(), 1);
        assert!(std::ptr::eq(back[0], mapped.item()));
    }

    #[test]
    fn test_missing_linked_item_lenient_drops_reference() {
        let mapper = ItemMapper::default();
        let mapped = mapper
            .map_item(&movie("warrior", &["tom_hardy", "ghost"]), &linked(vec![actor("tom_hardy", &[])]))
            .unwrap();
        assert_eq!(mapped.item().linked_codenames("stars"), ["tom_hardy".to_string()]);
    }

    #[test]
    fn test_missing_linked_item_strict_fails() {
        let config = MapperConfig::new().with_missing_linked_items(ErrorMode::Strict);
        let mapper = ItemMapper::new(TypeRegistry::new(), config);
        let err = mapper
            .map_item(&movie("warrior", &["ghost"]), &RawItemMap::new())
            .unwrap_err();
        assert!(matches!(err, MappingError::LinkedItemNotFound { ref linked, .. } if linked == "ghost"));
    }

    #[test]
    fn test_unknown_field_type_strict_and_lenient() {
        let item = raw(&json!({
            "system": {"id": "1", "codename": "odd", "type": "movie"},
            "elements": {
                "title": {"type": "text", "name": "Title", "value": "Odd"},
                "gizmo": {"type": "custom_gizmo", "name": "Gizmo", "value": 1}
            }
        }));

        let err = ItemMapper::default().map_item(&item, &RawItemMap::new()).unwrap_err();
        assert!(matches!(err, MappingError::UnsupportedFieldType { .. }));

        let lenient = ItemMapper::new(
            TypeRegistry::new(),
            MapperConfig::new().with_unknown_field_types(ErrorMode::Lenient),
        );
        let mapped = lenient.map_item(&item, &RawItemMap::new()).unwrap();
        assert_eq!(mapped.item().fields.len(), 1);
        assert!(mapped.item().element("gizmo").is_none());
    }

    #[test]
    fn test_url_slug_per_query_resolver_wins() {
        let item = raw(&json!({
            "system": {"id": "1", "codename": "warrior", "type": "movie"},
            "elements": {"slug": {"type": "url_slug", "name": "Slug", "value": "warrior"}}
        }));
        let mut registry = TypeRegistry::new();
        registry.register(
            TypeDescriptor::new("movie")
                .with_link_resolver(|ctx| Some(ResolvedLink::Url(format!("/type/{}", ctx.url_slug)))),
        );

        let by_type = ItemMapper::new(registry.clone(), MapperConfig::default());
        let mapped = by_type.map_item(&item, &RawItemMap::new()).unwrap();
        assert_eq!(mapped.item().url_slug("slug").unwrap().url.as_deref(), Some("/type/warrior"));

        let per_query = by_type.with_config(
            MapperConfig::new()
                .with_url_slug_resolver(|ctx| Some(ResolvedLink::Url(format!("/query/{}", ctx.url_slug)))),
        );
        let mapped = per_query.map_item(&item, &RawItemMap::new()).unwrap();
        assert_eq!(mapped.item().url_slug("slug").unwrap().url.as_deref(), Some("/query/warrior"));
    }

    #[test]
    fn test_url_slug_without_resolver_is_unresolved() {
        let item = raw(&json!({
            "system": {"id": "1", "codename": "warrior", "type": "movie"},
            "elements": {"slug": {"type": "url_slug", "name": "Slug", "value": "warrior"}}
        }));
        let mapped = ItemMapper::default().map_item(&item, &RawItemMap::new()).unwrap();
        let slug = mapped.item().url_slug("slug").unwrap();
        assert_eq!(slug.slug, "warrior");
        assert!(slug.url.is_none());
    }

    #[test]
    fn test_map_items_shares_graph() {
        let mapper = ItemMapper::default();
        let siblings = linked(vec![actor("tom_hardy", &[])]);
        let mapped = mapper
            .map_items(&[movie("warrior", &["tom_hardy"]), movie("inception", &["tom_hardy"])], &siblings)
            .unwrap();
        assert_eq!(mapped.len(), 2);
        assert_eq!(mapped.graph.len(), 3);
        let titles: Vec<_> = mapped.items().filter_map(|item| item.text("title")).collect();
        assert_eq!(titles, ["warrior", "inception"]);
    }

    #[test]
    fn test_include_raw_disabled() {
        let mapper = ItemMapper::new(TypeRegistry::new(), MapperConfig::new().with_include_raw(false));
        let mapped = mapper.map_item(&movie("warrior", &[]), &RawItemMap::new()).unwrap();
        assert!(mapped.item().raw.is_none());
    }

    #[test]
    fn test_cast_rejects_other_type() {
        #[derive(Debug)]
        struct Actor;

        impl ContentModel for Actor {
            const TYPE: &'static str = "actor";

            fn from_item(_item: &ContentItem, _graph: &ItemGraph) -> Result<Self, MappingError> {
                Ok(Self)
            }
        }

        let mapped = ItemMapper::default().map_item(&movie("warrior", &[]), &RawItemMap::new()).unwrap();
        let err = mapped.cast::<Actor>().unwrap_err();
        assert!(matches!(err, MappingError::ModelConversion { .. }));
    }
}
