//! Type registry: content-type codename to type descriptor.
//!
//! The [`TypeRegistry`] replaces runtime class lookup. A registered
//! [`TypeDescriptor`] declares how element codenames become property names
//! and which resolvers apply to items of that type. Types without a
//! registration are mapped as generic items.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::config::{
    LinkContext, LinkResolverFn, PropertyResolverFn, ResolvedLink, RichTextContext,
    RichTextResolverFn,
};
use super::error::MappingError;
use crate::models::{ContentItem, ItemGraph};

/// Mapping behaviour declared for one content type.
#[derive(Clone)]
pub struct TypeDescriptor {
    codename: String,
    properties: HashMap<String, String>,
    property_resolver: Option<PropertyResolverFn>,
    rich_text_resolver: Option<RichTextResolverFn>,
    link_resolver: Option<LinkResolverFn>,
}

impl TypeDescriptor {
    /// Creates a descriptor with no property table and no resolvers.
    #[must_use]
    pub fn new(codename: impl Into<String>) -> Self {
        Self {
            codename: codename.into(),
            properties: HashMap::new(),
            property_resolver: None,
            rich_text_resolver: None,
            link_resolver: None,
        }
    }

    /// Declares a static property name for an element codename.
    #[must_use]
    pub fn with_property(mut self, element: impl Into<String>, property: impl Into<String>) -> Self {
        self.properties.insert(element.into(), property.into());
        self
    }

    /// Sets a property resolver, consulted before the static table.
    #[must_use]
    pub fn with_property_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.property_resolver = Some(Arc::new(resolver));
        self
    }

    /// Sets the HTML resolver used when items of this type are embedded in rich text.
    #[must_use]
    pub fn with_rich_text_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&ContentItem, &RichTextContext<'_>) -> Option<String> + Send + Sync + 'static,
    {
        self.rich_text_resolver = Some(Arc::new(resolver));
        self
    }

    /// Sets the link resolver for URL slugs of this type and links pointing at it.
    #[must_use]
    pub fn with_link_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&LinkContext<'_>) -> Option<ResolvedLink> + Send + Sync + 'static,
    {
        self.link_resolver = Some(Arc::new(resolver));
        self
    }

    #[must_use]
    pub fn codename(&self) -> &str {
        &self.codename
    }

    #[must_use]
    pub fn rich_text_resolver(&self) -> Option<&RichTextResolverFn> {
        self.rich_text_resolver.as_ref()
    }

    #[must_use]
    pub fn link_resolver(&self) -> Option<&LinkResolverFn> {
        self.link_resolver.as_ref()
    }

    /// Resolves the property name for an element codename.
    ///
    /// Strategies in order: property resolver, static table, the codename
    /// itself. The first one producing a name wins.
    #[must_use]
    pub fn property_name(&self, element: &str) -> String {
        if let Some(name) = self
            .property_resolver
            .as_ref()
            .and_then(|resolver| resolver(element))
        {
            return name;
        }
        if let Some(name) = self.properties.get(element) {
            return name.clone();
        }
        element.to_string()
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("codename", &self.codename)
            .field("properties", &self.properties)
            .field("property_resolver", &self.property_resolver.is_some())
            .field("rich_text_resolver", &self.rich_text_resolver.is_some())
            .field("link_resolver", &self.link_resolver.is_some())
            .finish()
    }
}

/// A Rust type that can be produced from a mapped item.
///
/// Registering a model with [`TypeRegistry::register_model`] registers its
/// descriptor; [`crate::mapping::MappedItem::cast`] then builds the model
/// from the response graph.
pub trait ContentModel: Sized {
    /// Content-type codename the model corresponds to.
    const TYPE: &'static str;

    /// Descriptor registered for the type. Defaults to codename-only naming.
    #[must_use]
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new(Self::TYPE)
    }

    /// Builds the model from a mapped item.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::ModelConversion`] when the item lacks data the
    /// model requires.
    fn from_item(item: &ContentItem, graph: &ItemGraph) -> Result<Self, MappingError>;
}

/// Registered content types keyed by codename.
#[derive(Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<String, TypeDescriptor>,
}

impl TypeRegistry {
    /// Creates an empty registry; every item maps as generic.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a descriptor, replacing any earlier one for the same type.
    pub fn register(&mut self, descriptor: TypeDescriptor) {
        debug!(content_type = descriptor.codename(), "Registering content type");
        self.types
            .insert(descriptor.codename().to_string(), descriptor);
    }

    /// Registers the descriptor of a [`ContentModel`].
    pub fn register_model<T: ContentModel>(&mut self) {
        self.register(T::descriptor());
    }

    /// Looks up the descriptor for a content type. `None` means generic item.
    #[must_use]
    pub fn resolve(&self, content_type: &str) -> Option<&TypeDescriptor> {
        self.types.get(content_type)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("TypeRegistry")
            .field("type_count", &self.types.len())
            .field("types", &names)
            .finish()
    }
}

/// Property name for an element of an item mapped with `descriptor`.
///
/// Generic items keep the element codename.
#[must_use]
pub fn property_name(descriptor: Option<&TypeDescriptor>, element: &str) -> String {
    descriptor.map_or_else(|| element.to_string(), |d| d.property_name(element))
}
