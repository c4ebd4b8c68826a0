//! Mapped content items and the per-response item graph.

use std::collections::HashMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use super::field::{Field, FieldValue, RichText, UrlSlug};
use super::raw::ItemSystem;

/// A mapped content item.
///
/// `content_type` is the registered type the item was mapped with, or `None`
/// when no type was registered for `system.type` and the item was mapped as
/// a generic item (fields keyed by element codename).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentItem {
    pub system: ItemSystem,
    pub content_type: Option<String>,
    pub fields: Vec<Field>,
    /// The raw JSON this item was mapped from, when enabled in the mapper config.
    #[serde(rename = "_raw", skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
}

impl ContentItem {
    #[must_use]
    pub fn codename(&self) -> &str {
        &self.system.codename
    }

    /// Returns true when no registered type matched this item.
    #[must_use]
    pub fn is_generic(&self) -> bool {
        self.content_type.is_none()
    }

    /// Looks up a field by its resolved property name.
    #[must_use]
    pub fn field(&self, property: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.property == property)
    }

    /// Looks up a field by its element codename, regardless of property naming.
    #[must_use]
    pub fn element(&self, codename: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.codename == codename)
    }

    #[must_use]
    pub fn value(&self, property: &str) -> Option<&FieldValue> {
        self.field(property).map(|field| &field.value)
    }

    #[must_use]
    pub fn text(&self, property: &str) -> Option<&str> {
        self.value(property).and_then(FieldValue::as_text)
    }

    #[must_use]
    pub fn number(&self, property: &str) -> Option<f64> {
        self.value(property).and_then(FieldValue::as_number)
    }

    #[must_use]
    pub fn rich_text(&self, property: &str) -> Option<&RichText> {
        self.value(property).and_then(FieldValue::as_rich_text)
    }

    #[must_use]
    pub fn url_slug(&self, property: &str) -> Option<&UrlSlug> {
        self.value(property).and_then(FieldValue::as_url_slug)
    }

    /// Codenames referenced by a linked-items field, in declared order.
    #[must_use]
    pub fn linked_codenames(&self, property: &str) -> &[String] {
        self.value(property)
            .and_then(FieldValue::as_linked_items)
            .unwrap_or_default()
    }

    /// Iterates over every rich-text field of the item.
    pub fn rich_text_fields(&self) -> impl Iterator<Item = &RichText> {
        self.fields
            .iter()
            .filter_map(|field| field.value.as_rich_text())
    }
}

/// Arena of the items mapped from one response, keyed by codename.
///
/// Every codename appears once; linked-items fields refer to entries of the
/// graph by codename, so cyclic content references resolve to the same entry
/// from every direction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemGraph {
    items: Vec<ContentItem>,
    index: HashMap<String, usize>,
}

impl ItemGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, codename: &str) -> Option<&ContentItem> {
        self.index.get(codename).map(|&position| &self.items[position])
    }

    #[must_use]
    pub fn contains(&self, codename: &str) -> bool {
        self.index.contains_key(codename)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over items in the order mapping completed them.
    pub fn iter(&self) -> impl Iterator<Item = &ContentItem> {
        self.items.iter()
    }

    /// Dereferences a linked-items field of `item` into graph entries.
    ///
    /// Codenames with no graph entry are skipped.
    #[must_use]
    pub fn linked_items<'a>(&'a self, item: &ContentItem, property: &str) -> Vec<&'a ContentItem> {
        item.linked_codenames(property)
            .iter()
            .filter_map(|codename| self.get(codename))
            .collect()
    }

    /// Inserts an item, replacing any earlier entry with the same codename.
    pub(crate) fn insert(&mut self, item: ContentItem) {
        if let Some(&position) = self.index.get(item.codename()) {
            self.items[position] = item;
            return;
        }
        self.index
            .insert(item.codename().to_string(), self.items.len());
        self.items.push(item);
    }

    pub(crate) fn get_mut(&mut self, codename: &str) -> Option<&mut ContentItem> {
        let position = *self.index.get(codename)?;
        self.items.get_mut(position)
    }
}

impl Serialize for ItemGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.items.len()))?;
        for item in &self.items {
            map.serialize_entry(item.codename(), item)?;
        }
        map.end()
    }
}
