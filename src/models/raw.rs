//! Raw item payloads as delivered by the API.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::field::{ItemLink, RichTextImage};
use crate::mapping::MappingError;

/// System attributes shared by every content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSystem {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub codename: String,
    #[serde(default)]
    pub language: String,
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sitemap_locations: Vec<String>,
    #[serde(default)]
    pub workflow_step: Option<String>,
}

fn default_collection() -> String {
    "default".to_string()
}

/// A raw element of a content item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawElement {
    #[serde(rename = "type")]
    pub element_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxonomy_group: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modular_content: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub images: BTreeMap<String, RichTextImage>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub links: BTreeMap<String, ItemLink>,
}

/// A raw content item: `system` plus `elements` in payload order.
///
/// The node the item was read from is kept verbatim for debug output.
#[derive(Debug, Clone, PartialEq)]
pub struct RawItem {
    pub system: ItemSystem,
    pub elements: Vec<(String, RawElement)>,
    source: Value,
}

/// Sibling items of a response keyed by codename (`modular_content`).
pub type RawItemMap = BTreeMap<String, RawItem>;

impl RawItem {
    /// Validates and deserializes one item node.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::MalformedResponse`] when the node is not an
    /// object, lacks `system` or `elements`, or does not deserialize.
    pub fn from_value(value: &Value) -> Result<Self, MappingError> {
        let Some(object) = value.as_object() else {
            return Err(MappingError::malformed("<unknown>", "item node is not a JSON object"));
        };

        let codename = object
            .get("system")
            .and_then(|system| system.get("codename"))
            .and_then(Value::as_str)
            .unwrap_or("<unknown>");

        let Some(system) = object.get("system").filter(|system| system.is_object()) else {
            return Err(MappingError::malformed(codename, "missing `system` attributes"));
        };
        let Some(elements) = object.get("elements").and_then(Value::as_object) else {
            return Err(MappingError::malformed(codename, "missing `elements` object"));
        };

        let system = ItemSystem::deserialize(system)
            .map_err(|e| MappingError::malformed(codename, &format!("invalid `system`: {e}")))?;
        let elements = elements
            .iter()
            .map(|(element, node)| {
                RawElement::deserialize(node)
                    .map(|parsed| (element.clone(), parsed))
                    .map_err(|e| {
                        MappingError::malformed(codename, &format!("invalid element '{element}': {e}"))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            system,
            elements,
            source: value.clone(),
        })
    }

    #[must_use]
    pub fn codename(&self) -> &str {
        &self.system.codename
    }

    /// Looks up an element by codename.
    #[must_use]
    pub fn element(&self, codename: &str) -> Option<&RawElement> {
        self.elements
            .iter()
            .find(|(element, _)| element == codename)
            .map(|(_, element)| element)
    }

    /// The JSON node exactly as delivered.
    #[must_use]
    pub fn source(&self) -> &Value {
        &self.source
    }
}

/// Validates and deserializes a `modular_content` object.
///
/// # Errors
///
/// Returns [`MappingError::MalformedResponse`] if the value is neither an
/// object nor null, or if any contained item is malformed.
pub fn raw_item_map_from_value(value: Option<&Value>) -> Result<RawItemMap, MappingError> {
    let mut items = RawItemMap::new();
    let Some(value) = value else {
        return Ok(items);
    };
    if value.is_null() {
        return Ok(items);
    }
    let Some(object) = value.as_object() else {
        return Err(MappingError::malformed(
            "modular_content",
            "linked items payload is not a JSON object",
        ));
    };
    for (codename, node) in object {
        items.insert(codename.clone(), RawItem::from_value(node)?);
    }
    Ok(items)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn movie_json() -> Value {
        json!({
            "system": {
                "id": "0a1b",
                "name": "Warrior",
                "codename": "warrior",
                "language": "en",
                "type": "movie",
                "last_modified": "2024-01-05T10:11:12.1234567Z",
                "sitemap_locations": []
            },
            "elements": {
                "title": {"type": "text", "name": "Title", "value": "Warrior"}
            }
        })
    }

    #[test]
    fn test_raw_item_from_value_parses_system() {
        let item = RawItem::from_value(&movie_json()).unwrap();
        assert_eq!(item.codename(), "warrior");
        assert_eq!(item.system.item_type, "movie");
        assert_eq!(item.system.collection, "default");
        assert!(item.system.last_modified.is_some());
        assert_eq!(item.element("title").unwrap().value, json!("Warrior"));
    }

    #[test]
    fn test_raw_item_missing_system_is_malformed() {
        let err = RawItem::from_value(&json!({"elements": {}})).unwrap_err();
        assert!(matches!(err, MappingError::MalformedResponse { .. }));
        assert!(err.to_string().contains("system"));
    }

    #[test]
    fn test_raw_item_missing_elements_names_codename() {
        let mut value = movie_json();
        value.as_object_mut().unwrap().remove("elements");
        let err = RawItem::from_value(&value).unwrap_err();
        assert!(err.to_string().contains("warrior"));
        assert!(err.to_string().contains("elements"));
    }

    #[test]
    fn test_raw_item_not_an_object_is_malformed() {
        let err = RawItem::from_value(&json!(["warrior"])).unwrap_err();
        assert!(matches!(err, MappingError::MalformedResponse { .. }));
    }

    #[test]
    fn test_raw_item_map_accepts_missing_and_null() {
        assert!(raw_item_map_from_value(None).unwrap().is_empty());
        assert!(raw_item_map_from_value(Some(&Value::Null)).unwrap().is_empty());
    }

    #[test]
    fn test_raw_item_map_keys_by_codename() {
        let payload = json!({"warrior": movie_json()});
        let items = raw_item_map_from_value(Some(&payload)).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items["warrior"].system.name, "Warrior");
    }

    #[test]
    fn test_raw_item_keeps_element_order() {
        let item = RawItem::from_value(&json!({
            "system": {"id": "1", "codename": "warrior", "type": "movie"},
            "elements": {
                "title": {"type": "text", "name": "Title", "value": "Warrior"},
                "stars": {"type": "modular_content", "name": "Stars", "value": []},
                "length": {"type": "number", "name": "Length", "value": 140}
            }
        }))
        .unwrap();
        let order: Vec<_> = item.elements.iter().map(|(codename, _)| codename.as_str()).collect();
        assert_eq!(order, ["title", "stars", "length"]);
    }

    #[test]
    fn test_raw_item_source_is_verbatim() {
        let mut value = movie_json();
        value["system"]["extra"] = json!("kept");
        let item = RawItem::from_value(&value).unwrap();
        assert_eq!(item.source(), &value);
        assert_eq!(item.source()["system"]["last_modified"], "2024-01-05T10:11:12.1234567Z");
    }

    #[test]
    fn test_raw_item_invalid_element_is_malformed() {
        let err = RawItem::from_value(&json!({
            "system": {"id": "1", "codename": "warrior", "type": "movie"},
            "elements": {"title": {"name": "Title"}}
        }))
        .unwrap_err();
        assert!(matches!(err, MappingError::MalformedResponse { .. }));
        assert!(err.to_string().contains("title"));
    }
}
