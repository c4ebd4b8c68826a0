//! Conversion of raw element values into typed field values.
//!
//! Linked items and URL slugs need the surrounding mapping pass and are
//! finished by the mapper; everything here is a pure function of one element.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::MappingError;
use crate::models::{
    Asset, ChoiceOption, FieldType, RawElement, RichText, TaxonomyTerm, TaxonomyValue,
};

/// Identifies the element being converted, for error messages.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ElementRef<'a> {
    pub codename: &'a str,
    pub element: &'a str,
    pub field_type: FieldType,
}

impl ElementRef<'_> {
    fn invalid(&self, reason: &str) -> MappingError {
        MappingError::invalid_value(self.codename, self.element, self.field_type.as_str(), reason)
    }
}

pub(crate) fn text(at: ElementRef<'_>, element: &RawElement) -> Result<String, MappingError> {
    match &element.value {
        Value::Null => Ok(String::new()),
        Value::String(text) => Ok(text.clone()),
        other => Err(at.invalid(&format!("expected a string, got {}", json_kind(other)))),
    }
}

pub(crate) fn number(at: ElementRef<'_>, element: &RawElement) -> Result<Option<f64>, MappingError> {
    match &element.value {
        Value::Null => Ok(None),
        Value::Number(number) => Ok(number.as_f64()),
        other => Err(at.invalid(&format!("expected a number, got {}", json_kind(other)))),
    }
}

pub(crate) fn date_time(
    at: ElementRef<'_>,
    element: &RawElement,
) -> Result<Option<DateTime<Utc>>, MappingError> {
    match &element.value {
        Value::Null => Ok(None),
        Value::String(raw) if raw.is_empty() => Ok(None),
        Value::String(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|parsed| Some(parsed.with_timezone(&Utc)))
            .map_err(|e| at.invalid(&format!("'{raw}' is not an RFC 3339 timestamp: {e}"))),
        other => Err(at.invalid(&format!("expected a timestamp, got {}", json_kind(other)))),
    }
}

pub(crate) fn multiple_choice(
    at: ElementRef<'_>,
    element: &RawElement,
) -> Result<Vec<ChoiceOption>, MappingError> {
    list(at, &element.value)
}

pub(crate) fn assets(at: ElementRef<'_>, element: &RawElement) -> Result<Vec<Asset>, MappingError> {
    list(at, &element.value)
}

pub(crate) fn taxonomy(
    at: ElementRef<'_>,
    element: &RawElement,
) -> Result<TaxonomyValue, MappingError> {
    let terms: Vec<TaxonomyTerm> = list(at, &element.value)?;
    Ok(TaxonomyValue {
        group: element.taxonomy_group.clone(),
        terms,
    })
}

/// Codenames listed by a linked-items element, in declared order.
pub(crate) fn codenames(at: ElementRef<'_>, element: &RawElement) -> Result<Vec<String>, MappingError> {
    list(at, &element.value)
}

/// Rich text before resolution: raw HTML plus the element's images and links.
pub(crate) fn rich_text(at: ElementRef<'_>, element: &RawElement) -> Result<RichText, MappingError> {
    Ok(RichText {
        html: text(at, element)?,
        resolved_html: String::new(),
        images: element.images.values().cloned().collect(),
        links: element.links.clone(),
        modular_content: element.modular_content.clone(),
        linked_items: Vec::new(),
        components: Vec::new(),
    })
}

fn list<T: DeserializeOwned>(at: ElementRef<'_>, value: &Value) -> Result<Vec<T>, MappingError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(_) => {
            serde_json::from_value(value.clone()).map_err(|e| at.invalid(&e.to_string()))
        }
        other => Err(at.invalid(&format!("expected an array, got {}", json_kind(other)))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
