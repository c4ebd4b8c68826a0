//! Content-type and taxonomy metadata.
//!
//! The types and taxonomies endpoints describe the shape of content rather
//! than content itself. Elements are mapped generically: no type registry is
//! involved.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::mapping::MappingError;
use crate::models::{ChoiceOption, FieldType};

/// Element definition of a content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementDescriptor {
    pub codename: String,
    pub name: String,
    /// Declared type string, kept verbatim so unknown types survive.
    pub element_type: String,
    /// Allowed options of a multiple-choice element.
    pub options: Vec<ChoiceOption>,
    /// Taxonomy group of a taxonomy element.
    pub taxonomy_group: Option<String>,
}

impl ElementDescriptor {
    /// Parsed element type, `None` for types this crate does not know.
    #[must_use]
    pub fn field_type(&self) -> Option<FieldType> {
        FieldType::parse(&self.element_type)
    }
}

#[derive(Debug, Deserialize)]
struct RawElementDescriptor {
    #[serde(rename = "type")]
    element_type: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    codename: Option<String>,
    #[serde(default)]
    options: Vec<ChoiceOption>,
    #[serde(default)]
    taxonomy_group: Option<String>,
}

/// Maps one element definition.
///
/// `codename` is the key the element was listed under; the endpoint for a
/// single element also echoes it in the payload, which then takes precedence.
///
/// # Errors
///
/// Returns [`MappingError::MalformedResponse`] when `value` is null or not an
/// element definition.
pub fn map_element(codename: &str, value: &Value) -> Result<ElementDescriptor, MappingError> {
    if value.is_null() {
        return Err(MappingError::malformed(codename, "element definition is null"));
    }
    let raw: RawElementDescriptor = serde_json::from_value(value.clone())
        .map_err(|e| MappingError::malformed(codename, &format!("invalid element definition: {e}")))?;

    trace!(codename, element_type = %raw.element_type, "Mapped element definition");
    Ok(ElementDescriptor {
        codename: raw.codename.unwrap_or_else(|| codename.to_string()),
        name: raw.name,
        element_type: raw.element_type,
        options: raw.options,
        taxonomy_group: raw.taxonomy_group,
    })
}

/// System attributes of a content type or taxonomy group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataSystem {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub codename: String,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
}

/// A content type with its element definitions, keyed by element codename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentTypeDescriptor {
    pub system: MetadataSystem,
    pub elements: BTreeMap<String, ElementDescriptor>,
}

impl ContentTypeDescriptor {
    #[must_use]
    pub fn codename(&self) -> &str {
        &self.system.codename
    }

    #[must_use]
    pub fn element(&self, codename: &str) -> Option<&ElementDescriptor> {
        self.elements.get(codename)
    }
}

/// Maps a content type from the types endpoint.
///
/// # Errors
///
/// Returns [`MappingError::MalformedResponse`] when `system` or `elements`
/// is missing, or when an element definition is invalid.
pub fn map_content_type(value: &Value) -> Result<ContentTypeDescriptor, MappingError> {
    let system = metadata_system(value, "content type")?;
    let Some(elements) = value.get("elements").and_then(Value::as_object) else {
        return Err(MappingError::malformed(
            &system.codename,
            "content type has no `elements` object",
        ));
    };

    let elements = elements
        .iter()
        .map(|(codename, element)| Ok((codename.clone(), map_element(codename, element)?)))
        .collect::<Result<BTreeMap<_, _>, MappingError>>()?;

    Ok(ContentTypeDescriptor { system, elements })
}

/// A taxonomy term; terms nest arbitrarily deep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub name: String,
    pub codename: String,
    #[serde(default)]
    pub terms: Vec<Term>,
}

/// A taxonomy group with its term tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxonomyGroup {
    pub system: MetadataSystem,
    pub terms: Vec<Term>,
}

impl TaxonomyGroup {
    #[must_use]
    pub fn codename(&self) -> &str {
        &self.system.codename
    }

    /// Finds a term anywhere in the tree.
    #[must_use]
    pub fn find_term(&self, codename: &str) -> Option<&Term> {
        fn find<'a>(terms: &'a [Term], codename: &str) -> Option<&'a Term> {
            terms.iter().find_map(|term| {
                if term.codename == codename {
                    Some(term)
                } else {
                    find(&term.terms, codename)
                }
            })
        }
        find(&self.terms, codename)
    }
}

/// Maps a taxonomy group from the taxonomies endpoint.
///
/// # Errors
///
/// Returns [`MappingError::MalformedResponse`] when `system` is missing or
/// the term tree is invalid.
pub fn map_taxonomy(value: &Value) -> Result<TaxonomyGroup, MappingError> {
    let system = metadata_system(value, "taxonomy group")?;
    let terms = match value.get("terms") {
        None | Some(Value::Null) => Vec::new(),
        Some(terms) => serde_json::from_value(terms.clone()).map_err(|e| {
            MappingError::malformed(&system.codename, &format!("invalid taxonomy terms: {e}"))
        })?,
    };
    Ok(TaxonomyGroup { system, terms })
}

fn metadata_system(value: &Value, what: &str) -> Result<MetadataSystem, MappingError> {
    let Some(system) = value.get("system").filter(|system| system.is_object()) else {
        return Err(MappingError::malformed(
            "<unknown>",
            &format!("{what} has no `system` attributes"),
        ));
    };
    serde_json::from_value(system.clone())
        .map_err(|e| MappingError::malformed("<unknown>", &format!("invalid {what} system: {e}")))
}
