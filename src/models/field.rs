//! Typed field values produced by the field mapper.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Declared element type of a raw field.
///
/// The set is closed: every type string the delivery API emits for item
/// elements maps to exactly one variant, anything else is rejected by
/// [`FieldType::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Number,
    DateTime,
    MultipleChoice,
    Asset,
    RichText,
    UrlSlug,
    Taxonomy,
    /// Linked items (`modular_content` on the wire).
    ModularContent,
}

impl FieldType {
    /// Parses the wire type string. Returns `None` for unknown types.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "text" => Some(Self::Text),
            "number" => Some(Self::Number),
            "date_time" => Some(Self::DateTime),
            "multiple_choice" => Some(Self::MultipleChoice),
            "asset" => Some(Self::Asset),
            "rich_text" => Some(Self::RichText),
            "url_slug" => Some(Self::UrlSlug),
            "taxonomy" => Some(Self::Taxonomy),
            "modular_content" => Some(Self::ModularContent),
            _ => None,
        }
    }

    /// Returns the wire type string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::DateTime => "date_time",
            Self::MultipleChoice => "multiple_choice",
            Self::Asset => "asset",
            Self::RichText => "rich_text",
            Self::UrlSlug => "url_slug",
            Self::Taxonomy => "taxonomy",
            Self::ModularContent => "modular_content",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A selected (or available) multiple-choice option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub name: String,
    pub codename: String,
}

/// An asset attached to an asset element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub name: String,
    #[serde(rename = "type", default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// A single taxonomy term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyTerm {
    pub name: String,
    pub codename: String,
}

/// Terms selected in a taxonomy element plus the taxonomy group they belong to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TaxonomyValue {
    pub group: Option<String>,
    pub terms: Vec<TaxonomyTerm>,
}

/// URL slug element: the raw slug and the URL produced by a link resolver.
///
/// `url` stays `None` when no link resolver applies to the item.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct UrlSlug {
    pub slug: String,
    pub url: Option<String>,
}

/// Image embedded in a rich-text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextImage {
    pub image_id: String,
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// Target of a hyperlink placeholder inside rich text, keyed by link id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemLink {
    pub codename: String,
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default)]
    pub url_slug: String,
}

/// Rich-text element value.
///
/// `html` is the HTML exactly as delivered, placeholders included.
/// `resolved_html`, `linked_items` and `components` are filled in once the
/// whole response graph has been built.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RichText {
    pub html: String,
    pub resolved_html: String,
    pub images: Vec<RichTextImage>,
    pub links: BTreeMap<String, ItemLink>,
    /// Codenames the server declared as referenced by this element.
    pub modular_content: Vec<String>,
    /// Linked items actually dereferenced during resolution.
    pub linked_items: Vec<String>,
    /// Components actually dereferenced during resolution.
    pub components: Vec<String>,
}

impl RichText {
    /// Finds an embedded image by id.
    #[must_use]
    pub fn image(&self, image_id: &str) -> Option<&RichTextImage> {
        self.images.iter().find(|image| image.image_id == image_id)
    }
}

/// Typed value of one element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Number(Option<f64>),
    DateTime(Option<DateTime<Utc>>),
    MultipleChoice(Vec<ChoiceOption>),
    Asset(Vec<Asset>),
    Taxonomy(TaxonomyValue),
    UrlSlug(UrlSlug),
    /// Codenames of linked items, in declared order. Each codename refers to
    /// an entry of the response's [`ItemGraph`](super::ItemGraph).
    LinkedItems(Vec<String>),
    RichText(RichText),
}

impl FieldValue {
    /// Returns the declared type this value was mapped from.
    #[must_use]
    pub fn field_type(&self) -> FieldType {
        match self {
            Self::Text(_) => FieldType::Text,
            Self::Number(_) => FieldType::Number,
            Self::DateTime(_) => FieldType::DateTime,
            Self::MultipleChoice(_) => FieldType::MultipleChoice,
            Self::Asset(_) => FieldType::Asset,
            Self::Taxonomy(_) => FieldType::Taxonomy,
            Self::UrlSlug(_) => FieldType::UrlSlug,
            Self::LinkedItems(_) => FieldType::ModularContent,
            Self::RichText(_) => FieldType::RichText,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(number) => *number,
            _ => None,
        }
    }

    #[must_use]
    pub fn as_date_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::DateTime(value) => *value,
            _ => None,
        }
    }

    #[must_use]
    pub fn as_rich_text(&self) -> Option<&RichText> {
        match self {
            Self::RichText(rich_text) => Some(rich_text),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_url_slug(&self) -> Option<&UrlSlug> {
        match self {
            Self::UrlSlug(slug) => Some(slug),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_linked_items(&self) -> Option<&[String]> {
        match self {
            Self::LinkedItems(codenames) => Some(codenames),
            _ => None,
        }
    }
}

/// One mapped element of a content item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    /// Element codename as delivered.
    pub codename: String,
    /// Property name chosen by the naming strategies of the item's type.
    pub property: String,
    /// Display name of the element.
    pub name: String,
    pub value: FieldValue,
}

impl Field {
    #[must_use]
    pub fn field_type(&self) -> FieldType {
        self.value.field_type()
    }
}
