//! Data model: raw API payloads and the typed items mapped from them.

mod field;
mod item;
mod raw;

pub use field::{
    Asset, ChoiceOption, Field, FieldType, FieldValue, ItemLink, RichText, RichTextImage,
    TaxonomyTerm, TaxonomyValue, UrlSlug,
};
pub use item::{ContentItem, ItemGraph};
pub use raw::{ItemSystem, RawElement, RawItem, RawItemMap, raw_item_map_from_value};
