//! Item mapping: raw response items to a typed item graph.
//!
//! Mapping runs in two phases. The first converts every element of the
//! requested items and, recursively, of the linked items they reach, into an
//! [`ItemGraph`](crate::models::ItemGraph); a processed-items set guarantees
//! each codename is mapped once even when content references form cycles.
//! The second resolves rich text against the complete graph.
//!
//! # Example
//!
//! ```
//! use delivery_core::mapping::{ItemMapper, MapperConfig, TypeRegistry};
//! use delivery_core::models::{RawItem, RawItemMap};
//! use serde_json::json;
//!
//! let raw = RawItem::from_value(&json!({
//!     "system": {"id": "1", "codename": "warrior", "type": "movie"},
//!     "elements": {"title": {"type": "text", "name": "Title", "value": "Warrior"}}
//! }))
//! .unwrap();
//!
//! let mapper = ItemMapper::new(TypeRegistry::new(), MapperConfig::default());
//! let mapped = mapper.map_item(&raw, &RawItemMap::new()).unwrap();
//! assert_eq!(mapped.item().text("title"), Some("Warrior"));
//! ```

mod config;
mod error;
mod field;
mod mapper;
mod registry;

pub use config::{
    ErrorMode, ImageContext, ImageResolverFn, LinkContext, LinkResolverFn, MapperConfig,
    PropertyResolverFn, Relation, ResolvedLink, RichTextContext, RichTextResolverFn,
};
pub use error::MappingError;
pub use mapper::{ItemMapper, MappedItem, MappedItems, ProcessedItems, cast_item};
pub use registry::{ContentModel, TypeDescriptor, TypeRegistry, property_name};
