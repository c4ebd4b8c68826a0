//! Content Delivery Core Library
//!
//! Client SDK for a headless content-delivery API. It builds query URLs,
//! executes them, and maps the returned JSON into a graph of typed content
//! items with rich text resolved.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`models`] - Raw payloads, typed field values and the item graph
//! - [`mapping`] - Type registry, mapper configuration and the item mapper
//! - [`rich_text`] - Placeholder resolution inside rich-text elements
//! - [`elements`] - Content-type and taxonomy metadata
//! - [`query`] - URL building, HTTP client and response envelopes
//!
//! Mapping is synchronous and never touches the network; [`query`] is the
//! only async part.

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod elements;
pub mod mapping;
pub mod models;
pub mod query;
pub mod rich_text;

mod user_agent;

// Re-export commonly used types
pub use elements::{ContentTypeDescriptor, ElementDescriptor, TaxonomyGroup};
pub use mapping::{
    ContentModel, ErrorMode, ItemMapper, MappedItem, MappedItems, MapperConfig, MappingError,
    TypeDescriptor, TypeRegistry,
};
pub use models::{ContentItem, FieldType, FieldValue, ItemGraph, RawItem, RawItemMap};
pub use query::{DeliveryClient, DeliveryConfig, DeliveryError, ItemsQuery};
