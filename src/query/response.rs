//! Response envelopes.
//!
//! Raw envelopes are validated here before any mapping happens: every item
//! node must carry `system` and `elements`, otherwise the response is
//! rejected as malformed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::elements::{ContentTypeDescriptor, TaxonomyGroup};
use crate::mapping::{MappedItem, MappedItems, MappingError};
use crate::models::{RawItem, RawItemMap, raw_item_map_from_value};

/// Paging information of a listing response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: u64,
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub count: u64,
    /// Present when the query asked for `includeTotalCount`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub next_page: String,
}

/// Request details kept alongside a mapped response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseDebug {
    pub url: String,
    /// Response body as received, when raw payloads are enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
}

/// Response of the single-item endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemResponse {
    pub item: MappedItem,
    pub debug: ResponseDebug,
}

/// Response of the item listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemListingResponse {
    pub items: MappedItems,
    pub pagination: Option<Pagination>,
    pub debug: ResponseDebug,
}

/// One page of the items feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemsFeedResponse {
    pub items: MappedItems,
    /// `X-Continuation` header value; `None` on the last page.
    pub continuation_token: Option<String>,
    pub debug: ResponseDebug,
}

impl ItemsFeedResponse {
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.continuation_token.is_some()
    }
}

/// Response of the content types listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentTypesResponse {
    pub types: Vec<ContentTypeDescriptor>,
    pub pagination: Option<Pagination>,
}

/// Response of the taxonomies listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxonomiesResponse {
    pub taxonomies: Vec<TaxonomyGroup>,
    pub pagination: Option<Pagination>,
}

/// Splits a single-item payload into the item and its linked items.
///
/// # Errors
///
/// Returns [`MappingError::MalformedResponse`] when `item` is missing or any
/// node is malformed.
pub fn item_envelope(body: &Value) -> Result<(RawItem, RawItemMap), MappingError> {
    let Some(item) = body.get("item") else {
        return Err(MappingError::malformed("<response>", "response has no `item`"));
    };
    let item = RawItem::from_value(item)?;
    let linked = raw_item_map_from_value(body.get("modular_content"))?;
    Ok((item, linked))
}

/// Splits a listing or feed payload into items, linked items and pagination.
///
/// # Errors
///
/// Returns [`MappingError::MalformedResponse`] when `items` is not an array
/// or any node is malformed.
pub fn listing_envelope(
    body: &Value,
) -> Result<(Vec<RawItem>, RawItemMap, Option<Pagination>), MappingError> {
    let Some(nodes) = body.get("items").and_then(Value::as_array) else {
        return Err(MappingError::malformed("<response>", "response has no `items` array"));
    };
    let items = nodes
        .iter()
        .map(RawItem::from_value)
        .collect::<Result<Vec<_>, _>>()?;
    let linked = raw_item_map_from_value(body.get("modular_content"))?;
    let pagination = pagination(body)?;
    Ok((items, linked, pagination))
}

/// Extracts `pagination` if the payload has one.
///
/// # Errors
///
/// Returns [`MappingError::MalformedResponse`] when the object is invalid.
pub fn pagination(body: &Value) -> Result<Option<Pagination>, MappingError> {
    match body.get("pagination") {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| MappingError::malformed("<response>", &format!("invalid pagination: {e}"))),
    }
}
