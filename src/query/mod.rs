//! Query layer: URL building, HTTP execution and response envelopes.
//!
//! This is thin glue around `reqwest`. It fetches raw JSON, validates the
//! envelope and hands the items to the [`ItemMapper`](crate::mapping::ItemMapper).

mod client;
mod endpoint;
mod error;
mod response;

pub use client::{CONTINUATION_HEADER, DeliveryClient};
pub use endpoint::{
    DEFAULT_BASE_URL, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS, DeliveryConfig, Endpoint,
    Filter, ItemsQuery, Order, build_url,
};
pub use error::DeliveryError;
pub use response::{
    ContentTypesResponse, ItemListingResponse, ItemResponse, ItemsFeedResponse, Pagination,
    ResponseDebug, TaxonomiesResponse, item_envelope, listing_envelope,
};
