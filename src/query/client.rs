//! HTTP client for the delivery API.
//!
//! The client executes one request per call and maps the payload once it has
//! been received completely. Retries are left to the caller.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::error::DeliveryError;
use super::response::{
    ContentTypesResponse, ItemListingResponse, ItemResponse, ItemsFeedResponse, ResponseDebug,
    TaxonomiesResponse, item_envelope, listing_envelope, pagination,
};
use super::endpoint::{DeliveryConfig, Endpoint, ItemsQuery, build_url};
use crate::elements::{
    ContentTypeDescriptor, TaxonomyGroup, map_content_type, map_taxonomy,
};
use crate::mapping::{ItemMapper, MapperConfig, MappingError, TypeRegistry};
use crate::user_agent::{
    SDK_HEADER, WAIT_FOR_NEW_CONTENT_HEADER, default_user_agent, sdk_tracking_value,
};

/// Response header carrying the items-feed continuation token.
pub const CONTINUATION_HEADER: &str = "X-Continuation";

/// Error body returned by the delivery API.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
    #[serde(default)]
    request_id: Option<String>,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    specific_code: Option<i64>,
}

/// Delivery API client.
///
/// Create once and reuse; the underlying connection pool is shared by clones.
///
/// # Example
///
/// ```no_run
/// use delivery_core::mapping::{MapperConfig, TypeRegistry};
/// use delivery_core::query::{DeliveryClient, DeliveryConfig, ItemsQuery};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = DeliveryConfig::new("975bf280-fd91-488c-994c-2f04416e5ee3");
/// let client = DeliveryClient::new(config, TypeRegistry::new(), MapperConfig::default())?;
/// let response = client.item("warrior", &ItemsQuery::new().depth(1)).await?;
/// println!("{:?}", response.item.item().text("title"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DeliveryClient {
    http: Client,
    config: DeliveryConfig,
    mapper: ItemMapper,
}

impl DeliveryClient {
    /// Creates a client for one project.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Http`] if the HTTP client cannot be built.
    pub fn new(
        config: DeliveryConfig,
        registry: TypeRegistry,
        mapper_config: MapperConfig,
    ) -> Result<Self, DeliveryError> {
        let http = Client::builder()
            .user_agent(default_user_agent())
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .build()
            .map_err(|source| DeliveryError::Http {
                url: config.base_url.clone(),
                source,
            })?;
        debug!(
            project = %config.project_id,
            base_url = %config.base_url,
            "Delivery client created"
        );
        Ok(Self {
            http,
            config,
            mapper: ItemMapper::new(registry, mapper_config),
        })
    }

    #[must_use]
    pub fn config(&self) -> &DeliveryConfig {
        &self.config
    }

    #[must_use]
    pub fn mapper(&self) -> &ItemMapper {
        &self.mapper
    }

    /// Fetches one item with its linked items.
    ///
    /// # Errors
    ///
    /// Returns a [`DeliveryError`] for transport, API, payload or mapping
    /// failures.
    #[instrument(skip(self, query), fields(codename = %codename))]
    pub async fn item(&self, codename: &str, query: &ItemsQuery) -> Result<ItemResponse, DeliveryError> {
        let endpoint = Endpoint::Item(codename.to_string());
        let (url, body, _) = self.get(&endpoint, query).await?;
        let mapper = self.mapper_for(query);

        let (raw, linked) = item_envelope(&body)?;
        let item = mapper.map_item(&raw, &linked)?;
        info!(linked = linked.len(), "Fetched item");
        Ok(ItemResponse {
            item,
            debug: debug_envelope(&mapper, url, body),
        })
    }

    /// Fetches a page of items.
    ///
    /// # Errors
    ///
    /// Returns a [`DeliveryError`] for transport, API, payload or mapping
    /// failures.
    #[instrument(skip(self, query))]
    pub async fn items(&self, query: &ItemsQuery) -> Result<ItemListingResponse, DeliveryError> {
        let (url, body, _) = self.get(&Endpoint::Items, query).await?;
        let mapper = self.mapper_for(query);

        let (raw, linked, pagination) = listing_envelope(&body)?;
        let items = mapper.map_items(&raw, &linked)?;
        info!(items = items.len(), "Fetched items");
        Ok(ItemListingResponse {
            items,
            pagination,
            debug: debug_envelope(&mapper, url, body),
        })
    }

    /// Fetches one page of the items feed.
    ///
    /// Pass the previous page's continuation token to continue; `None`
    /// starts from the beginning.
    ///
    /// # Errors
    ///
    /// Returns a [`DeliveryError`] for transport, API, payload or mapping
    /// failures.
    #[instrument(skip(self, query, continuation), fields(continued = continuation.is_some()))]
    pub async fn items_feed(
        &self,
        query: &ItemsQuery,
        continuation: Option<&str>,
    ) -> Result<ItemsFeedResponse, DeliveryError> {
        let url = build_url(&self.config, &Endpoint::ItemsFeed, query)?;
        let mut request = self.request(url.clone(), query);
        if let Some(token) = continuation {
            request = request.header(CONTINUATION_HEADER, token);
        }
        let (body, continuation_token) = self.execute(&url, request).await?;
        let mapper = self.mapper_for(query);

        let (raw, linked, _) = listing_envelope(&body)?;
        let items = mapper.map_items(&raw, &linked)?;
        info!(items = items.len(), has_more = continuation_token.is_some(), "Fetched feed page");
        Ok(ItemsFeedResponse {
            items,
            continuation_token,
            debug: debug_envelope(&mapper, url, body),
        })
    }

    /// Fetches one content type.
    ///
    /// # Errors
    ///
    /// Returns a [`DeliveryError`] for transport, API or payload failures.
    #[instrument(skip(self), fields(codename = %codename))]
    pub async fn content_type(&self, codename: &str) -> Result<ContentTypeDescriptor, DeliveryError> {
        let endpoint = Endpoint::Type(codename.to_string());
        let (_, body, _) = self.get(&endpoint, &ItemsQuery::new()).await?;
        Ok(map_content_type(&body)?)
    }

    /// Fetches the content types of the project.
    ///
    /// # Errors
    ///
    /// Returns a [`DeliveryError`] for transport, API or payload failures.
    #[instrument(skip(self, query))]
    pub async fn content_types(&self, query: &ItemsQuery) -> Result<ContentTypesResponse, DeliveryError> {
        let (_, body, _) = self.get(&Endpoint::Types, query).await?;
        let types = list(&body, "types")?
            .iter()
            .map(map_content_type)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ContentTypesResponse {
            types,
            pagination: pagination(&body)?,
        })
    }

    /// Fetches one taxonomy group.
    ///
    /// # Errors
    ///
    /// Returns a [`DeliveryError`] for transport, API or payload failures.
    #[instrument(skip(self), fields(codename = %codename))]
    pub async fn taxonomy(&self, codename: &str) -> Result<TaxonomyGroup, DeliveryError> {
        let endpoint = Endpoint::Taxonomy(codename.to_string());
        let (_, body, _) = self.get(&endpoint, &ItemsQuery::new()).await?;
        Ok(map_taxonomy(&body)?)
    }

    /// Fetches the taxonomy groups of the project.
    ///
    /// # Errors
    ///
    /// Returns a [`DeliveryError`] for transport, API or payload failures.
    #[instrument(skip(self, query))]
    pub async fn taxonomies(&self, query: &ItemsQuery) -> Result<TaxonomiesResponse, DeliveryError> {
        let (_, body, _) = self.get(&Endpoint::Taxonomies, query).await?;
        let taxonomies = list(&body, "taxonomies")?
            .iter()
            .map(map_taxonomy)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TaxonomiesResponse {
            taxonomies,
            pagination: pagination(&body)?,
        })
    }

    fn mapper_for(&self, query: &ItemsQuery) -> ItemMapper {
        match query.mapper_config() {
            Some(config) => self.mapper.with_config(config.clone()),
            None => self.mapper.clone(),
        }
    }

    fn request(&self, url: Url, query: &ItemsQuery) -> reqwest::RequestBuilder {
        let mut request = self
            .http
            .get(url)
            .header(SDK_HEADER, sdk_tracking_value());
        if self.config.wait_for_loading_new_content || query.waits_for_loading_new_content() {
            request = request.header(WAIT_FOR_NEW_CONTENT_HEADER, "true");
        }
        request
    }

    async fn get(
        &self,
        endpoint: &Endpoint,
        query: &ItemsQuery,
    ) -> Result<(Url, Value, Option<String>), DeliveryError> {
        let url = build_url(&self.config, endpoint, query)?;
        let request = self.request(url.clone(), query);
        let (body, continuation) = self.execute(&url, request).await?;
        Ok((url, body, continuation))
    }

    /// Sends the request and returns the JSON body plus the continuation token.
    async fn execute(
        &self,
        url: &Url,
        request: reqwest::RequestBuilder,
    ) -> Result<(Value, Option<String>), DeliveryError> {
        debug!(url = %url, "Sending request");
        let response = request.send().await.map_err(|source| DeliveryError::Http {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        let continuation = response
            .headers()
            .get(CONTINUATION_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .map(ToString::to_string);
        let text = response.text().await.map_err(|source| DeliveryError::Http {
            url: url.to_string(),
            source,
        })?;

        if !status.is_success() {
            let error = api_error(url, status.as_u16(), status.canonical_reason(), &text);
            warn!(url = %url, status = status.as_u16(), "Delivery API returned an error");
            return Err(error);
        }

        let body = serde_json::from_str(&text).map_err(|e| DeliveryError::deserialize(url.as_str(), e))?;
        Ok((body, continuation))
    }
}

fn api_error(url: &Url, status: u16, reason: Option<&str>, text: &str) -> DeliveryError {
    match serde_json::from_str::<ApiErrorBody>(text) {
        Ok(body) => DeliveryError::api(
            url.as_str(),
            status,
            body.message,
            body.error_code,
            body.specific_code,
            body.request_id,
        ),
        Err(_) => {
            let message = reason.unwrap_or("unexpected status").to_string();
            DeliveryError::api(url.as_str(), status, message, None, None, None)
        }
    }
}

fn list<'a>(body: &'a Value, key: &str) -> Result<&'a Vec<Value>, MappingError> {
    body.get(key).and_then(Value::as_array).ok_or_else(|| {
        MappingError::malformed("<response>", &format!("response has no `{key}` array"))
    })
}

fn debug_envelope(mapper: &ItemMapper, url: Url, body: Value) -> ResponseDebug {
    ResponseDebug {
        url: url.into(),
        raw: mapper.config().include_raw.then_some(body),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_parses_body() {
        let url = Url::parse("https://deliver.example.com/p/items/ghost").unwrap();
        let body = r#"{"message": "The requested content item 'ghost' was not found.", "request_id": "abc", "error_code": 100, "specific_code": 0}"#;
        match api_error(&url, 404, Some("Not Found"), body) {
            DeliveryError::Api {
                message,
                error_code,
                specific_code,
                request_id,
                ..
            } => {
                assert!(message.contains("'ghost'"));
                assert_eq!(error_code, Some(100));
                assert_eq!(specific_code, Some(0));
                assert_eq!(request_id.as_deref(), Some("abc"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_api_error_without_json_body() {
        let url = Url::parse("https://deliver.example.com/p/items").unwrap();
        let err = api_error(&url, 502, Some("Bad Gateway"), "<html>oops</html>");
        assert!(err.to_string().contains("Bad Gateway"));
        assert_eq!(err.status(), Some(502));
    }

    #[test]
    fn test_client_builds_with_defaults() {
        let client = DeliveryClient::new(
            DeliveryConfig::new("project"),
            TypeRegistry::new(),
            MapperConfig::default(),
        );
        assert!(client.is_ok());
    }
}
